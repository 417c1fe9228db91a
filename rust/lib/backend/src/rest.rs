//! REST client for the hosted backend.
//!
//! Tables are exposed PostgREST-style under `/rest/v1/{table}` with
//! `column=eq.value` filters; password sign-in goes through
//! `/auth/v1/token?grant_type=password`. Every request carries the
//! project's anon key in the `apikey` header.
//!
//! Settings rows may not exist yet for a new profile, so settings writes
//! are upserts; profile rows always exist and are patched.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{ApiError, Backend, ProfilePatch, ProfileRow, SessionGrant, SettingsPatch, SettingsRow};

pub const PROFILES_TABLE: &str = "profiles";
pub const SETTINGS_TABLE: &str = "profile_settings";

pub struct RestBackend {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
    user: TokenUser,
}

#[derive(Deserialize)]
struct TokenUser {
    id: String,
}

impl RestBackend {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    /// URL of a table endpoint: `{base_url}/rest/v1/{table}`.
    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn sign_in_url(&self) -> String {
        format!("{}/auth/v1/token", self.base_url)
    }

    /// Attach the anon key, plus the user's token when acting on their behalf.
    fn authed(&self, builder: reqwest::RequestBuilder, access_token: Option<&str>) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token.unwrap_or(&self.anon_key))
    }

    /// Check the status and map HTTP failures to `ApiError`.
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if !status.is_success() {
            let code = status.as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Server { status: code, message: body });
        }
        Ok(resp)
    }

    async fn parse<R: DeserializeOwned>(resp: reqwest::Response) -> Result<R, ApiError> {
        let resp = Self::check(resp).await?;
        resp.json::<R>()
            .await
            .map_err(|e| ApiError::Decode(format!("response body: {}", e)))
    }

    /// `GET /rest/v1/{table}?{column}=eq.{value}&select=*`, first row or none.
    async fn select_one<R: DeserializeOwned>(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> Result<Option<R>, ApiError> {
        debug!(table, column, value, "select single row");
        let req = self
            .http
            .get(self.table_url(table))
            .query(&[(column, format!("eq.{}", value)), ("select", "*".to_string())]);
        let resp = self.authed(req, None).send().await?;
        let rows: Vec<R> = Self::parse(resp).await?;
        Ok(rows.into_iter().next())
    }

    /// `PATCH /rest/v1/{table}?id=eq.{id}` as the signed-in user.
    ///
    /// Asks for the updated rows back so a patch that matched nothing is
    /// reported instead of passing as a silent 204.
    async fn patch<P: Serialize + Sync>(
        &self,
        table: &str,
        access_token: &str,
        id: &str,
        patch: &P,
    ) -> Result<(), ApiError> {
        let req = self
            .http
            .patch(self.table_url(table))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(patch);
        let resp = self.authed(req, Some(access_token)).send().await?;
        let updated: Vec<Value> = Self::parse(resp).await?;
        if updated.is_empty() {
            return Err(ApiError::Server {
                status: 404,
                message: format!("{}: no row with id {}", table, id),
            });
        }
        Ok(())
    }

    /// `POST /rest/v1/{table}?on_conflict=id` merging into an existing row,
    /// so the first write for an id creates it.
    async fn upsert<P: Serialize + Sync>(
        &self,
        table: &str,
        access_token: &str,
        id: &str,
        patch: &P,
    ) -> Result<(), ApiError> {
        let mut body = serde_json::to_value(patch).map_err(|e| ApiError::Decode(format!("request body: {}", e)))?;
        let Value::Object(fields) = &mut body else {
            return Err(ApiError::Decode(format!("{} patch is not an object", table)));
        };
        fields.insert("id".to_string(), Value::String(id.to_string()));

        debug!(table, id, "upsert row");
        let req = self
            .http
            .post(self.table_url(table))
            .query(&[("on_conflict", "id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&body);
        let resp = self.authed(req, Some(access_token)).send().await?;
        Self::check(resp).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Backend for RestBackend {
    async fn profile_by_username(&self, username: &str) -> Result<Option<ProfileRow>, ApiError> {
        self.select_one(PROFILES_TABLE, "username", username).await
    }

    async fn profile_by_id(&self, id: &str) -> Result<Option<ProfileRow>, ApiError> {
        self.select_one(PROFILES_TABLE, "id", id).await
    }

    async fn settings_by_profile_id(&self, id: &str) -> Result<Option<SettingsRow>, ApiError> {
        self.select_one(SETTINGS_TABLE, "id", id).await
    }

    async fn update_profile(
        &self,
        access_token: &str,
        id: &str,
        patch: &ProfilePatch,
    ) -> Result<(), ApiError> {
        self.patch(PROFILES_TABLE, access_token, id, patch).await
    }

    async fn update_settings(
        &self,
        access_token: &str,
        id: &str,
        patch: &SettingsPatch,
    ) -> Result<(), ApiError> {
        self.upsert(SETTINGS_TABLE, access_token, id, patch).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionGrant, ApiError> {
        let req = self
            .http
            .post(self.sign_in_url())
            .query(&[("grant_type", "password")])
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }));
        let resp = self.authed(req, None).send().await?;

        let status = resp.status();
        if status.as_u16() == 400 || status.as_u16() == 401 {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Auth(format!("sign-in rejected ({}): {}", status, body)));
        }

        let token: TokenResponse = Self::parse(resp).await?;
        Ok(SessionGrant {
            access_token: token.access_token,
            expires_in: token.expires_in,
            user_id: token.user.id,
        })
    }
}
