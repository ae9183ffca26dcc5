//! Supabase REST client — PostgREST, GoTrue auth, and Storage calls
//!
//! Low-level shared client used by every live repository. Holds the
//! process-wide HTTP session and the current access token; repositories
//! stay transport-free and delegate here.

use super::config::SupabaseConfig;
use crate::error::{CoreError, Result};
use crate::types::AuthSession;
use chrono::{Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Shared Supabase client
///
/// Construction performs no I/O; all failures surface on first use.
pub struct SupabaseClient {
    /// Shared HTTP session (also used by the web repositories)
    http: reqwest::Client,

    config: Arc<SupabaseConfig>,

    /// Session of the signed-in user, if any
    session: RwLock<Option<AuthSession>>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
    user: TokenUser,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: Uuid,
}

impl SupabaseClient {
    pub fn new(http: reqwest::Client, config: SupabaseConfig) -> Self {
        Self {
            http,
            config: Arc::new(config),
            session: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &SupabaseConfig {
        &self.config
    }

    /// The underlying HTTP session
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    async fn bearer(&self) -> String {
        let session = self.session.read().await;
        session
            .as_ref()
            .map(|s| s.access_token.clone())
            .unwrap_or_else(|| self.config.anon_key.clone())
    }

    async fn check(response: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), context, "Supabase request failed");
        Err(CoreError::from_status(
            status.as_u16(),
            format!("{}: {}", context, body),
        ))
    }

    // ─── PostgREST ───────────────────────────────────────────────

    /// Select rows from a table with PostgREST filter pairs
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let url = self.config.rest_url(table);
        tracing::debug!(table, "Supabase select");

        let response = self
            .http
            .get(&url)
            .query(query)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(self.bearer().await)
            .header("Accept-Profile", &self.config.schema)
            .send()
            .await?;

        let response = Self::check(response, &format!("select {}", table)).await?;
        Ok(response.json::<Vec<T>>().await?)
    }

    /// Select exactly one row; empty result is `NotFound`
    pub async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let mut rows = self.select::<T>(table, query).await?;
        if rows.is_empty() {
            return Err(CoreError::NotFound(format!("{} row", table)));
        }
        Ok(rows.swap_remove(0))
    }

    /// Insert a row, returning the stored representation
    pub async fn insert<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.config.rest_url(table);
        tracing::debug!(table, "Supabase insert");

        let response = self
            .http
            .post(&url)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(self.bearer().await)
            .header("Content-Profile", &self.config.schema)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;

        let response = Self::check(response, &format!("insert {}", table)).await?;
        let mut rows: Vec<T> = response.json().await?;
        if rows.is_empty() {
            return Err(CoreError::Backend(format!(
                "insert into {} returned no representation",
                table
            )));
        }
        Ok(rows.swap_remove(0))
    }

    /// Patch rows matched by the filter pairs
    pub async fn patch<B: Serialize>(
        &self,
        table: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<()> {
        let url = self.config.rest_url(table);
        tracing::debug!(table, "Supabase patch");

        let response = self
            .http
            .patch(&url)
            .query(query)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(self.bearer().await)
            .header("Content-Profile", &self.config.schema)
            .json(body)
            .send()
            .await?;

        Self::check(response, &format!("patch {}", table)).await?;
        Ok(())
    }

    /// Delete rows matched by the filter pairs
    pub async fn delete(&self, table: &str, query: &[(&str, &str)]) -> Result<()> {
        let url = self.config.rest_url(table);
        tracing::debug!(table, "Supabase delete");

        let response = self
            .http
            .delete(&url)
            .query(query)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(self.bearer().await)
            .send()
            .await?;

        Self::check(response, &format!("delete {}", table)).await?;
        Ok(())
    }

    // ─── GoTrue auth ─────────────────────────────────────────────

    async fn store_session(&self, token: TokenResponse) -> AuthSession {
        let session = AuthSession {
            user_id: token.user.id,
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
        };
        *self.session.write().await = Some(session.clone());
        tracing::info!(user = %session.user_id, "Supabase session established");
        session
    }

    /// Password-grant sign-in
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        let url = self.config.auth_url("token");
        let response = self
            .http
            .post(&url)
            .query(&[("grant_type", "password")])
            .header("apikey", &self.config.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let response = Self::check(response, "sign in").await?;
        let token: TokenResponse = response.json().await?;
        Ok(self.store_session(token).await)
    }

    /// Create an account, returning the initial session
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession> {
        let url = self.config.auth_url("signup");
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.config.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let response = Self::check(response, "sign up").await?;
        let token: TokenResponse = response.json().await?;
        Ok(self.store_session(token).await)
    }

    /// Revoke the current session
    pub async fn sign_out(&self) -> Result<()> {
        let session = { self.session.write().await.take() };
        let Some(session) = session else {
            return Ok(());
        };

        let url = self.config.auth_url("logout");
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(session.access_token)
            .send()
            .await?;

        Self::check(response, "sign out").await?;
        Ok(())
    }

    /// Session of the signed-in user, if any
    pub async fn current_session(&self) -> Option<AuthSession> {
        self.session.read().await.clone()
    }

    // ─── Storage ─────────────────────────────────────────────────

    /// Upload an object; returns its public URL
    pub async fn upload_object(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
    ) -> Result<String> {
        let url = self.config.storage_url(bucket, path);
        tracing::debug!(bucket, path, size = bytes.len(), "Supabase upload");

        let response = self
            .http
            .post(&url)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(self.bearer().await)
            .body(bytes)
            .send()
            .await?;

        Self::check(response, &format!("upload {}/{}", bucket, path)).await?;
        Ok(self.config.public_storage_url(bucket, path))
    }

    pub async fn download_object(&self, bucket: &str, path: &str) -> Result<Vec<u8>> {
        let url = self.config.storage_url(bucket, path);
        let response = self
            .http
            .get(&url)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(self.bearer().await)
            .send()
            .await?;

        let response = Self::check(response, &format!("download {}/{}", bucket, path)).await?;
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn delete_object(&self, bucket: &str, path: &str) -> Result<()> {
        let url = self.config.storage_url(bucket, path);
        let response = self
            .http
            .delete(&url)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(self.bearer().await)
            .send()
            .await?;

        Self::check(response, &format!("delete {}/{}", bucket, path)).await?;
        Ok(())
    }
}
