//! Supabase connection configuration

use serde::{Deserialize, Serialize};

/// Configuration for the Supabase backend
///
/// Defaults target a local `supabase start` instance; production values
/// come from the environment via [`SupabaseConfig::from_env`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupabaseConfig {
    /// Project base URL (e.g., `https://xyzcompany.supabase.co`)
    pub url: String,

    /// Anonymous API key sent with every request
    pub anon_key: String,

    /// PostgREST schema
    pub schema: String,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321".to_string(),
            anon_key: "anon-local-dev".to_string(),
            schema: "public".to_string(),
        }
    }
}

impl SupabaseConfig {
    /// Read configuration from `PAWSINUS_SUPABASE_URL` /
    /// `PAWSINUS_SUPABASE_ANON_KEY`, falling back to local-dev defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: std::env::var("PAWSINUS_SUPABASE_URL").unwrap_or(defaults.url),
            anon_key: std::env::var("PAWSINUS_SUPABASE_ANON_KEY").unwrap_or(defaults.anon_key),
            schema: std::env::var("PAWSINUS_SUPABASE_SCHEMA").unwrap_or(defaults.schema),
        }
    }

    /// PostgREST endpoint for a table
    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url.trim_end_matches('/'), table)
    }

    /// GoTrue auth endpoint (e.g., `token`, `signup`, `logout`)
    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.url.trim_end_matches('/'), path)
    }

    /// Storage object endpoint
    pub fn storage_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.url.trim_end_matches('/'),
            bucket,
            path
        )
    }

    /// Public (unauthenticated) URL of a storage object
    pub fn public_storage_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.url.trim_end_matches('/'),
            bucket,
            path
        )
    }
}
