//! Mode-dependent wiring of the service registry
//!
//! `resolve` binds every capability for the requested mode. Debug wires
//! the stubs; Production wires the Supabase adapters on top of shared,
//! lazily-created process-wide handles (one HTTP session, one Supabase
//! client). Resolution does no I/O and cannot partially succeed — the
//! registry struct forces a binding for every capability.

use crate::repository::supabase::{
    SupabaseArticlesRepository, SupabaseAuthRepository, SupabaseClient, SupabaseConfig,
    SupabaseDogsRepository, SupabaseMatchingRepository, SupabaseMessagesRepository,
    SupabaseStorageRepository, SupabaseVisitsRepository, WebImagesRepository,
    WebPushTokenRepository,
};
use crate::repository::Repositories;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

/// Runtime wiring mode
///
/// A configuration value, not a compile-time branch: both wiring paths
/// exist in every build and both are testable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Stub implementations — deterministic, no network
    #[default]
    Debug,
    /// Live Supabase-backed implementations
    Production,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" | "stub" => Ok(Mode::Debug),
            "production" | "release" | "live" => Ok(Mode::Production),
            other => Err(format!("unknown mode '{}'", other)),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Debug => write!(f, "debug"),
            Mode::Production => write!(f, "production"),
        }
    }
}

impl Mode {
    /// Read the mode from `PAWSINUS_MODE` once at startup
    ///
    /// Unset or unrecognized values fall back to `Debug` (with a warning
    /// for the unrecognized case).
    pub fn from_env() -> Self {
        match std::env::var("PAWSINUS_MODE") {
            Ok(value) => value.parse().unwrap_or_else(|e: String| {
                tracing::warn!(error = %e, "PAWSINUS_MODE not recognized, using debug");
                Mode::Debug
            }),
            Err(_) => Mode::Debug,
        }
    }
}

// Process-wide shared handles for the live bindings. Created on first
// production resolution, reused for the process lifetime.
static HTTP_SESSION: OnceLock<reqwest::Client> = OnceLock::new();
static SUPABASE: OnceLock<Arc<SupabaseClient>> = OnceLock::new();

/// The shared HTTP session
pub fn http_session() -> reqwest::Client {
    HTTP_SESSION.get_or_init(reqwest::Client::new).clone()
}

/// The shared Supabase client, configured from the environment
pub fn supabase_client() -> Arc<SupabaseClient> {
    SUPABASE
        .get_or_init(|| {
            Arc::new(SupabaseClient::new(
                http_session(),
                SupabaseConfig::from_env(),
            ))
        })
        .clone()
}

/// Bind an implementation to every capability for the given mode
pub fn resolve(mode: Mode) -> Repositories {
    tracing::info!(%mode, "Resolving service registry");

    match mode {
        Mode::Debug => Repositories::stub(),
        Mode::Production => {
            let http = http_session();
            let client = supabase_client();
            let push_endpoint = format!(
                "{}/functions/v1/push-tokens",
                client.config().url.trim_end_matches('/')
            );

            Repositories {
                dogs: Arc::new(SupabaseDogsRepository::new(client.clone())),
                matching: Arc::new(SupabaseMatchingRepository::new(client.clone())),
                messages: Arc::new(SupabaseMessagesRepository::new(client.clone())),
                auth: Arc::new(SupabaseAuthRepository::new(client.clone())),
                storage: Arc::new(SupabaseStorageRepository::new(client.clone())),
                images: Arc::new(WebImagesRepository::new(http.clone())),
                push_token: Arc::new(WebPushTokenRepository::new(http, push_endpoint)),
                articles: Arc::new(SupabaseArticlesRepository::new(client.clone())),
                visits: Arc::new(SupabaseVisitsRepository::new(client)),
            }
        }
    }
}
