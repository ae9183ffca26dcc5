//! The dependency container and its ambient accessor
//!
//! `DiContainer` binds one shared `Store<AppState>`, one populated
//! `Repositories` registry, and the auxiliary backend handle into a single
//! value threaded through the application. It is immutable after
//! construction; cloning aliases the same state and registry.
//!
//! Ambient access is explicit, not a hidden mutable global: `install` sets
//! the process-wide container exactly once (first wins), `with_scope`
//! overrides it for one task subtree (the per-test mechanism), and
//! `current` reads scope → installed → a shared stub fallback, in that
//! order. The fallback means preview and test consumers never dereference
//! an absent container.

use crate::repository::supabase::SupabaseClient;
use crate::repository::Repositories;
use crate::resolver::{self, Mode};
use crate::state::{AppState, Store};
use std::future::Future;
use std::sync::{Arc, OnceLock};

/// The application dependency container
#[derive(Clone)]
pub struct DiContainer {
    app_state: Store<AppState>,
    repositories: Arc<Repositories>,
    supabase: Option<Arc<SupabaseClient>>,
}

impl DiContainer {
    pub fn new(
        app_state: Store<AppState>,
        repositories: Repositories,
        supabase: Option<Arc<SupabaseClient>>,
    ) -> Self {
        Self {
            app_state,
            repositories: Arc::new(repositories),
            supabase,
        }
    }

    /// Build a container for the given mode with a fresh default state
    pub fn from_mode(mode: Mode) -> Self {
        let supabase = match mode {
            Mode::Debug => None,
            Mode::Production => Some(resolver::supabase_client()),
        };
        Self::new(Store::default(), resolver::resolve(mode), supabase)
    }

    /// All-stub container for previews and tests
    pub fn stub() -> Self {
        Self::new(Store::default(), Repositories::stub(), None)
    }

    /// The shared application state (aliased, never a copy)
    pub fn state(&self) -> &Store<AppState> {
        &self.app_state
    }

    /// The service registry
    pub fn repositories(&self) -> &Repositories {
        &self.repositories
    }

    /// The shared backend handle, present in production wiring
    pub fn supabase(&self) -> Option<&Arc<SupabaseClient>> {
        self.supabase.as_ref()
    }
}

static INSTALLED: OnceLock<DiContainer> = OnceLock::new();
static FALLBACK: OnceLock<DiContainer> = OnceLock::new();

tokio::task_local! {
    static SCOPED: DiContainer;
}

/// Install the process-wide container
///
/// Call once at startup, after resolution. Returns `false` (and keeps the
/// first container) if one was already installed.
pub fn install(container: DiContainer) -> bool {
    let installed = INSTALLED.set(container).is_ok();
    if installed {
        tracing::info!("Container installed");
    } else {
        tracing::warn!("Container already installed, keeping the first");
    }
    installed
}

/// The ambient container
///
/// Resolution order: task-scoped override, then the installed container,
/// then a lazily-built shared stub fallback. The fallback is a singleton,
/// so repeated ambient reads in a preview share one `AppState`.
pub fn current() -> DiContainer {
    if let Ok(scoped) = SCOPED.try_with(|c| c.clone()) {
        return scoped;
    }
    if let Some(installed) = INSTALLED.get() {
        return installed.clone();
    }
    FALLBACK.get_or_init(DiContainer::stub).clone()
}

/// Run a future with `container` as the ambient container
///
/// The override is visible to `current()` for the duration of the future
/// and its task-local descendants. This is the per-test override hook.
pub async fn with_scope<F>(container: DiContainer, fut: F) -> F::Output
where
    F: Future,
{
    SCOPED.scope(container, fut).await
}
