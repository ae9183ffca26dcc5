//! # pawsinus-core
//!
//! Composition root and reactive state layer for the Pawsinus client.
//!
//! ## Overview
//!
//! `pawsinus-core` assembles the application's service graph — nine
//! repository capabilities behind `async` interfaces — and exposes one
//! shared, observable `AppState` that every feature reads and mutates
//! through typed lenses. Wiring is mode-dependent: debug binds
//! deterministic in-memory stubs, production binds Supabase-backed
//! adapters sharing one HTTP session.
//!
//! ## Quick Start
//!
//! ```rust
//! use pawsinus_core::{container, AppState, DiContainer, Mode};
//!
//! # async fn example() -> pawsinus_core::Result<()> {
//! // Resolve the registry for the current mode and install the container
//! let app = DiContainer::from_mode(Mode::from_env());
//! container::install(app.clone());
//!
//! // Anywhere in the app: read the ambient container
//! let dogs = container::current().repositories().dogs.dogs().await?;
//!
//! // Mutate shared state through a lens; every holder sees it
//! app.state().insert(AppState::LIKED_DOG_IDS, dogs[0].id);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **Repository traits** — one closed interface per external concern
//!   (dogs, matching, messages, auth, storage, images, push tokens,
//!   articles, visits); stub and Supabase implementations
//! - **`Repositories`** — the all-or-nothing service registry
//! - **`resolve(mode)`** — runtime stub/live wiring over shared handles
//! - **`DiContainer`** — one state store + one registry, installed once
//!   and readable ambiently with a stub fallback
//! - **`Store<AppState>`** — single shared observable state tree with
//!   lens-scoped, atomically committed mutations
//! - **`QueryGuard`** — equality-gated re-issuance of a parameterized
//!   local query, with stale-session results dropped

pub mod container;
pub mod error;
pub mod query;
pub mod repository;
pub mod resolver;
pub mod state;
pub mod types;

// Re-export core types
pub use container::DiContainer;
pub use error::{CoreError, Result};
pub use query::QueryGuard;
pub use repository::{
    ArticlesRepository, AuthRepository, DogsRepository, ImagesRepository, MatchingRepository,
    MessagesRepository, PushTokenRepository, Repositories, StorageRepository, VisitsRepository,
};
pub use resolver::{resolve, Mode};
pub use state::{AppState, Lens, SessionState, Store, UserData, ViewState};
pub use types::{
    Adopter, Article, AuthSession, Credentials, Dog, DogSize, Gender, MatchRecord, Message,
    Visit, VisitStatus,
};

// Re-export implementations for convenience
pub use repository::stub::{
    StubArticlesRepository, StubAuthRepository, StubDogsRepository, StubImagesRepository,
    StubMatchingRepository, StubMessagesRepository, StubPushTokenRepository,
    StubStorageRepository, StubVisitsRepository,
};
pub use repository::supabase::{SupabaseClient, SupabaseConfig};
