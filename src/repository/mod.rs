//! Repository capability interfaces and the service registry
//!
//! Each repository is a fixed, closed interface over one external concern.
//! Implementations come in two flavors: stubs (deterministic, in-memory,
//! no I/O — for previews and tests) and live Supabase-backed adapters.
//! The `Repositories` struct binds exactly one implementation per
//! capability; construction is all-or-nothing, so a missing binding cannot
//! compile.

use crate::error::Result;
use crate::types::{Article, AuthSession, Credentials, Dog, MatchRecord, Message, Visit};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

pub mod stub;
pub mod supabase;

/// Dog profile records
#[async_trait]
pub trait DogsRepository: Send + Sync {
    /// List adoptable dogs, newest first
    async fn dogs(&self) -> Result<Vec<Dog>>;

    /// Fetch one dog by id
    async fn dog(&self, id: Uuid) -> Result<Dog>;

    /// Search dogs by name or breed substring (case-insensitive)
    async fn search(&self, text: &str) -> Result<Vec<Dog>>;

    /// Implementation name (e.g., "stub-dogs", "supabase-dogs")
    fn name(&self) -> &'static str;
}

/// Likes, passes, and confirmed matches
#[async_trait]
pub trait MatchingRepository: Send + Sync {
    /// Record a like; returns the match if it became mutual
    async fn like(&self, adopter_id: Uuid, dog_id: Uuid) -> Result<Option<MatchRecord>>;

    /// Withdraw a like
    async fn unlike(&self, adopter_id: Uuid, dog_id: Uuid) -> Result<()>;

    /// List the adopter's confirmed matches
    async fn matches(&self, adopter_id: Uuid) -> Result<Vec<MatchRecord>>;

    fn name(&self) -> &'static str;
}

/// Chat messages within a match
#[async_trait]
pub trait MessagesRepository: Send + Sync {
    /// List messages for a match, oldest first
    async fn messages(&self, match_id: Uuid) -> Result<Vec<Message>>;

    /// Send a message into a match conversation
    async fn send(&self, match_id: Uuid, sender_id: Uuid, body: &str) -> Result<Message>;

    fn name(&self) -> &'static str;
}

/// Authentication and session lifecycle
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn sign_up(&self, credentials: &Credentials) -> Result<AuthSession>;

    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession>;

    async fn sign_out(&self) -> Result<()>;

    /// Current session, if one is active
    async fn current_session(&self) -> Result<Option<AuthSession>>;

    fn name(&self) -> &'static str;
}

/// Object storage (profile photos, attachments)
#[async_trait]
pub trait StorageRepository: Send + Sync {
    /// Upload bytes; returns the public URL of the stored object
    async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>) -> Result<String>;

    async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>>;

    async fn delete(&self, bucket: &str, path: &str) -> Result<()>;

    fn name(&self) -> &'static str;
}

/// Image fetching (CDN or arbitrary URLs)
#[async_trait]
pub trait ImagesRepository: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;

    fn name(&self) -> &'static str;
}

/// Push notification token registration
#[async_trait]
pub trait PushTokenRepository: Send + Sync {
    async fn register(&self, user_id: Uuid, token: &str) -> Result<()>;

    async fn unregister(&self, user_id: Uuid) -> Result<()>;

    fn name(&self) -> &'static str;
}

/// Editorial articles
#[async_trait]
pub trait ArticlesRepository: Send + Sync {
    /// List published articles, newest first
    async fn articles(&self) -> Result<Vec<Article>>;

    async fn article(&self, slug: &str) -> Result<Article>;

    fn name(&self) -> &'static str;
}

/// Shelter visit scheduling
#[async_trait]
pub trait VisitsRepository: Send + Sync {
    /// Request a visit with a dog at the given time
    async fn schedule(
        &self,
        adopter_id: Uuid,
        dog_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Visit>;

    /// List the adopter's visits, soonest first
    async fn visits(&self, adopter_id: Uuid) -> Result<Vec<Visit>>;

    async fn cancel(&self, visit_id: Uuid) -> Result<()>;

    fn name(&self) -> &'static str;
}

/// The populated service registry: one binding per capability
///
/// Immutable after construction. Normally produced by
/// [`resolve`](crate::resolver::resolve); `stub()` builds the all-stub
/// variant used for previews and tests.
#[derive(Clone)]
pub struct Repositories {
    pub dogs: Arc<dyn DogsRepository>,
    pub matching: Arc<dyn MatchingRepository>,
    pub messages: Arc<dyn MessagesRepository>,
    pub auth: Arc<dyn AuthRepository>,
    pub storage: Arc<dyn StorageRepository>,
    pub images: Arc<dyn ImagesRepository>,
    pub push_token: Arc<dyn PushTokenRepository>,
    pub articles: Arc<dyn ArticlesRepository>,
    pub visits: Arc<dyn VisitsRepository>,
}

impl Repositories {
    /// Implementation name of every binding, in declaration order
    ///
    /// Useful for startup logging and for asserting mode wiring in tests.
    pub fn binding_names(&self) -> Vec<&'static str> {
        vec![
            self.dogs.name(),
            self.matching.name(),
            self.messages.name(),
            self.auth.name(),
            self.storage.name(),
            self.images.name(),
            self.push_token.name(),
            self.articles.name(),
            self.visits.name(),
        ]
    }
}
