//! Live repositories backed by Supabase
//!
//! One adapter per capability, all delegating to a shared
//! [`SupabaseClient`]. The images and push-token repositories talk to
//! plain HTTP endpoints and only borrow the shared session.

mod client;
mod config;

pub use client::SupabaseClient;
pub use config::SupabaseConfig;

use super::{
    ArticlesRepository, AuthRepository, DogsRepository, ImagesRepository, MatchingRepository,
    MessagesRepository, PushTokenRepository, StorageRepository, VisitsRepository,
};
use crate::error::{CoreError, Result};
use crate::types::{Article, AuthSession, Credentials, Dog, MatchRecord, Message, Visit};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

// ─── Dogs ────────────────────────────────────────────────────────

pub struct SupabaseDogsRepository {
    client: Arc<SupabaseClient>,
}

impl SupabaseDogsRepository {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DogsRepository for SupabaseDogsRepository {
    async fn dogs(&self) -> Result<Vec<Dog>> {
        self.client
            .select("dogs", &[("select", "*"), ("order", "created_at.desc")])
            .await
    }

    async fn dog(&self, id: Uuid) -> Result<Dog> {
        let id_filter = format!("eq.{}", id);
        self.client
            .select_one("dogs", &[("select", "*"), ("id", &id_filter)])
            .await
    }

    async fn search(&self, text: &str) -> Result<Vec<Dog>> {
        if text.is_empty() {
            return self.dogs().await;
        }
        let pattern = format!("(name.ilike.*{0}*,breed.ilike.*{0}*)", text);
        self.client
            .select("dogs", &[("select", "*"), ("or", &pattern)])
            .await
    }

    fn name(&self) -> &'static str {
        "supabase-dogs"
    }
}

// ─── Matching ────────────────────────────────────────────────────

pub struct SupabaseMatchingRepository {
    client: Arc<SupabaseClient>,
}

impl SupabaseMatchingRepository {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MatchingRepository for SupabaseMatchingRepository {
    async fn like(&self, adopter_id: Uuid, dog_id: Uuid) -> Result<Option<MatchRecord>> {
        let _: serde_json::Value = self
            .client
            .insert(
                "likes",
                &serde_json::json!({ "adopterId": adopter_id, "dogId": dog_id }),
            )
            .await?;

        // A database trigger creates the match row when the like is mutual
        let adopter_filter = format!("eq.{}", adopter_id);
        let dog_filter = format!("eq.{}", dog_id);
        let matches: Vec<MatchRecord> = self
            .client
            .select(
                "matches",
                &[
                    ("select", "*"),
                    ("adopter_id", &adopter_filter),
                    ("dog_id", &dog_filter),
                ],
            )
            .await?;
        Ok(matches.into_iter().next())
    }

    async fn unlike(&self, adopter_id: Uuid, dog_id: Uuid) -> Result<()> {
        let adopter_filter = format!("eq.{}", adopter_id);
        let dog_filter = format!("eq.{}", dog_id);
        self.client
            .delete(
                "likes",
                &[("adopter_id", &adopter_filter), ("dog_id", &dog_filter)],
            )
            .await
    }

    async fn matches(&self, adopter_id: Uuid) -> Result<Vec<MatchRecord>> {
        let adopter_filter = format!("eq.{}", adopter_id);
        self.client
            .select(
                "matches",
                &[
                    ("select", "*"),
                    ("adopter_id", &adopter_filter),
                    ("order", "matched_at.desc"),
                ],
            )
            .await
    }

    fn name(&self) -> &'static str {
        "supabase-matching"
    }
}

// ─── Messages ────────────────────────────────────────────────────

pub struct SupabaseMessagesRepository {
    client: Arc<SupabaseClient>,
}

impl SupabaseMessagesRepository {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MessagesRepository for SupabaseMessagesRepository {
    async fn messages(&self, match_id: Uuid) -> Result<Vec<Message>> {
        let match_filter = format!("eq.{}", match_id);
        self.client
            .select(
                "messages",
                &[
                    ("select", "*"),
                    ("match_id", &match_filter),
                    ("order", "sent_at.asc"),
                ],
            )
            .await
    }

    async fn send(&self, match_id: Uuid, sender_id: Uuid, body: &str) -> Result<Message> {
        if body.trim().is_empty() {
            return Err(CoreError::Validation {
                field: "body".to_string(),
                reason: "message body is empty".to_string(),
            });
        }
        self.client
            .insert(
                "messages",
                &serde_json::json!({
                    "matchId": match_id,
                    "senderId": sender_id,
                    "body": body,
                }),
            )
            .await
    }

    fn name(&self) -> &'static str {
        "supabase-messages"
    }
}

// ─── Auth ────────────────────────────────────────────────────────

pub struct SupabaseAuthRepository {
    client: Arc<SupabaseClient>,
}

impl SupabaseAuthRepository {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthRepository for SupabaseAuthRepository {
    async fn sign_up(&self, credentials: &Credentials) -> Result<AuthSession> {
        self.client
            .sign_up(&credentials.email, &credentials.password)
            .await
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession> {
        self.client
            .sign_in(&credentials.email, &credentials.password)
            .await
    }

    async fn sign_out(&self) -> Result<()> {
        self.client.sign_out().await
    }

    async fn current_session(&self) -> Result<Option<AuthSession>> {
        Ok(self.client.current_session().await)
    }

    fn name(&self) -> &'static str {
        "supabase-auth"
    }
}

// ─── Storage ─────────────────────────────────────────────────────

pub struct SupabaseStorageRepository {
    client: Arc<SupabaseClient>,
}

impl SupabaseStorageRepository {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StorageRepository for SupabaseStorageRepository {
    async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>) -> Result<String> {
        self.client.upload_object(bucket, path, bytes).await
    }

    async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>> {
        self.client.download_object(bucket, path).await
    }

    async fn delete(&self, bucket: &str, path: &str) -> Result<()> {
        self.client.delete_object(bucket, path).await
    }

    fn name(&self) -> &'static str {
        "supabase-storage"
    }
}

// ─── Articles ────────────────────────────────────────────────────

pub struct SupabaseArticlesRepository {
    client: Arc<SupabaseClient>,
}

impl SupabaseArticlesRepository {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ArticlesRepository for SupabaseArticlesRepository {
    async fn articles(&self) -> Result<Vec<Article>> {
        self.client
            .select(
                "articles",
                &[("select", "*"), ("order", "published_at.desc")],
            )
            .await
    }

    async fn article(&self, slug: &str) -> Result<Article> {
        let slug_filter = format!("eq.{}", slug);
        self.client
            .select_one("articles", &[("select", "*"), ("slug", &slug_filter)])
            .await
    }

    fn name(&self) -> &'static str {
        "supabase-articles"
    }
}

// ─── Visits ──────────────────────────────────────────────────────

pub struct SupabaseVisitsRepository {
    client: Arc<SupabaseClient>,
}

impl SupabaseVisitsRepository {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VisitsRepository for SupabaseVisitsRepository {
    async fn schedule(
        &self,
        adopter_id: Uuid,
        dog_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Visit> {
        self.client
            .insert(
                "visits",
                &serde_json::json!({
                    "adopterId": adopter_id,
                    "dogId": dog_id,
                    "scheduledAt": at,
                    "status": "requested",
                }),
            )
            .await
    }

    async fn visits(&self, adopter_id: Uuid) -> Result<Vec<Visit>> {
        let adopter_filter = format!("eq.{}", adopter_id);
        self.client
            .select(
                "visits",
                &[
                    ("select", "*"),
                    ("adopter_id", &adopter_filter),
                    ("order", "scheduled_at.asc"),
                ],
            )
            .await
    }

    async fn cancel(&self, visit_id: Uuid) -> Result<()> {
        let id_filter = format!("eq.{}", visit_id);
        self.client
            .patch(
                "visits",
                &[("id", &id_filter)],
                &serde_json::json!({ "status": "cancelled" }),
            )
            .await
    }

    fn name(&self) -> &'static str {
        "supabase-visits"
    }
}

// ─── Web repositories (plain HTTP, shared session) ───────────────

/// Image fetcher over the shared HTTP session
pub struct WebImagesRepository {
    http: reqwest::Client,
}

impl WebImagesRepository {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ImagesRepository for WebImagesRepository {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::from_status(
                status.as_u16(),
                format!("fetch image {}", url),
            ));
        }
        Ok(response.bytes().await?.to_vec())
    }

    fn name(&self) -> &'static str {
        "web-images"
    }
}

/// Push token registration against the notification endpoint
pub struct WebPushTokenRepository {
    http: reqwest::Client,
    endpoint: String,
}

impl WebPushTokenRepository {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl PushTokenRepository for WebPushTokenRepository {
    async fn register(&self, user_id: Uuid, token: &str) -> Result<()> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&serde_json::json!({ "userId": user_id, "token": token }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::from_status(status.as_u16(), "register push token"));
        }
        tracing::debug!(user = %user_id, "Push token registered");
        Ok(())
    }

    async fn unregister(&self, user_id: Uuid) -> Result<()> {
        let url = format!("{}/{}", self.endpoint, user_id);
        let response = self.http.delete(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::from_status(status.as_u16(), "unregister push token"));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "web-push-token"
    }
}
