//! Stub repositories — deterministic, in-memory, no I/O
//!
//! Every capability has a stub variant seeded with fixed data, used for
//! previews and tests. Mutating operations (likes, messages, visits,
//! uploads) are kept in memory behind `RwLock` so write paths can be
//! exercised end to end without a backend.

use super::{
    ArticlesRepository, AuthRepository, DogsRepository, ImagesRepository, MatchingRepository,
    MessagesRepository, PushTokenRepository, Repositories, StorageRepository, VisitsRepository,
};
use crate::error::{CoreError, Result};
use crate::types::{
    Article, AuthSession, Credentials, Dog, DogSize, Gender, MatchRecord, Message, Visit,
    VisitStatus,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Fixed id of the stub signed-in user
pub const STUB_USER_ID: Uuid = Uuid::from_u128(0xB0B0_0000_0000_0000_0000_0000_0000_0001);

/// Fixed ids of the seeded dogs
pub const MANGO_ID: Uuid = Uuid::from_u128(0xD0D0_0000_0000_0000_0000_0000_0000_0001);
pub const BORI_ID: Uuid = Uuid::from_u128(0xD0D0_0000_0000_0000_0000_0000_0000_0002);
pub const CHOCO_ID: Uuid = Uuid::from_u128(0xD0D0_0000_0000_0000_0000_0000_0000_0003);

fn seed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0)
        .single()
        .unwrap_or_default()
}

fn seed_dogs() -> Vec<Dog> {
    vec![
        Dog {
            id: MANGO_ID,
            name: "Mango".to_string(),
            breed: "Jindo mix".to_string(),
            age: 3,
            gender: Gender::Female,
            size: DogSize::Medium,
            bio: "Gentle girl who loves long walks and belly rubs.".to_string(),
            shelter_name: "Seongdong Shelter".to_string(),
            image_urls: vec!["https://cdn.pawsinus.example/mango-1.jpg".to_string()],
            personality: Some("Calm, affectionate".to_string()),
            health_status: Some("Vaccinated, neutered".to_string()),
        },
        Dog {
            id: BORI_ID,
            name: "Bori".to_string(),
            breed: "Toy Poodle".to_string(),
            age: 2,
            gender: Gender::Male,
            size: DogSize::Small,
            bio: "Energetic and people-oriented.".to_string(),
            shelter_name: "Mapo Shelter".to_string(),
            image_urls: vec!["https://cdn.pawsinus.example/bori-1.jpg".to_string()],
            personality: Some("Playful".to_string()),
            health_status: None,
        },
        Dog {
            id: CHOCO_ID,
            name: "Choco".to_string(),
            breed: "Labrador Retriever".to_string(),
            age: 5,
            gender: Gender::Male,
            size: DogSize::Large,
            bio: "Retired guide-dog candidate, great with kids.".to_string(),
            shelter_name: "Seongdong Shelter".to_string(),
            image_urls: vec![
                "https://cdn.pawsinus.example/choco-1.jpg".to_string(),
                "https://cdn.pawsinus.example/choco-2.jpg".to_string(),
            ],
            personality: None,
            health_status: Some("Hip checked, all clear".to_string()),
        },
    ]
}

// ─── Dogs ────────────────────────────────────────────────────────

pub struct StubDogsRepository {
    dogs: Vec<Dog>,
}

impl Default for StubDogsRepository {
    fn default() -> Self {
        Self { dogs: seed_dogs() }
    }
}

#[async_trait]
impl DogsRepository for StubDogsRepository {
    async fn dogs(&self) -> Result<Vec<Dog>> {
        Ok(self.dogs.clone())
    }

    async fn dog(&self, id: Uuid) -> Result<Dog> {
        self.dogs
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("dog {}", id)))
    }

    async fn search(&self, text: &str) -> Result<Vec<Dog>> {
        let needle = text.to_lowercase();
        Ok(self
            .dogs
            .iter()
            .filter(|d| {
                needle.is_empty()
                    || d.name.to_lowercase().contains(&needle)
                    || d.breed.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    fn name(&self) -> &'static str {
        "stub-dogs"
    }
}

// ─── Matching ────────────────────────────────────────────────────

/// Stub matching: likes are stored in memory; liking a dog whose shelter
/// pre-approved the adopter (seeded: Mango) immediately becomes a match.
pub struct StubMatchingRepository {
    mutual: HashSet<Uuid>,
    likes: RwLock<HashSet<(Uuid, Uuid)>>,
    matches: RwLock<Vec<MatchRecord>>,
}

impl Default for StubMatchingRepository {
    fn default() -> Self {
        let mut mutual = HashSet::new();
        mutual.insert(MANGO_ID);
        Self {
            mutual,
            likes: RwLock::new(HashSet::new()),
            matches: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl MatchingRepository for StubMatchingRepository {
    async fn like(&self, adopter_id: Uuid, dog_id: Uuid) -> Result<Option<MatchRecord>> {
        let mut likes = self.likes.write().await;
        if !likes.insert((adopter_id, dog_id)) {
            // Already liked; matching is idempotent
            return Ok(None);
        }
        drop(likes);

        if !self.mutual.contains(&dog_id) {
            return Ok(None);
        }

        let record = MatchRecord {
            id: Uuid::new_v4(),
            dog_id,
            adopter_id,
            matched_at: Utc::now(),
        };
        self.matches.write().await.push(record.clone());
        tracing::debug!(dog = %dog_id, adopter = %adopter_id, "Stub match created");
        Ok(Some(record))
    }

    async fn unlike(&self, adopter_id: Uuid, dog_id: Uuid) -> Result<()> {
        self.likes.write().await.remove(&(adopter_id, dog_id));
        self.matches
            .write()
            .await
            .retain(|m| !(m.adopter_id == adopter_id && m.dog_id == dog_id));
        Ok(())
    }

    async fn matches(&self, adopter_id: Uuid) -> Result<Vec<MatchRecord>> {
        let matches = self.matches.read().await;
        Ok(matches
            .iter()
            .filter(|m| m.adopter_id == adopter_id)
            .cloned()
            .collect())
    }

    fn name(&self) -> &'static str {
        "stub-matching"
    }
}

// ─── Messages ────────────────────────────────────────────────────

#[derive(Default)]
pub struct StubMessagesRepository {
    messages: RwLock<Vec<Message>>,
}

#[async_trait]
impl MessagesRepository for StubMessagesRepository {
    async fn messages(&self, match_id: Uuid) -> Result<Vec<Message>> {
        let messages = self.messages.read().await;
        Ok(messages
            .iter()
            .filter(|m| m.match_id == match_id)
            .cloned()
            .collect())
    }

    async fn send(&self, match_id: Uuid, sender_id: Uuid, body: &str) -> Result<Message> {
        if body.trim().is_empty() {
            return Err(CoreError::Validation {
                field: "body".to_string(),
                reason: "message body is empty".to_string(),
            });
        }
        let message = Message::new(match_id, sender_id, body);
        self.messages.write().await.push(message.clone());
        Ok(message)
    }

    fn name(&self) -> &'static str {
        "stub-messages"
    }
}

// ─── Auth ────────────────────────────────────────────────────────

#[derive(Default)]
pub struct StubAuthRepository {
    session: RwLock<Option<AuthSession>>,
}

impl StubAuthRepository {
    fn make_session() -> AuthSession {
        AuthSession {
            user_id: STUB_USER_ID,
            access_token: "stub-access-token".to_string(),
            refresh_token: None,
            expires_at: seed_time() + Duration::hours(24),
        }
    }
}

#[async_trait]
impl AuthRepository for StubAuthRepository {
    async fn sign_up(&self, credentials: &Credentials) -> Result<AuthSession> {
        if credentials.password.len() < 6 {
            return Err(CoreError::Validation {
                field: "password".to_string(),
                reason: "must be at least 6 characters".to_string(),
            });
        }
        self.sign_in(credentials).await
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession> {
        if !credentials.email.contains('@') {
            return Err(CoreError::Validation {
                field: "email".to_string(),
                reason: "not an email address".to_string(),
            });
        }
        let session = Self::make_session();
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> Result<()> {
        *self.session.write().await = None;
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<AuthSession>> {
        Ok(self.session.read().await.clone())
    }

    fn name(&self) -> &'static str {
        "stub-auth"
    }
}

// ─── Storage ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct StubStorageRepository {
    objects: RwLock<HashMap<(String, String), Vec<u8>>>,
}

#[async_trait]
impl StorageRepository for StubStorageRepository {
    async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>) -> Result<String> {
        let mut objects = self.objects.write().await;
        objects.insert((bucket.to_string(), path.to_string()), bytes);
        Ok(format!("stub://{}/{}", bucket, path))
    }

    async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>> {
        let objects = self.objects.read().await;
        objects
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("{}/{}", bucket, path)))
    }

    async fn delete(&self, bucket: &str, path: &str) -> Result<()> {
        let mut objects = self.objects.write().await;
        objects.remove(&(bucket.to_string(), path.to_string()));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stub-storage"
    }
}

// ─── Images ──────────────────────────────────────────────────────

#[derive(Default)]
pub struct StubImagesRepository;

#[async_trait]
impl ImagesRepository for StubImagesRepository {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        // Deterministic placeholder payload derived from the URL
        Ok(format!("stub-image:{}", url).into_bytes())
    }

    fn name(&self) -> &'static str {
        "stub-images"
    }
}

// ─── Push tokens ─────────────────────────────────────────────────

#[derive(Default)]
pub struct StubPushTokenRepository {
    tokens: RwLock<HashMap<Uuid, String>>,
}

impl StubPushTokenRepository {
    /// Registered token for a user, if any (test hook)
    pub async fn token_for(&self, user_id: Uuid) -> Option<String> {
        self.tokens.read().await.get(&user_id).cloned()
    }
}

#[async_trait]
impl PushTokenRepository for StubPushTokenRepository {
    async fn register(&self, user_id: Uuid, token: &str) -> Result<()> {
        self.tokens
            .write()
            .await
            .insert(user_id, token.to_string());
        Ok(())
    }

    async fn unregister(&self, user_id: Uuid) -> Result<()> {
        self.tokens.write().await.remove(&user_id);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stub-push-token"
    }
}

// ─── Articles ────────────────────────────────────────────────────

pub struct StubArticlesRepository {
    articles: Vec<Article>,
}

impl Default for StubArticlesRepository {
    fn default() -> Self {
        let articles = vec![
            Article {
                id: Uuid::from_u128(0xA0A0_0000_0000_0000_0000_0000_0000_0001),
                slug: "first-week-home".to_string(),
                title: "Your dog's first week at home".to_string(),
                body: "Keep the routine simple and predictable...".to_string(),
                published_at: seed_time(),
            },
            Article {
                id: Uuid::from_u128(0xA0A0_0000_0000_0000_0000_0000_0000_0002),
                slug: "shelter-visit-checklist".to_string(),
                title: "Shelter visit checklist".to_string(),
                body: "What to bring and what to ask...".to_string(),
                published_at: seed_time() - Duration::days(7),
            },
        ];
        Self { articles }
    }
}

#[async_trait]
impl ArticlesRepository for StubArticlesRepository {
    async fn articles(&self) -> Result<Vec<Article>> {
        Ok(self.articles.clone())
    }

    async fn article(&self, slug: &str) -> Result<Article> {
        self.articles
            .iter()
            .find(|a| a.slug == slug)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("article '{}'", slug)))
    }

    fn name(&self) -> &'static str {
        "stub-articles"
    }
}

// ─── Visits ──────────────────────────────────────────────────────

#[derive(Default)]
pub struct StubVisitsRepository {
    visits: RwLock<Vec<Visit>>,
}

#[async_trait]
impl VisitsRepository for StubVisitsRepository {
    async fn schedule(
        &self,
        adopter_id: Uuid,
        dog_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Visit> {
        let visit = Visit {
            id: Uuid::new_v4(),
            dog_id,
            adopter_id,
            scheduled_at: at,
            status: VisitStatus::Requested,
        };
        self.visits.write().await.push(visit.clone());
        Ok(visit)
    }

    async fn visits(&self, adopter_id: Uuid) -> Result<Vec<Visit>> {
        let visits = self.visits.read().await;
        let mut out: Vec<Visit> = visits
            .iter()
            .filter(|v| v.adopter_id == adopter_id)
            .cloned()
            .collect();
        out.sort_by_key(|v| v.scheduled_at);
        Ok(out)
    }

    async fn cancel(&self, visit_id: Uuid) -> Result<()> {
        let mut visits = self.visits.write().await;
        let visit = visits
            .iter_mut()
            .find(|v| v.id == visit_id)
            .ok_or_else(|| CoreError::NotFound(format!("visit {}", visit_id)))?;
        visit.status = VisitStatus::Cancelled;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stub-visits"
    }
}

impl Repositories {
    /// All-stub registry: deterministic data, no network
    pub fn stub() -> Self {
        Self {
            dogs: Arc::new(StubDogsRepository::default()),
            matching: Arc::new(StubMatchingRepository::default()),
            messages: Arc::new(StubMessagesRepository::default()),
            auth: Arc::new(StubAuthRepository::default()),
            storage: Arc::new(StubStorageRepository::default()),
            images: Arc::new(StubImagesRepository),
            push_token: Arc::new(StubPushTokenRepository::default()),
            articles: Arc::new(StubArticlesRepository::default()),
            visits: Arc::new(StubVisitsRepository::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_dogs_are_deterministic() {
        let repo = StubDogsRepository::default();
        let first = repo.dogs().await.unwrap();
        let second = repo.dogs().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
        assert_eq!(first[0].id, MANGO_ID);
    }

    #[tokio::test]
    async fn test_search_matches_name_and_breed() {
        let repo = StubDogsRepository::default();

        let by_name = repo.search("mango").await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, MANGO_ID);

        let by_breed = repo.search("poodle").await.unwrap();
        assert_eq!(by_breed.len(), 1);
        assert_eq!(by_breed[0].id, BORI_ID);

        let all = repo.search("").await.unwrap();
        assert_eq!(all.len(), 3);

        let none = repo.search("hamster").await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_missing_dog_is_not_found() {
        let repo = StubDogsRepository::default();
        let err = repo.dog(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_mutual_like_creates_match() {
        let repo = StubMatchingRepository::default();

        // Mango is pre-approved: liking her matches immediately
        let matched = repo.like(STUB_USER_ID, MANGO_ID).await.unwrap();
        assert!(matched.is_some());

        // Bori is not
        let unmatched = repo.like(STUB_USER_ID, BORI_ID).await.unwrap();
        assert!(unmatched.is_none());

        let matches = repo.matches(STUB_USER_ID).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].dog_id, MANGO_ID);

        // Repeated like does not duplicate the match
        let again = repo.like(STUB_USER_ID, MANGO_ID).await.unwrap();
        assert!(again.is_none());
        assert_eq!(repo.matches(STUB_USER_ID).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unlike_removes_match() {
        let repo = StubMatchingRepository::default();
        repo.like(STUB_USER_ID, MANGO_ID).await.unwrap();
        repo.unlike(STUB_USER_ID, MANGO_ID).await.unwrap();
        assert!(repo.matches(STUB_USER_ID).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_messages_roundtrip_and_validation() {
        let repo = StubMessagesRepository::default();
        let match_id = Uuid::new_v4();

        repo.send(match_id, STUB_USER_ID, "hi!").await.unwrap();
        repo.send(Uuid::new_v4(), STUB_USER_ID, "other thread").await.unwrap();

        let thread = repo.messages(match_id).await.unwrap();
        assert_eq!(thread.len(), 1);
        assert_eq!(thread[0].body, "hi!");

        let err = repo.send(match_id, STUB_USER_ID, "   ").await.unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_auth_session_lifecycle() {
        let repo = StubAuthRepository::default();
        assert!(repo.current_session().await.unwrap().is_none());

        let creds = Credentials {
            email: "adopter@example.com".to_string(),
            password: "secret1".to_string(),
        };
        let session = repo.sign_in(&creds).await.unwrap();
        assert_eq!(session.user_id, STUB_USER_ID);
        assert!(repo.current_session().await.unwrap().is_some());

        repo.sign_out().await.unwrap();
        assert!(repo.current_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_auth_rejects_bad_input() {
        let repo = StubAuthRepository::default();
        let err = repo
            .sign_in(&Credentials {
                email: "nope".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));

        let err = repo
            .sign_up(&Credentials {
                email: "a@b.c".to_string(),
                password: "shrt".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_storage_upload_download_delete() {
        let repo = StubStorageRepository::default();
        let url = repo
            .upload("avatars", "u1.jpg", vec![1, 2, 3])
            .await
            .unwrap();
        assert_eq!(url, "stub://avatars/u1.jpg");

        let bytes = repo.download("avatars", "u1.jpg").await.unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);

        repo.delete("avatars", "u1.jpg").await.unwrap();
        let err = repo.download("avatars", "u1.jpg").await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_visit_schedule_and_cancel() {
        let repo = StubVisitsRepository::default();
        let at = seed_time() + Duration::days(3);

        let visit = repo.schedule(STUB_USER_ID, MANGO_ID, at).await.unwrap();
        assert_eq!(visit.status, VisitStatus::Requested);

        repo.cancel(visit.id).await.unwrap();
        let visits = repo.visits(STUB_USER_ID).await.unwrap();
        assert_eq!(visits[0].status, VisitStatus::Cancelled);

        let err = repo.cancel(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_articles_lookup() {
        let repo = StubArticlesRepository::default();
        assert_eq!(repo.articles().await.unwrap().len(), 2);

        let article = repo.article("first-week-home").await.unwrap();
        assert_eq!(article.title, "Your dog's first week at home");

        let err = repo.article("missing").await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }
}
