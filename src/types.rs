//! Domain types shared by the state tree and the repositories
//!
//! All types use camelCase JSON serialization for wire compatibility
//! with the backend tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An adoptable dog profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dog {
    /// Unique dog identifier
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Breed label (free-form, shelter-provided)
    pub breed: String,

    /// Age in years
    pub age: u8,

    pub gender: Gender,

    pub size: DogSize,

    /// Shelter-written introduction
    pub bio: String,

    /// Name of the hosting shelter
    pub shelter_name: String,

    /// Carousel image URLs, first is the cover
    #[serde(default)]
    pub image_urls: Vec<String>,

    /// Temperament notes (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality: Option<String>,

    /// Health/vaccination notes (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Gender {
    Male,
    Female,
}

/// Size class used for matching filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DogSize {
    Small,
    Medium,
    Large,
}

/// An adopter (end-user) profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Adopter {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Preferred size filter, if the adopter set one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_size: Option<DogSize>,
}

/// A confirmed mutual match between an adopter and a dog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub id: Uuid,
    pub dog_id: Uuid,
    pub adopter_id: Uuid,
    pub matched_at: DateTime<Utc>,
}

/// A chat message inside a match conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub match_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

impl Message {
    /// Build a message with a fresh id and the current timestamp
    pub fn new(match_id: Uuid, sender_id: Uuid, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            match_id,
            sender_id,
            body: body.into(),
            sent_at: Utc::now(),
        }
    }
}

/// An editorial article (adoption guides, shelter news)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: Uuid,
    /// URL-stable identifier used for lookup
    pub slug: String,
    pub title: String,
    pub body: String,
    pub published_at: DateTime<Utc>,
}

/// A scheduled shelter visit (playdate or adoption interview)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub id: Uuid,
    pub dog_id: Uuid,
    pub adopter_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub status: VisitStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VisitStatus {
    Requested,
    Confirmed,
    Cancelled,
    Completed,
}

/// An authenticated backend session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user_id: Uuid,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

/// Sign-in / sign-up credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dog_json_roundtrip() {
        let dog = Dog {
            id: Uuid::new_v4(),
            name: "Mango".to_string(),
            breed: "Jindo mix".to_string(),
            age: 3,
            gender: Gender::Female,
            size: DogSize::Medium,
            bio: "Gentle, loves walks".to_string(),
            shelter_name: "Seongdong Shelter".to_string(),
            image_urls: vec!["https://cdn.example/mango-1.jpg".to_string()],
            personality: Some("calm".to_string()),
            health_status: None,
        };

        let json = serde_json::to_string(&dog).unwrap();
        assert!(json.contains("\"shelterName\""));
        assert!(json.contains("\"imageUrls\""));
        assert!(!json.contains("healthStatus"));

        let back: Dog = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dog);
    }

    #[test]
    fn test_dog_optional_fields_default() {
        let json = r#"{
            "id": "7a4c7b5e-1111-4e5e-9c1a-000000000001",
            "name": "Bori",
            "breed": "Poodle",
            "age": 2,
            "gender": "male",
            "size": "small",
            "bio": "",
            "shelterName": "Mapo Shelter"
        }"#;
        let dog: Dog = serde_json::from_str(json).unwrap();
        assert!(dog.image_urls.is_empty());
        assert!(dog.personality.is_none());
        assert_eq!(dog.gender, Gender::Male);
    }

    #[test]
    fn test_message_new_fills_identity() {
        let match_id = Uuid::new_v4();
        let sender = Uuid::new_v4();
        let msg = Message::new(match_id, sender, "hello");
        assert_eq!(msg.match_id, match_id);
        assert_eq!(msg.sender_id, sender);
        assert_eq!(msg.body, "hello");
    }
}
