//! Records exchanged with the REST API.
//!
//! Records serialize with camelCase keys. They deserialize from documents
//! whose keys were folded to lowercase by [`crate::wire`], which is how
//! field names are matched case-insensitively; go through `wire` rather
//! than calling `serde_json::from_str` on them directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Post {
    pub id: String,
    pub username: String,
    pub content: String,
    #[serde(
        rename(deserialize = "createdat"),
        default,
        deserialize_with = "timestamp::deserialize"
    )]
    pub created_at: DateTime<Utc>,
    #[serde(
        rename(deserialize = "updatedat"),
        default,
        deserialize_with = "timestamp::deserialize"
    )]
    pub updated_at: DateTime<Utc>,
    #[serde(rename(deserialize = "likescount"), default)]
    pub likes_count: u64,
    #[serde(rename(deserialize = "commentscount"), default)]
    pub comments_count: u64,
    #[serde(rename(deserialize = "isliked"), default)]
    pub is_liked: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Comment {
    pub id: String,
    #[serde(rename(deserialize = "postid"))]
    pub post_id: String,
    pub username: String,
    pub content: String,
    #[serde(
        rename(deserialize = "createdat"),
        default,
        deserialize_with = "timestamp::deserialize"
    )]
    pub created_at: DateTime<Utc>,
    #[serde(
        rename(deserialize = "updatedat"),
        default,
        deserialize_with = "timestamp::deserialize"
    )]
    pub updated_at: DateTime<Utc>,
}

/// Body of create/update calls for posts and comments.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentRequest {
    pub username: String,
    pub content: String,
}

impl ContentRequest {
    pub fn new(username: impl Into<String>, content: impl Into<String>) -> Self {
        ContentRequest {
            username: username.into(),
            content: content.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LikeRequest {
    pub username: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct LikeResponse {
    #[serde(rename(deserialize = "likescount"), default)]
    pub likes_count: u64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

/// The active user. Only ever a username, never a credential.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Identity {
    #[serde(default)]
    pub username: String,
}

impl Identity {
    pub fn new(username: impl Into<String>) -> Self {
        Identity {
            username: username.into(),
        }
    }
}

// Servers disagree on whether timestamps carry an offset; naive ones are UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp `{}`", raw)))
    }

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }

        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn posts_serialize_with_camel_case_keys() {
        let post = Post {
            id: "p1".into(),
            username: "alice".into(),
            content: "hello".into(),
            likes_count: 2,
            comments_count: 1,
            is_liked: true,
            ..Post::default()
        };

        let value = serde_json::to_value(&post).unwrap();
        assert_eq!(value["likesCount"], 2);
        assert_eq!(value["commentsCount"], 1);
        assert_eq!(value["isLiked"], true);
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn timestamps_accept_offsets_and_naive_values() {
        let expected = Utc.with_ymd_and_hms(2025, 5, 30, 10, 30, 0).unwrap();

        assert_eq!(timestamp::parse("2025-05-30T10:30:00Z"), Some(expected));
        assert_eq!(timestamp::parse("2025-05-30T12:30:00+02:00"), Some(expected));
        assert_eq!(timestamp::parse("2025-05-30T10:30:00"), Some(expected));
        assert_eq!(timestamp::parse("2025-05-30T10:30:00.000"), Some(expected));
        assert_eq!(timestamp::parse("yesterday"), None);
    }
}
