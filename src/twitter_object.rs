//! Twitter API (v1.1) response object definition
//! Only the properties used by the pages are kept, everything else is dropped on load
use serde::{Deserialize, Serialize};

/// A status from `statuses/user_timeline`
#[derive(Deserialize, Debug, Serialize, Clone)]
pub struct Status {
    pub id: u64,
    pub created_at: String,
    pub retweet_count: u64,
    pub text: String,
    #[serde(default)]
    pub entities: Entities,
}

#[derive(Deserialize, Debug, Serialize, Clone, Default)]
pub struct Entities {
    #[serde(default)]
    pub hashtags: Vec<Hashtag>,
    #[serde(default)]
    pub urls: Vec<UrlEntity>,
    #[serde(default)]
    pub user_mentions: Vec<UserMention>,
}

#[derive(Deserialize, Debug, Serialize, Clone)]
pub struct Hashtag {
    pub text: String,
}

#[derive(Deserialize, Debug, Serialize, Clone)]
pub struct UrlEntity {
    pub url: String,
}

#[derive(Deserialize, Debug, Serialize, Clone)]
pub struct UserMention {
    pub screen_name: String,
}

/// A user from `friends/list` or `account/verify_credentials`
#[derive(Deserialize, Debug, Serialize, Clone)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub screen_name: String,
    pub followers_count: u64,
    /// e.g. `Wed Oct 10 20:19:24 +0000 2018`
    pub created_at: String,
    #[serde(default)]
    pub profile_image_url: String,
}

/// Wrapper of `friends/list`, the users come with cursors
#[derive(Deserialize, Debug, Serialize)]
pub struct FriendsPage {
    pub users: Vec<User>,
    #[serde(default)]
    pub next_cursor: i64,
}

/// Error body, e.g. `{"errors":[{"code":34,"message":"Sorry, that page does not exist."}]}`
#[derive(Deserialize, Debug, Default)]
pub struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<ErrorItem>,
    /// Some endpoints answer with a bare `error` string instead
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ErrorItem {
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl ErrorResponse {
    pub fn codes(&self) -> impl Iterator<Item = i64> + '_ {
        self.errors.iter().map(|e| e.code)
    }

    pub fn message(&self) -> Option<String> {
        self.errors
            .first()
            .map(|e| e.message.clone())
            .or_else(|| self.error.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_with_entities() {
        let json = r#"{
            "id": 1050118621198921728,
            "created_at": "Wed Oct 10 20:19:24 +0000 2018",
            "retweet_count": 3,
            "text": "To make room for more expression #rust @rustlang https://t.co/abc",
            "favorite_count": 10,
            "entities": {
                "hashtags": [{"text": "rust", "indices": [33, 38]}],
                "urls": [{"url": "https://t.co/abc", "expanded_url": "https://example.com"}],
                "user_mentions": [{"screen_name": "rustlang", "id": 1}],
                "symbols": []
            }
        }"#;
        let status: Status = serde_json::from_str(json).unwrap();
        assert_eq!(status.id, 1050118621198921728);
        assert_eq!(status.entities.hashtags[0].text, "rust");
        assert_eq!(status.entities.urls[0].url, "https://t.co/abc");
        assert_eq!(status.entities.user_mentions[0].screen_name, "rustlang");
    }

    #[test]
    fn status_without_entities() {
        let json = r#"{"id": 1, "created_at": "x", "retweet_count": 0, "text": "hi"}"#;
        let status: Status = serde_json::from_str(json).unwrap();
        assert!(status.entities.hashtags.is_empty());
    }

    #[test]
    fn error_body_codes() {
        let json = r#"{"errors":[{"code":63,"message":"User has been suspended."}]}"#;
        let body: ErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.codes().collect::<Vec<_>>(), vec![63]);
        assert_eq!(body.message().as_deref(), Some("User has been suspended."));
    }
}
