use std::collections::HashMap;

use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Claims carried by every session token.
///
/// `sub`, `exp`, `iat` and `jti` are always present. The random `jti` makes
/// two tokens minted for the same subject within the same second distinct.
/// Anything else (e.g. `username` on access tokens) goes into `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Unique token identifier
    pub jti: String,

    /// Additional custom fields (flattened into token)
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// Create claims for `subject` that expire `ttl` from now.
    ///
    /// A negative `ttl` yields claims that are already expired.
    pub fn for_subject(subject: impl ToString, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: subject.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
            extra: HashMap::new(),
        }
    }

    /// Add a custom field.
    pub fn with_extra(mut self, key: impl ToString, value: impl Serialize) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.extra.insert(key.to_string(), json_value);
        }
        self
    }

    /// Username stored by access tokens.
    pub fn username(&self) -> Option<&str> {
        self.extra.get("username").and_then(|v| v.as_str())
    }
}
