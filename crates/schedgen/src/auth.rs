//! Bearer-token identities for the saved-schedule endpoints.
//!
//! The config only stores SHA-256 digests of tokens, never the tokens
//! themselves. A presented token is hashed and looked up by digest.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// A configured API user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiUser {
    pub username: String,
    /// Lowercase hex SHA-256 of the user's bearer token
    pub token_sha256: String,
}

/// The authenticated caller, attached to requests by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(pub String);

impl Identity {
    pub fn username(&self) -> &str {
        &self.0
    }
}

/// Digest -> username lookup.
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    users: HashMap<String, String>,
}

impl TokenRegistry {
    pub fn new(users: &[ApiUser]) -> Self {
        Self {
            users: users
                .iter()
                .map(|u| (u.token_sha256.to_ascii_lowercase(), u.username.clone()))
                .collect(),
        }
    }

    /// Resolves a presented token to its user, if any.
    pub fn identify(&self, token: &str) -> Option<Identity> {
        self.users
            .get(&hash_token(token))
            .map(|username| Identity(username.clone()))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Lowercase hex SHA-256 of `token`.
pub fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(digest)
}

/// Returns true if `s` looks like a hex SHA-256 digest.
pub fn is_token_digest(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit())
}
