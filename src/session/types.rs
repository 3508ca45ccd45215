// Session types and data structures

use crate::models::User;
use serde::{Deserialize, Serialize};

/// Paired access/refresh credentials plus their expiry markers, treated as a
/// single all-or-nothing unit. A partially persisted set is never surfaced
/// as a `TokenSet`; it reads back as no tokens at all.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_expires_in: String,
    pub refresh_token_expires_in: String,
}

/// Payload produced by the authentication backend and handed to
/// [`sign_in`](crate::SessionStore::sign_in). The transport that obtains it
/// is outside this crate.
#[derive(Debug, Clone, Deserialize)]
pub struct SignInParams {
    pub user: User,
    pub tokens: TokenSet,
}

/// Read-only view of the session handed to consumers. Tokens are withheld;
/// the HTTP layer requests them separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    /// True iff both the user record and a complete token set are present.
    pub is_authenticated: bool,
    pub is_admin: bool,
    /// True only while a `sign_in` call is in flight.
    pub is_loading: bool,
    /// Reason recorded by the most recent `sign_out`, for UI display.
    pub logout_message: Option<String>,
}

/// Session store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Storage key holding the serialized user record
    pub user_data_key: String,
    /// Storage key holding the access token
    pub access_token_key: String,
    /// Storage key holding the refresh token
    pub refresh_token_key: String,
    /// Storage key holding the access token expiry marker
    pub access_token_expires_in_key: String,
    /// Storage key holding the refresh token expiry marker
    pub refresh_token_expires_in_key: String,
    /// Buffer size of the snapshot notification channel
    pub notify_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_data_key: "user_data".to_string(),
            access_token_key: "access_token".to_string(),
            refresh_token_key: "refresh_token".to_string(),
            access_token_expires_in_key: "access_token_expires_in".to_string(),
            refresh_token_expires_in_key: "refresh_token_expires_in".to_string(),
            notify_capacity: 16,
        }
    }
}

impl SessionConfig {
    /// The five keys owned and written exclusively by the session store.
    pub fn session_keys(&self) -> [&str; 5] {
        [
            &self.user_data_key,
            &self.access_token_key,
            &self.refresh_token_key,
            &self.access_token_expires_in_key,
            &self.refresh_token_expires_in_key,
        ]
    }
}
