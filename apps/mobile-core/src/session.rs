//! Process-wide session state: the token pair and its persistence.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::credentials::{CredentialStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use crate::error::ClientError;

/// The token pair issued at login.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Handle to the active session.
///
/// All reads go through the credential store so that every caller sees the
/// latest persisted tokens; concurrent writes are last-write-wins, which is
/// safe because token values are idempotent replacements. The session also
/// carries the gate that serializes concurrent refresh attempts.
pub struct Session {
    store: Arc<dyn CredentialStore>,
    refresh_gate: Mutex<()>,
}

impl Session {
    pub fn new(store: Arc<dyn CredentialStore>) -> Arc<Self> {
        Arc::new(Self {
            store,
            refresh_gate: Mutex::new(()),
        })
    }

    /// Whether a stored session exists (app-start restore check).
    pub async fn has_session(&self) -> Result<bool, ClientError> {
        Ok(self.access_token().await?.is_some())
    }

    /// Current access token, if any.
    pub async fn access_token(&self) -> Result<Option<String>, ClientError> {
        self.store.get(ACCESS_TOKEN_KEY).await
    }

    /// Current refresh token, if any.
    pub async fn refresh_token(&self) -> Result<Option<String>, ClientError> {
        self.store.get(REFRESH_TOKEN_KEY).await
    }

    /// Persist a full token pair (login).
    pub async fn log_in(&self, tokens: &TokenPair) -> Result<(), ClientError> {
        self.store.set(ACCESS_TOKEN_KEY, &tokens.access_token).await?;
        self.store.set(REFRESH_TOKEN_KEY, &tokens.refresh_token).await
    }

    /// Persist a newly minted access token (refresh). The refresh token is
    /// left untouched.
    pub async fn store_access_token(&self, token: &str) -> Result<(), ClientError> {
        self.store.set(ACCESS_TOKEN_KEY, token).await
    }

    /// Persist a rotated refresh token, when the service issues one.
    pub async fn store_refresh_token(&self, token: &str) -> Result<(), ClientError> {
        self.store.set(REFRESH_TOKEN_KEY, token).await
    }

    /// Drop both tokens (logout, or terminal refresh failure).
    pub async fn clear(&self) -> Result<(), ClientError> {
        self.store.remove(ACCESS_TOKEN_KEY).await?;
        self.store.remove(REFRESH_TOKEN_KEY).await
    }

    /// Gate serializing refresh attempts. Held across the refresh HTTP call,
    /// so it must be a tokio mutex.
    pub(crate) fn refresh_gate(&self) -> &Mutex<()> {
        &self.refresh_gate
    }
}
