use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ClientError;

/// Store key for the short-lived access token.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
/// Store key for the long-lived refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Abstraction over the on-device credential store.
///
/// Backed by the platform keystore in a real shell and an in-memory map in
/// tests. Values are opaque strings; the core only ever stores the two token
/// keys above.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, ClientError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), ClientError>;
    async fn remove(&self, key: &str) -> Result<(), ClientError>;
}

// ---------------------------------------------------------------------------
// In-memory implementation (tests, console app)
// ---------------------------------------------------------------------------

pub struct MemoryStore {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        Ok(self.data.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        self.data
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), ClientError> {
        self.data.lock().unwrap().remove(key);
        Ok(())
    }
}
