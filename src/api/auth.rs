//! Bearer credential storage.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::{Error, Result};

/// Process-wide bearer token shared by every API call.
///
/// The token is absent until set, and any 401 response clears it so the user
/// has to provide a new one before further requests succeed.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    token: Arc<RwLock<Option<String>>>,
}

impl Credentials {
    /// Create a store holding `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Arc::new(RwLock::new(Some(token.into()))),
        }
    }

    /// Replace the stored token.
    pub async fn set(&self, token: impl Into<String>) {
        *self.token.write().await = Some(token.into());
    }

    /// Forget the stored token.
    pub async fn clear(&self) {
        *self.token.write().await = None;
    }

    /// Whether a token is currently stored.
    pub async fn is_set(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// `Authorization` header value for the stored token.
    pub async fn bearer(&self) -> Result<String> {
        let token = self.token.read().await;
        match token.as_deref() {
            Some(token) => Ok(format!("Bearer {}", token)),
            None => Err(Error::Authentication(
                "No Canvas token available; please set one again".into(),
            )),
        }
    }
}
