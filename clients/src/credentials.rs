//! Credential capability.
//!
//! Token refresh is owned by whoever hosts the session; the clients only ask
//! for "a currently valid credential" right before each request.

use crate::error::ClientError;
use async_trait::async_trait;

/// Produces a bearer token for the next request, or fails.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn credential(&self) -> Result<String, ClientError>;
}

/// A fixed token, typically read from `API_ACCESS_TOKEN`.
#[derive(Debug, Clone)]
pub struct StaticCredential {
    token: String,
}

impl StaticCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn from_config() -> Self {
        Self::new(common::config::api_access_token())
    }
}

#[async_trait]
impl CredentialProvider for StaticCredential {
    async fn credential(&self) -> Result<String, ClientError> {
        if self.token.trim().is_empty() {
            return Err(ClientError::Credential(
                "no access token configured".to_string(),
            ));
        }
        Ok(self.token.clone())
    }
}
