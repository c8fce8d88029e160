//! Identity provider boundary - session resolution.
//!
//! The external identity service is the authentication ground truth; this
//! module only asks it who a session token belongs to. Tokens are never
//! re-validated locally.

use anyhow::anyhow;
use async_trait::async_trait;
use crm_core::error::AppError;
use reqwest::StatusCode;
use serde::Deserialize;

/// The principal as reported by the identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityUser {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
}

/// Boundary trait for the external identity provider.
///
/// `get_user` returns `Ok(None)` for absent, expired, or otherwise invalid
/// tokens - an invalid session is an expected outcome, not an error. Errors
/// are reserved for transport failures.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn get_user(&self, session_token: &str) -> Result<Option<IdentityUser>, AppError>;
}

/// HTTP client for the identity provider's userinfo endpoint.
#[derive(Clone)]
pub struct HttpIdentityProvider {
    http: reqwest::Client,
    base_url: String,
}

impl HttpIdentityProvider {
    pub fn new(base_url: String, timeout: std::time::Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::ConfigError(anyhow!("identity HTTP client: {}", e)))?;
        Ok(Self { http, base_url })
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn get_user(&self, session_token: &str) -> Result<Option<IdentityUser>, AppError> {
        let url = format!("{}/v1/userinfo", self.base_url.trim_end_matches('/'));
        let response = self
            .http
            .get(&url)
            .bearer_auth(session_token)
            .send()
            .await
            .map_err(|e| AppError::IdentityProvider(anyhow!("userinfo request failed: {}", e)))?;

        match response.status() {
            StatusCode::OK => {
                let user = response.json::<IdentityUser>().await.map_err(|e| {
                    AppError::IdentityProvider(anyhow!("malformed userinfo response: {}", e))
                })?;
                Ok(Some(user))
            }
            StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND => Ok(None),
            status => Err(AppError::IdentityProvider(anyhow!(
                "userinfo returned unexpected status {}",
                status
            ))),
        }
    }
}

/// In-memory provider mapping fixed tokens to users. Used by tests.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityProvider {
    users: std::sync::Arc<std::sync::Mutex<std::collections::HashMap<String, IdentityUser>>>,
}

impl StaticIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, token: &str, user: IdentityUser) {
        self.users
            .lock()
            .expect("identity map poisoned")
            .insert(token.to_string(), user);
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn get_user(&self, session_token: &str) -> Result<Option<IdentityUser>, AppError> {
        Ok(self
            .users
            .lock()
            .expect("identity map poisoned")
            .get(session_token)
            .cloned())
    }
}
