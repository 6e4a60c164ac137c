// src/services/identity.rs
//! Identity federation contract used by the login flow

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("authorization code exchange failed: {0}")]
    Exchange(String),

    #[error("profile fetch failed: {0}")]
    ProfileFetch(String),

    #[error("malformed provider response: {0}")]
    Decode(String),
}

/// Profile attributes returned by the provider's userinfo endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAttributes {
    #[serde(rename = "id")]
    pub google_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "picture", default)]
    pub picture_url: String,
}

/// An external identity provider reachable over OAuth 2.0
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL the browser is sent to in order to start the login
    fn authorization_url(&self, state: &str) -> String;

    /// Exchange an authorization code for the user's profile
    async fn complete_login(&self, code: &str) -> Result<UserAttributes, IdentityError>;
}
