// src/services/google.rs
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info};

use super::identity::{IdentityError, IdentityProvider, UserAttributes};
use crate::common::config::GoogleOAuthConfig;
use crate::common::{safe_email_log, safe_token_log};

/// Scopes requested on every login: email address and basic profile
pub const LOGIN_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/userinfo.profile",
];

#[derive(Debug, Clone)]
pub struct GoogleEndpoints {
    pub authorize: String,
    pub token: String,
    pub userinfo: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            authorize: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token: "https://oauth2.googleapis.com/token".to_string(),
            userinfo: "https://www.googleapis.com/oauth2/v2/userinfo".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct GoogleIdentityClient {
    client: Client,
    config: GoogleOAuthConfig,
    endpoints: GoogleEndpoints,
}

impl GoogleIdentityClient {
    /// Every outbound call made by this client is bounded by `timeout`.
    pub fn new(config: GoogleOAuthConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            config,
            endpoints: GoogleEndpoints::default(),
        })
    }

    #[cfg(test)]
    pub fn with_endpoints(mut self, endpoints: GoogleEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, IdentityError> {
        let params = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_url.as_str()),
            ("grant_type", "authorization_code"),
        ];

        debug!(code = %safe_token_log(code), "Exchanging authorization code for tokens");

        let response = self
            .client
            .post(&self.endpoints.token)
            .form(&params)
            .send()
            .await
            .map_err(|e| IdentityError::Exchange(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| IdentityError::Exchange(e.to_string()))?;

        if !status.is_success() {
            error!(status = %status, error = %body, "Token exchange failed");
            return Err(IdentityError::Exchange(format!("HTTP {}", status)));
        }

        parse_token_response(&body)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<UserAttributes, IdentityError> {
        let response = self
            .client
            .get(&self.endpoints.userinfo)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| IdentityError::ProfileFetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, "Userinfo request was rejected");
            return Err(IdentityError::ProfileFetch(format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| IdentityError::ProfileFetch(e.to_string()))?;

        parse_profile(&body)
    }
}

fn parse_token_response(body: &str) -> Result<TokenResponse, IdentityError> {
    let token = serde_json::from_str::<TokenResponse>(body)
        .map_err(|e| IdentityError::Decode(format!("token response: {}", e)))?;

    if token.access_token.is_empty() {
        return Err(IdentityError::Decode(
            "token response has an empty access_token".to_string(),
        ));
    }

    Ok(token)
}

fn parse_profile(body: &str) -> Result<UserAttributes, IdentityError> {
    let profile = serde_json::from_str::<UserAttributes>(body)
        .map_err(|e| IdentityError::Decode(format!("userinfo response: {}", e)))?;

    if profile.google_id.trim().is_empty() {
        return Err(IdentityError::Decode(
            "userinfo response has an empty id".to_string(),
        ));
    }
    if profile.email.trim().is_empty() {
        return Err(IdentityError::Decode(
            "userinfo response has no email".to_string(),
        ));
    }

    Ok(profile)
}

#[async_trait]
impl IdentityProvider for GoogleIdentityClient {
    fn authorization_url(&self, state: &str) -> String {
        let scope_param = LOGIN_SCOPES.join(" ");

        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&state={}",
            self.endpoints.authorize,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_url),
            urlencoding::encode(&scope_param),
            urlencoding::encode(state)
        )
    }

    async fn complete_login(&self, code: &str) -> Result<UserAttributes, IdentityError> {
        let token = self.exchange_code(code).await?;
        debug!(
            token_type = token.token_type.as_deref().unwrap_or("unknown"),
            expires_in = token.expires_in.unwrap_or_default(),
            "Received access token"
        );

        let profile = self.fetch_profile(&token.access_token).await?;
        info!(
            google_id = %profile.google_id,
            email = %safe_email_log(&profile.email),
            "Fetched Google profile"
        );

        Ok(profile)
    }
}
