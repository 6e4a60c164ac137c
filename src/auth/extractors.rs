//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::common::{safe_email_log, ApiError, AppState};

/// Identity of the logged-in browser, read from the session cookie
///
/// Rejects with 401 when the session has no identity key. HTML routes take
/// `Option<SessionUser>` instead and redirect to the entry point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionUser {
    pub google_id: String,
    pub name: String,
    pub email: String,
    pub picture: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(app_state): Extension<Arc<AppState>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let jar = CookieJar::from_headers(&parts.headers);
        let session = app_state.sessions.load(&jar);

        match session.identity() {
            Some(user) => {
                debug!(
                    google_id = %user.google_id,
                    email = %safe_email_log(&user.email),
                    "Session authenticated"
                );
                Ok(user)
            }
            None => {
                warn!(path = %parts.uri.path(), "Rejected request without a valid session");
                Err(ApiError::Unauthorized("not logged in".into()))
            }
        }
    }
}
