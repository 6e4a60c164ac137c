//! Authentication handlers

use askama::Template;
use axum::{
    extract::{Extension, Query},
    response::{Html, IntoResponse, Redirect},
};
use axum_extra::extract::cookie::CookieJar;
use rand::{distributions::Alphanumeric, Rng};
use std::sync::Arc;
use tracing::{info, warn};

use super::extractors::SessionUser;
use super::models::OAuthCallbackQuery;
use super::session::{KEY_EMAIL, KEY_GOOGLE_ID, KEY_NAME, KEY_PICTURE};
use crate::common::{safe_email_log, safe_token_log, ApiError, AppState};

const OAUTH_STATE_LEN: usize = 32;

fn generate_oauth_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(OAUTH_STATE_LEN)
        .map(char::from)
        .collect()
}

/// Landing page
#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub signed_in: bool,
    pub name: String,
}

/// GET / - Entry point with a link to sign in
pub async fn home(user: Option<SessionUser>) -> Result<Html<String>, ApiError> {
    let page = HomeTemplate {
        signed_in: user.is_some(),
        name: user.map(|u| u.name).unwrap_or_default(),
    };
    Ok(Html(page.render()?))
}

/// GET /auth/login - Redirect the browser to the identity provider
pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    jar: CookieJar,
) -> impl IntoResponse {
    let oauth_state = generate_oauth_state();
    let auth_url = state.identity.authorization_url(&oauth_state);

    info!("Redirecting to identity provider for login");

    (
        state.sessions.set_oauth_state(jar, &oauth_state),
        Redirect::temporary(&auth_url),
    )
}

/// GET /auth/callback - Complete the login and establish the session
///
/// Provider failures only fail this request.
pub async fn callback(
    Extension(state): Extension<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<OAuthCallbackQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(error) = params.error {
        warn!(oauth_error = %error, "Identity provider returned an error");
        return Err(ApiError::BadRequest(
            "Authorization was not granted".to_string(),
        ));
    }

    let code = params
        .code
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| {
            warn!("No authorization code in OAuth callback");
            ApiError::BadRequest("No authorization code provided".to_string())
        })?;

    let expected_state = state.sessions.oauth_state(&jar);
    if expected_state.is_none() || expected_state != params.state {
        warn!(
            has_state_cookie = expected_state.is_some(),
            "OAuth state mismatch in callback"
        );
        return Err(ApiError::BadRequest("Invalid OAuth state".to_string()));
    }

    info!(code = %safe_token_log(&code), "Received OAuth callback");

    let profile = state.identity.complete_login(&code).await?;

    let mut session = state.sessions.load(&jar);
    session.set(KEY_GOOGLE_ID, profile.google_id.as_str());
    session.set(KEY_NAME, profile.name.as_str());
    session.set(KEY_EMAIL, profile.email.as_str());
    session.set(KEY_PICTURE, profile.picture_url.as_str());
    let jar = state.sessions.save(jar, &session)?;
    let jar = state.sessions.clear_oauth_state(jar);

    info!(
        google_id = %profile.google_id,
        email = %safe_email_log(&profile.email),
        "User logged in"
    );

    Ok((jar, Redirect::to("/dashboard")))
}

/// POST /logout - Drop the session cookie
pub async fn logout(
    Extension(state): Extension<Arc<AppState>>,
    jar: CookieJar,
) -> impl IntoResponse {
    if let Some(user) = state.sessions.load(&jar).identity() {
        info!(
            google_id = %user.google_id,
            email = %safe_email_log(&user.email),
            "User logged out"
        );
    }

    (state.sessions.invalidate(jar), Redirect::to("/"))
}
