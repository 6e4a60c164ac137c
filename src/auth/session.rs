//! Signed cookie sessions
//!
//! The session attributes travel inside an HS256 JWT stored in the
//! `user-session` cookie. Nothing is kept server-side, so a cookie that
//! fails verification or has expired simply loads as an empty session.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use time::Duration;
use tracing::debug;

use super::extractors::SessionUser;

pub const SESSION_COOKIE: &str = "user-session";
pub const OAUTH_STATE_COOKIE: &str = "oauth-state";

/// Seven days
pub const SESSION_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 7;
pub const OAUTH_STATE_MAX_AGE_SECS: i64 = 60 * 10;

pub const KEY_GOOGLE_ID: &str = "google_id";
pub const KEY_NAME: &str = "name";
pub const KEY_EMAIL: &str = "email";
pub const KEY_PICTURE: &str = "picture";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to sign session cookie: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),
}

/// Claims carried by the session cookie
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub values: BTreeMap<String, String>,
    pub iat: usize,
    pub exp: usize,
}

/// Attribute bag bound to one browser
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    values: BTreeMap<String, String>,
}

impl Session {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Stages a mutation; it reaches the browser on the next `SessionStore::save`.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    /// The logged-in identity, if the identity key is present and non-empty.
    pub fn identity(&self) -> Option<SessionUser> {
        let google_id = self.get(KEY_GOOGLE_ID)?.trim();
        if google_id.is_empty() {
            return None;
        }

        Some(SessionUser {
            google_id: google_id.to_string(),
            name: self.get(KEY_NAME).unwrap_or_default().to_string(),
            email: self.get(KEY_EMAIL).unwrap_or_default().to_string(),
            picture: self.get(KEY_PICTURE).unwrap_or_default().to_string(),
        })
    }
}

#[derive(Clone)]
pub struct SessionStore {
    encoding: EncodingKey,
    decoding: DecodingKey,
    secure: bool,
}

impl SessionStore {
    pub fn new(secret: &[u8], secure: bool) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            secure,
        }
    }

    /// Loads the session carried by `jar`, or an empty one when the cookie is
    /// missing, tampered with, or expired.
    pub fn load(&self, jar: &CookieJar) -> Session {
        let Some(token) = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value())
            .filter(|t| !t.is_empty())
        else {
            return Session::default();
        };

        match decode::<SessionClaims>(
            token,
            &self.decoding,
            &Validation::new(Algorithm::HS256),
        ) {
            Ok(data) => Session {
                values: data.claims.values,
            },
            Err(e) => {
                debug!(error = %e, "Discarding unverifiable session cookie");
                Session::default()
            }
        }
    }

    /// Signs the session into a fresh cookie on `jar`.
    pub fn save(&self, jar: CookieJar, session: &Session) -> Result<CookieJar, SessionError> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            values: session.values.clone(),
            iat: now as usize,
            exp: (now + SESSION_MAX_AGE_SECS) as usize,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(jar.add(self.cookie(SESSION_COOKIE, token, SESSION_MAX_AGE_SECS)))
    }

    /// Makes the browser drop the session cookie.
    pub fn invalidate(&self, jar: CookieJar) -> CookieJar {
        jar.add(self.removal(SESSION_COOKIE))
    }

    /// The OAuth state sent with the last login redirect, if any.
    pub fn oauth_state(&self, jar: &CookieJar) -> Option<String> {
        jar.get(OAUTH_STATE_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn set_oauth_state(&self, jar: CookieJar, state: &str) -> CookieJar {
        jar.add(self.cookie(OAUTH_STATE_COOKIE, state.to_string(), OAUTH_STATE_MAX_AGE_SECS))
    }

    pub fn clear_oauth_state(&self, jar: CookieJar) -> CookieJar {
        jar.add(self.removal(OAUTH_STATE_COOKIE))
    }

    fn cookie(&self, name: &'static str, value: String, max_age_secs: i64) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .max_age(Duration::seconds(max_age_secs))
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .build()
    }

    /// Emptied cookie with a zero max-age and an expiry in the past.
    fn removal(&self, name: &'static str) -> Cookie<'static> {
        let mut cookie = self.cookie(name, String::new(), 0);
        cookie.make_removal();
        cookie
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    /// What the browser sends back: just the name and value.
    fn returned(jar: &CookieJar, name: &str) -> CookieJar {
        let value = jar.get(name).unwrap().value().to_string();
        CookieJar::new().add(Cookie::new(name.to_string(), value))
    }

    fn logged_in_session() -> Session {
        let mut session = Session::default();
        session.set(KEY_GOOGLE_ID, "10769150350006150715113082367");
        session.set(KEY_NAME, "Test User");
        session.set(KEY_EMAIL, "user@example.com");
        session.set(KEY_PICTURE, "https://example.com/p.png");
        session
    }

    #[test]
    fn test_missing_cookie_loads_empty_session() {
        let store = SessionStore::new(SECRET, false);
        let session = store.load(&CookieJar::new());

        assert_eq!(session, Session::default());
        assert!(session.identity().is_none());
    }

    #[test]
    fn test_save_then_load_restores_attributes() {
        let store = SessionStore::new(SECRET, false);
        let session = logged_in_session();

        let jar = store.save(CookieJar::new(), &session).unwrap();
        let cookie = jar.get(SESSION_COOKIE).unwrap();
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::days(7)));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_ne!(cookie.secure(), Some(true));

        let loaded = store.load(&returned(&jar, SESSION_COOKIE));
        let user = loaded.identity().expect("identity should survive round trip");
        assert_eq!(user.google_id, "10769150350006150715113082367");
        assert_eq!(user.name, "Test User");
        assert_eq!(user.email, "user@example.com");
        assert_eq!(loaded, session);
    }

    #[test]
    fn test_secure_flag_in_production() {
        let store = SessionStore::new(SECRET, true);
        let jar = store.save(CookieJar::new(), &logged_in_session()).unwrap();
        assert_eq!(jar.get(SESSION_COOKIE).unwrap().secure(), Some(true));

        let cleared = store.invalidate(CookieJar::new());
        assert_eq!(cleared.get(SESSION_COOKIE).unwrap().secure(), Some(true));
    }

    #[test]
    fn test_cookie_signed_with_other_secret_is_rejected() {
        let forger = SessionStore::new(b"another-secret-another-secret-xx", false);
        let store = SessionStore::new(SECRET, false);

        let forged = forger.save(CookieJar::new(), &logged_in_session()).unwrap();
        assert_eq!(
            store.load(&returned(&forged, SESSION_COOKIE)),
            Session::default()
        );
    }

    #[test]
    fn test_garbage_cookie_is_rejected() {
        let store = SessionStore::new(SECRET, false);
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, "not.a.jwt"));
        assert_eq!(store.load(&jar), Session::default());
    }

    #[test]
    fn test_expired_cookie_is_rejected() {
        let store = SessionStore::new(SECRET, false);
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            values: BTreeMap::from([(KEY_GOOGLE_ID.to_string(), "g-1".to_string())]),
            iat: (now - SESSION_MAX_AGE_SECS - 7200) as usize,
            exp: (now - 7200) as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, token));
        assert_eq!(store.load(&jar), Session::default());
    }

    #[test]
    fn test_blank_identity_key_is_not_logged_in() {
        let mut session = Session::default();
        session.set(KEY_GOOGLE_ID, "   ");
        session.set(KEY_NAME, "Nobody");
        assert!(session.identity().is_none());
    }

    #[test]
    fn test_invalidate_expires_cookie() {
        let store = SessionStore::new(SECRET, false);
        let jar = store.invalidate(CookieJar::new());
        let cleared = jar.get(SESSION_COOKIE).unwrap();

        assert_eq!(cleared.value(), "");
        assert_eq!(cleared.max_age(), Some(Duration::ZERO));
        assert_eq!(cleared.path(), Some("/"));
        assert!(store.load(&jar).identity().is_none());
    }

    #[test]
    fn test_oauth_state_cookie() {
        let store = SessionStore::new(SECRET, false);
        assert_eq!(store.oauth_state(&CookieJar::new()), None);

        let jar = store.set_oauth_state(CookieJar::new(), "abc123");
        let cookie = jar.get(OAUTH_STATE_COOKIE).unwrap();
        assert_eq!(cookie.max_age(), Some(Duration::minutes(10)));
        assert_eq!(store.oauth_state(&jar).as_deref(), Some("abc123"));

        let jar = store.clear_oauth_state(jar);
        assert_eq!(store.oauth_state(&jar), None);
    }
}
