// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::auth::session::SessionStore;
use crate::services::IdentityProvider;

/// Handles built once at startup and injected into every request.
///
/// Nothing in here is mutated after construction.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub sessions: SessionStore,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(db: SqlitePool, sessions: SessionStore, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            db,
            sessions,
            identity,
        }
    }
}
