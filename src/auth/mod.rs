//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - Google OAuth login and callback
//! - Signed cookie sessions
//! - SessionUser extractor for protected routes

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod session;


pub use extractors::SessionUser;
pub use routes::auth_routes;
pub use session::SessionStore;
