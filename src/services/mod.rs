// src/services/mod.rs
//
// Outbound integrations shared by the domain modules

pub mod google;
pub mod identity;

pub use google::GoogleIdentityClient;
pub use identity::{IdentityError, IdentityProvider, UserAttributes};
