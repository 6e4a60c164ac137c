//! # Expenses Module
//!
//! This module handles the expense records of signed-in users:
//! - User registration on first dashboard view
//! - Adding, listing and deleting expenses
//! - Totals and the dashboard page

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;
pub mod views;


pub use routes::expenses_routes;
