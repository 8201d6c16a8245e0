//! Symposium Server - API for the student research gallery
//!
//! This crate provides the REST API server: public gallery listing and
//! detail views, admin CRUD with file uploads, CSV import, and filename
//! reconciliation against the intake bucket.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod storage;

pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;
