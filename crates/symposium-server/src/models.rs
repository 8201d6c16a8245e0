//! Database models for the symposium gallery.

pub mod account;
pub mod project;
pub mod session;

pub use account::Account;
pub use project::Project;
pub use session::Session;
