// Symposium Core - filename classification and record matching for the gallery

pub mod classify;
pub mod import;
pub mod reconcile;
pub mod roster;
pub mod similar;

pub use classify::{classify, Classification, FileKind};
pub use reconcile::{plan, ProjectRef, ReconcilePlan};
pub use roster::Roster;
pub use similar::{find_similar, parse_tags};
