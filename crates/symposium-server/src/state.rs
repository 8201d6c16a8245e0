//! Shared application state.
//!
//! One explicitly constructed context object passed to every handler; there
//! is no ambient global state anywhere in the server.

use std::sync::Arc;

use sqlx::PgPool;
use symposium_core::Roster;

use crate::storage::ArtifactStore;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub store: ArtifactStore,
    pub roster: Arc<Roster>,
}

impl AppState {
    pub fn new(pool: PgPool, store: ArtifactStore, roster: Roster) -> Self {
        Self {
            pool,
            store,
            roster: Arc::new(roster),
        }
    }
}
