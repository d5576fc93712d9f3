// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{config::Config, store::DocumentStore, utils::jwt::IdentityVerifier};

/// Shared per-process state. Both collaborators sit behind trait objects so
/// tests can swap in the in-memory store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub config: Config,
}

impl FromRef<AppState> for Arc<dyn DocumentStore> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.store)
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
