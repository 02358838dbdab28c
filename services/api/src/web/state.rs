//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use udaan_core::ports::{ApplicationRepository, JobRepository, UserRepository};
use udaan_core::workflow::ApplicationWorkflow;

use crate::config::Config;

/// The shared application state, created once at startup and passed to all
/// handlers. Repositories are held as trait objects so tests can swap in
/// the in-memory implementations.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub jobs: Arc<dyn JobRepository>,
    pub applications: Arc<dyn ApplicationRepository>,
    pub workflow: ApplicationWorkflow,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the workflow service over the given repositories.
    pub fn new(
        users: Arc<dyn UserRepository>,
        jobs: Arc<dyn JobRepository>,
        applications: Arc<dyn ApplicationRepository>,
        config: Arc<Config>,
    ) -> Self {
        let workflow = ApplicationWorkflow::new(users.clone(), jobs.clone(), applications.clone());
        Self {
            users,
            jobs,
            applications,
            workflow,
            config,
        }
    }
}
