//! Application State

use std::sync::Arc;

use zero_core::Skill;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Skills served by `/api/skills`, fixed at startup
    pub catalog: Arc<Vec<Skill>>,
}

impl AppState {
    pub fn new(catalog: Vec<Skill>) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}
