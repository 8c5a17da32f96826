//! Shared services

use std::sync::Arc;

use zero_client::{ClientConfig, HttpSkillCatalog, SupabaseClient};
use zero_core::Result;

use crate::storage;

/// Clients shared by every page through Leptos context
#[derive(Clone)]
pub struct AppContext {
    pub client: Arc<SupabaseClient>,
    pub catalog: Arc<HttpSkillCatalog>,
}

impl AppContext {
    /// Build the clients from the endpoints baked in at compile time and
    /// restore any session saved by an earlier visit
    pub fn from_build_env() -> Result<Self> {
        let config = ClientConfig::from_build_env()?;
        let client = SupabaseClient::from_config(&config);
        client.set_session(storage::load_session());

        tracing::info!(
            supabase_url = %config.supabase_url,
            skills_api_url = %config.skills_api_url,
            "frontend configured"
        );

        Ok(Self {
            client: Arc::new(client),
            catalog: Arc::new(HttpSkillCatalog::from_config(&config)),
        })
    }

    /// Mirror the client's current session into browser storage
    pub fn persist_session(&self) {
        storage::save_session(self.client.session().as_ref());
    }
}
