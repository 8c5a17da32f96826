//! Skill Catalog Client

use async_trait::async_trait;
use zero_core::{
    error::{ClientError, Result},
    model::{Skill, SkillCatalogResponse},
    service::SkillCatalog,
};

use crate::config::ClientConfig;

/// Client for `GET {base_url}/api/skills`
pub struct HttpSkillCatalog {
    base_url: String,
    http: reqwest::Client,
}

impl HttpSkillCatalog {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.skills_api_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl SkillCatalog for HttpSkillCatalog {
    async fn list_skills(&self) -> Result<Vec<Skill>> {
        let url = format!("{}/api/skills", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Network(format!(
                "skill catalog returned {status}"
            )));
        }

        let body: SkillCatalogResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        tracing::debug!(count = body.skills.len(), "loaded skill catalog");
        Ok(body.skills)
    }
}
