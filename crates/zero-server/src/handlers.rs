//! HTTP Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use zero_core::model::SkillCatalogResponse;

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub skills: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    /// Only return skills in this category
    #[serde(default)]
    pub category: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        skills: state.catalog.len(),
    })
}

/// The skill catalog
pub async fn list_skills(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Json<SkillCatalogResponse> {
    let skills = match query.category.as_deref() {
        Some(category) => state
            .catalog
            .iter()
            .filter(|s| s.category.eq_ignore_ascii_case(category))
            .cloned()
            .collect(),
        None => state.catalog.as_ref().clone(),
    };

    tracing::debug!(count = skills.len(), category = ?query.category, "serving skill catalog");
    Json(SkillCatalogResponse { skills })
}
