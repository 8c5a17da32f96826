//! zero-agent HTTP Server
//!
//! Serves the skill catalog API consumed by the dashboard and hosts the
//! compiled WASM frontend. Accounts, agents and installed skills live in the
//! hosted auth/data project and never pass through here.

mod catalog;
mod handlers;
mod state;

use std::path::{Path, PathBuf};

use axum::{Router, routing::get};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::handlers::{health_check, list_skills};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let catalog_path = std::env::var("SKILLS_CATALOG").ok().map(PathBuf::from);
    let skills = catalog::load(catalog_path.as_deref())?;
    match &catalog_path {
        Some(path) => tracing::info!("✓ Loaded {} skills from {}", skills.len(), path.display()),
        None => tracing::info!("✓ Using built-in catalog ({} skills)", skills.len()),
    }

    let static_dir = PathBuf::from(std::env::var("STATIC_DIR").unwrap_or_else(|_| "static".into()));
    if !static_dir.join("index.html").exists() {
        tracing::warn!("⚠ No index.html in {} - frontend not built", static_dir.display());
        tracing::warn!("  Build it with: trunk build --release -d {}", static_dir.display());
    }

    let app = router(AppState::new(skills), &static_dir);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 zero-agent server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health          - Health check");
    tracing::info!("  GET  /api/skills      - Skill catalog");
    tracing::info!("  GET  /*               - Frontend ({})", static_dir.display());
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router
fn router(state: AppState, static_dir: &Path) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Unknown paths fall back to index.html so client-side routes survive a reload
    let frontend = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/skills", get(list_skills))
        .fallback_service(frontend)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use tower::ServiceExt;
    use zero_core::model::SkillCatalogResponse;

    use super::*;

    fn test_router() -> (Router, PathBuf) {
        let dir = std::env::temp_dir().join(format!("zero-server-static-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("index.html"), "<!doctype html><title>zero</title>").unwrap();
        (router(AppState::new(catalog::builtin()), &dir), dir)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _dir) = test_router();
        let (status, body) = get(app, "/health").await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["skills"], catalog::builtin().len());
    }

    #[tokio::test]
    async fn test_list_skills() {
        let (app, _dir) = test_router();
        let (status, body) = get(app, "/api/skills").await;

        assert_eq!(status, StatusCode::OK);
        let parsed: SkillCatalogResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed.skills, catalog::builtin());
    }

    #[tokio::test]
    async fn test_list_skills_by_category() {
        let (app, _dir) = test_router();
        let (_, body) = get(app, "/api/skills?category=Utility").await;

        let parsed: SkillCatalogResponse = serde_json::from_slice(&body).unwrap();
        assert!(!parsed.skills.is_empty());
        assert!(parsed.skills.iter().all(|s| s.category == "utility"));
    }

    #[tokio::test]
    async fn test_client_routes_fall_back_to_index() {
        let (app, _dir) = test_router();
        let (status, body) = get(app, "/dashboard").await;

        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8_lossy(&body).contains("<title>zero</title>"));
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let (app, _dir) = test_router();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/skills")
                    .header(header::ORIGIN, "http://localhost:8080")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }
}
