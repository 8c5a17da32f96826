//! Skill Catalog Source
//!
//! The catalog is read once at startup, either from the JSON file named by
//! `SKILLS_CATALOG` (same shape as the `/api/skills` response) or from the
//! built-in list below.

use std::path::Path;

use thiserror::Error;
use zero_core::model::{Skill, SkillCatalogResponse};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid catalog file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("duplicate skill id in catalog: {0}")]
    DuplicateId(String),
}

/// Load the catalog from `path`, or the built-in one when `None`
pub fn load(path: Option<&Path>) -> Result<Vec<Skill>, CatalogError> {
    let Some(path) = path else {
        return Ok(builtin());
    };

    let display = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: display.clone(),
        source,
    })?;
    let parsed: SkillCatalogResponse =
        serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
            path: display,
            source,
        })?;

    check_unique(&parsed.skills)?;
    Ok(parsed.skills)
}

fn check_unique(skills: &[Skill]) -> Result<(), CatalogError> {
    let mut seen = std::collections::HashSet::new();
    for skill in skills {
        if !seen.insert(skill.id.as_str()) {
            return Err(CatalogError::DuplicateId(skill.id.clone()));
        }
    }
    Ok(())
}

fn skill(id: &str, name: &str, description: &str, category: &str, icon: &str) -> Skill {
    Skill {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        category: category.into(),
        icon: icon.into(),
    }
}

/// Catalog served when no file is configured
pub fn builtin() -> Vec<Skill> {
    vec![
        skill(
            "web-search",
            "Web Search",
            "Search the web and summarize the top results",
            "research",
            "🔍",
        ),
        skill(
            "calendar",
            "Calendar",
            "Read and schedule events on your calendar",
            "productivity",
            "📅",
        ),
        skill(
            "email-drafts",
            "Email Drafts",
            "Draft replies to incoming email",
            "productivity",
            "✉️",
        ),
        skill(
            "code-review",
            "Code Review",
            "Review pull requests and suggest changes",
            "development",
            "🧑‍💻",
        ),
        skill(
            "calculator",
            "Calculator",
            "Evaluate arithmetic and unit conversions",
            "utility",
            "🧮",
        ),
        skill(
            "weather",
            "Weather",
            "Current conditions and forecasts for any city",
            "utility",
            "⛅",
        ),
    ]
}
