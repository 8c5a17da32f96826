//! Domain Records
//!
//! Rows of the `agents` and `agent_skills` tables, catalog skills and the
//! identity records handed out by the auth service. Field names match the
//! column names on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity record owned by the auth service
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Email/password pair submitted from the login screen
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Signed-in session returned by the auth service
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: User,
}

/// Result of a sign-up call.
///
/// `session` is absent when the project requires email confirmation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignUpResponse {
    pub user: Option<User>,
    pub session: Option<AuthSession>,
}

/// A row of the `agents` table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Internal row id
    pub id: String,

    /// Owning user
    pub user_id: String,

    /// Generated human-readable identifier (`AGENT_<millis>_<suffix>`)
    pub agent_id: String,

    /// Display name
    pub name: String,

    pub created_at: DateTime<Utc>,
}

/// Insert payload for `agents`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAgent {
    pub user_id: String,
    pub agent_id: String,
    pub name: String,
}

/// A skill offered by the remote catalog
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub icon: String,
}

/// Body of `GET /api/skills`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCatalogResponse {
    #[serde(default)]
    pub skills: Vec<Skill>,
}

/// A row of the `agent_skills` table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledSkill {
    pub id: String,
    pub skill_id: String,

    /// Copied from the catalog at install time
    pub skill_name: String,

    pub installed_at: DateTime<Utc>,

    /// Internal id of the owning [`Agent`]
    pub agent_id: String,
}

/// Insert payload for `agent_skills`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInstalledSkill {
    pub agent_id: String,
    pub skill_id: String,
    pub skill_name: String,
}

impl NewInstalledSkill {
    /// Join row linking `skill` to `agent`
    pub fn new(agent: &Agent, skill: &Skill) -> Self {
        Self {
            agent_id: agent.id.clone(),
            skill_id: skill.id.clone(),
            skill_name: skill.name.clone(),
        }
    }
}
