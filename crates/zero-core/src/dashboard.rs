//! Dashboard Screen Logic
//!
//! Mount resolves the signed-in user's agent and loads the skill catalog
//! side by side. Install and uninstall write through the store and then
//! re-read the installed list; nothing is updated optimistically.

use crate::error::ClientError;
use crate::model::{Agent, InstalledSkill, NewInstalledSkill, Skill, User};
use crate::screen::{Redirect, route};
use crate::service::{AgentStore, IdentityProvider, SkillCatalog};

pub const MSG_NO_AGENT: &str = "No agent found";
pub const MSG_NO_SKILLS: &str = "No skills installed yet";
pub const MSG_INSTALL_FAILED: &str = "Failed to install skill. Please try again.";
pub const MSG_UNINSTALL_FAILED: &str = "Failed to uninstall skill. Please try again.";

/// Banner shown after an action
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Self::Info(text) | Self::Error(text) => text,
        }
    }

    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Outcome of the auth/agent half of mount
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AgentResolution {
    /// Nobody is signed in
    SignedOut,
    Resolved {
        user: User,
        agent: Option<Agent>,
        installed: Vec<InstalledSkill>,
    },
}

/// What the installed-skills section renders
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InstalledSection<'a> {
    NoAgent,
    Empty,
    /// One card per row, newest first
    Cards(&'a [InstalledSkill]),
}

/// A catalog entry as shown in the catalog modal
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub skill: Skill,
    pub installed: bool,
}

/// Result of an install or uninstall action
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionOutcome {
    pub notice: Option<Notice>,

    /// Re-fetched installed list, when the action wrote and the re-read worked
    pub installed: Option<Vec<InstalledSkill>>,
}

impl ActionOutcome {
    fn notice(notice: Notice) -> Self {
        Self {
            notice: Some(notice),
            installed: None,
        }
    }

    /// Nothing happened (e.g. the user declined the confirmation)
    pub const fn cancelled() -> Self {
        Self {
            notice: None,
            installed: None,
        }
    }
}

/// Local state of the dashboard screen
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DashboardState {
    pub user: Option<User>,
    pub agent: Option<Agent>,
    pub installed: Vec<InstalledSkill>,
    pub catalog: Vec<Skill>,
    pub catalog_open: bool,
    pub notice: Option<Notice>,
    pub loading: bool,
}

impl DashboardState {
    /// State before mount has finished
    pub fn loading() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    /// Store the agent half of mount. Returns the redirect to the login
    /// screen when nobody is signed in.
    pub fn apply_resolution(&mut self, resolution: AgentResolution) -> Option<Redirect> {
        self.loading = false;
        match resolution {
            AgentResolution::SignedOut => Some(Redirect::now(route::LOGIN)),
            AgentResolution::Resolved {
                user,
                agent,
                installed,
            } => {
                self.user = Some(user);
                self.agent = agent;
                self.installed = installed;
                None
            }
        }
    }

    pub fn set_catalog(&mut self, catalog: Vec<Skill>) {
        self.catalog = catalog;
    }

    pub fn apply_outcome(&mut self, outcome: ActionOutcome) {
        if let Some(installed) = outcome.installed {
            self.installed = installed;
        }
        if outcome.notice.is_some() {
            self.notice = outcome.notice;
        }
    }

    pub fn toggle_catalog(&mut self) {
        self.catalog_open = !self.catalog_open;
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn is_installed(&self, skill_id: &str) -> bool {
        self.installed.iter().any(|s| s.skill_id == skill_id)
    }

    pub fn catalog_entries(&self) -> Vec<CatalogEntry> {
        self.catalog
            .iter()
            .map(|skill| CatalogEntry {
                skill: skill.clone(),
                installed: self.is_installed(&skill.id),
            })
            .collect()
    }

    pub fn installed_section(&self) -> InstalledSection<'_> {
        if self.agent.is_none() {
            InstalledSection::NoAgent
        } else if self.installed.is_empty() {
            InstalledSection::Empty
        } else {
            InstalledSection::Cards(&self.installed)
        }
    }

    pub fn user_email(&self) -> &str {
        self.user
            .as_ref()
            .and_then(|u| u.email.as_deref())
            .unwrap_or_default()
    }
}

/// Resolve the signed-in user, their agent and its installed skills.
///
/// Lookup failures are logged and leave the corresponding part empty.
pub async fn resolve_agent<I, S>(identity: &I, store: &S) -> AgentResolution
where
    I: IdentityProvider + ?Sized,
    S: AgentStore + ?Sized,
{
    let user = match identity.get_user().await {
        Ok(Some(user)) => user,
        Ok(None) => return AgentResolution::SignedOut,
        Err(e) => {
            tracing::warn!(error = %e, "failed to resolve current user");
            return AgentResolution::SignedOut;
        }
    };

    let agent = match store.agent_for_user(&user.id).await {
        Ok(agent) => agent,
        Err(e) => {
            tracing::error!(user_id = %user.id, error = %e, "error fetching agent");
            None
        }
    };

    let installed = match &agent {
        Some(agent) => fetch_installed(store, agent).await.unwrap_or_default(),
        None => Vec::new(),
    };

    AgentResolution::Resolved {
        user,
        agent,
        installed,
    }
}

/// Load the skill catalog; empty on failure
pub async fn load_catalog<C>(catalog: &C) -> Vec<Skill>
where
    C: SkillCatalog + ?Sized,
{
    match catalog.list_skills().await {
        Ok(skills) => skills,
        Err(e) => {
            tracing::error!(error = %e, "error fetching skill catalog");
            Vec::new()
        }
    }
}

/// Run both mount-time fetches concurrently
pub async fn mount<I, S, C>(identity: &I, store: &S, catalog: &C) -> (AgentResolution, Vec<Skill>)
where
    I: IdentityProvider + ?Sized,
    S: AgentStore + ?Sized,
    C: SkillCatalog + ?Sized,
{
    futures::join!(resolve_agent(identity, store), load_catalog(catalog))
}

async fn fetch_installed<S>(store: &S, agent: &Agent) -> Option<Vec<InstalledSkill>>
where
    S: AgentStore + ?Sized,
{
    match store.installed_skills(&agent.id).await {
        Ok(rows) => Some(rows),
        Err(e) => {
            tracing::error!(agent_id = %agent.id, error = %e, "error fetching installed skills");
            None
        }
    }
}

/// Install a catalog skill on the agent
pub async fn install<S>(store: &S, agent: Option<&Agent>, skill: &Skill) -> ActionOutcome
where
    S: AgentStore + ?Sized,
{
    let Some(agent) = agent else {
        return ActionOutcome::notice(Notice::Error(MSG_NO_AGENT.into()));
    };

    match store.install_skill(&NewInstalledSkill::new(agent, skill)).await {
        Ok(()) => ActionOutcome {
            notice: Some(Notice::Info(format!("{} installed", skill.name))),
            installed: fetch_installed(store, agent).await,
        },
        Err(e) if e.is_duplicate_key() => {
            ActionOutcome::notice(Notice::Info(format!("{} is already installed", skill.name)))
        }
        Err(e) => {
            log_action_error("install", &skill.id, &e);
            ActionOutcome::notice(Notice::Error(MSG_INSTALL_FAILED.into()))
        }
    }
}

/// Uninstall a skill after `confirm` approves it
pub async fn uninstall<S>(
    store: &S,
    agent: &Agent,
    skill: &InstalledSkill,
    confirm: impl FnOnce(&InstalledSkill) -> bool,
) -> ActionOutcome
where
    S: AgentStore + ?Sized,
{
    if !confirm(skill) {
        return ActionOutcome::cancelled();
    }

    match store.uninstall_skill(&skill.id).await {
        Ok(()) => ActionOutcome {
            notice: Some(Notice::Info(format!("{} uninstalled", skill.skill_name))),
            installed: fetch_installed(store, agent).await,
        },
        Err(e) => {
            log_action_error("uninstall", &skill.skill_id, &e);
            ActionOutcome::notice(Notice::Error(MSG_UNINSTALL_FAILED.into()))
        }
    }
}

/// Prompt text for the uninstall confirmation
pub fn confirm_uninstall_prompt(skill: &InstalledSkill) -> String {
    format!("Uninstall {}?", skill.skill_name)
}

/// End the session. Always sends the user back to the login screen.
pub async fn sign_out<I>(identity: &I) -> Redirect
where
    I: IdentityProvider + ?Sized,
{
    if let Err(e) = identity.sign_out().await {
        tracing::warn!(error = %e, "sign out failed");
    }
    Redirect::now(route::LOGIN)
}

fn log_action_error(action: &str, skill_id: &str, err: &ClientError) {
    tracing::error!(action, skill_id, error = %err, "skill action failed");
}
