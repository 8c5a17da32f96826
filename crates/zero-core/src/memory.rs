//! In-Memory Backend
//!
//! Implements the identity, store and catalog traits against process memory.
//! Used by the test suites and for running the screens without a hosted
//! project. Mirrors the constraints of the hosted schema that the client
//! depends on: one agent per user and one row per (agent, skill) pair, both
//! reported with the duplicate-key code.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::error::{ClientError, DUPLICATE_KEY_CODE, Result};
use crate::model::{
    Agent, AuthSession, Credentials, InstalledSkill, NewAgent, NewInstalledSkill, Skill,
    SignUpResponse, User,
};
use crate::service::{AgentStore, Delay, IdentityProvider, SkillCatalog};

/// Minimum password length accepted by the hosted auth service
const PROVIDER_MIN_PASSWORD: usize = 6;

/// Operations that can be forced to fail
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Fault {
    SignUp,
    SignIn,
    SignOut,
    AgentLookup,
    InstalledSkills,
    Install,
    Uninstall,
    Catalog,
}

#[derive(Default)]
struct MemoryState {
    accounts: HashMap<String, (User, String)>,
    current: Option<User>,
    agents: Vec<Agent>,
    installed: Vec<InstalledSkill>,
    catalog: Vec<Skill>,
    agent_insert_attempts: Vec<NewAgent>,
    agent_insert_failures: u32,
    faults: HashMap<Fault, bool>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl MemoryState {
    fn check(&self, fault: Fault) -> Result<()> {
        if self.faults.get(&fault).copied().unwrap_or(false) {
            return Err(ClientError::Network(format!("injected failure: {fault:?}")));
        }
        Ok(())
    }

    /// Strictly increasing timestamps so newest-first ordering is stable
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_timestamp {
            Some(last) if now <= last => last + TimeDelta::milliseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(ts);
        ts
    }
}

/// In-memory identity provider, data store and skill catalog
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend whose catalog serves `skills`
    pub fn with_catalog(skills: Vec<Skill>) -> Self {
        let backend = Self::new();
        backend.lock().catalog = skills;
        backend
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the next `count` agent inserts fail with a network error
    pub fn fail_agent_inserts(&self, count: u32) {
        self.lock().agent_insert_failures = count;
    }

    /// Turn a failure on or off for an operation
    pub fn set_fault(&self, fault: Fault, failing: bool) {
        self.lock().faults.insert(fault, failing);
    }

    /// Register an account without signing in
    pub fn add_account(&self, email: &str, password: &str) -> User {
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: Some(email.to_string()),
        };
        self.lock()
            .accounts
            .insert(email.to_string(), (user.clone(), password.to_string()));
        user
    }

    /// Every payload passed to `insert_agent`, in call order
    pub fn agent_insert_attempts(&self) -> Vec<NewAgent> {
        self.lock().agent_insert_attempts.clone()
    }

    pub fn agents(&self) -> Vec<Agent> {
        self.lock().agents.clone()
    }

    /// All `agent_skills` rows, in insertion order
    pub fn installed_rows(&self) -> Vec<InstalledSkill> {
        self.lock().installed.clone()
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl IdentityProvider for MemoryBackend {
    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpResponse> {
        let mut state = self.lock();
        state.check(Fault::SignUp)?;

        if credentials.password.chars().count() < PROVIDER_MIN_PASSWORD {
            return Err(ClientError::auth(
                "Password should be at least 6 characters.",
            ));
        }
        if state.accounts.contains_key(&credentials.email) {
            return Err(ClientError::auth("User already registered"));
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            email: Some(credentials.email.clone()),
        };
        state.accounts.insert(
            credentials.email.clone(),
            (user.clone(), credentials.password.clone()),
        );
        state.current = Some(user.clone());

        Ok(SignUpResponse {
            user: Some(user.clone()),
            session: Some(AuthSession {
                access_token: Uuid::new_v4().simple().to_string(),
                refresh_token: None,
                user,
            }),
        })
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<AuthSession> {
        let mut state = self.lock();
        state.check(Fault::SignIn)?;

        let user = match state.accounts.get(&credentials.email) {
            Some((user, password)) if *password == credentials.password => user.clone(),
            _ => return Err(ClientError::auth("Invalid login credentials")),
        };
        state.current = Some(user.clone());

        Ok(AuthSession {
            access_token: Uuid::new_v4().simple().to_string(),
            refresh_token: None,
            user,
        })
    }

    async fn sign_out(&self) -> Result<()> {
        let mut state = self.lock();
        state.check(Fault::SignOut)?;
        state.current = None;
        Ok(())
    }

    async fn get_user(&self) -> Result<Option<User>> {
        Ok(self.lock().current.clone())
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl AgentStore for MemoryBackend {
    async fn insert_agent(&self, agent: &NewAgent) -> Result<()> {
        let mut state = self.lock();
        state.agent_insert_attempts.push(agent.clone());

        if state.agent_insert_failures > 0 {
            state.agent_insert_failures -= 1;
            return Err(ClientError::Network("connection reset".into()));
        }
        if state.agents.iter().any(|a| a.user_id == agent.user_id) {
            return Err(ClientError::database(
                DUPLICATE_KEY_CODE,
                "duplicate key value violates unique constraint \"agents_user_id_key\"",
            ));
        }

        let created_at = state.tick();
        state.agents.push(Agent {
            id: Uuid::new_v4().to_string(),
            user_id: agent.user_id.clone(),
            agent_id: agent.agent_id.clone(),
            name: agent.name.clone(),
            created_at,
        });
        Ok(())
    }

    async fn agent_for_user(&self, user_id: &str) -> Result<Option<Agent>> {
        let state = self.lock();
        state.check(Fault::AgentLookup)?;
        Ok(state.agents.iter().find(|a| a.user_id == user_id).cloned())
    }

    async fn installed_skills(&self, agent_id: &str) -> Result<Vec<InstalledSkill>> {
        let state = self.lock();
        state.check(Fault::InstalledSkills)?;

        let mut rows: Vec<_> = state
            .installed
            .iter()
            .filter(|s| s.agent_id == agent_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.installed_at.cmp(&a.installed_at));
        Ok(rows)
    }

    async fn install_skill(&self, skill: &NewInstalledSkill) -> Result<()> {
        let mut state = self.lock();
        state.check(Fault::Install)?;

        if state
            .installed
            .iter()
            .any(|s| s.agent_id == skill.agent_id && s.skill_id == skill.skill_id)
        {
            return Err(ClientError::database(
                DUPLICATE_KEY_CODE,
                "duplicate key value violates unique constraint \"agent_skills_agent_id_skill_id_key\"",
            ));
        }

        let installed_at = state.tick();
        state.installed.push(InstalledSkill {
            id: Uuid::new_v4().to_string(),
            skill_id: skill.skill_id.clone(),
            skill_name: skill.skill_name.clone(),
            installed_at,
            agent_id: skill.agent_id.clone(),
        });
        Ok(())
    }

    async fn uninstall_skill(&self, installed_id: &str) -> Result<()> {
        let mut state = self.lock();
        state.check(Fault::Uninstall)?;
        state.installed.retain(|s| s.id != installed_id);
        Ok(())
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl SkillCatalog for MemoryBackend {
    async fn list_skills(&self) -> Result<Vec<Skill>> {
        let state = self.lock();
        state.check(Fault::Catalog)?;
        Ok(state.catalog.clone())
    }
}

/// [`Delay`] that returns immediately and remembers every requested wait
#[derive(Default)]
pub struct RecordingDelay {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.waits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Delay for RecordingDelay {
    async fn sleep(&self, duration: Duration) {
        self.waits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
    }
}
