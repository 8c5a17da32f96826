//! Service Traits
//!
//! Seams between the screens and the outside world. The HTTP client in
//! `zero-client` and [`MemoryBackend`](crate::memory::MemoryBackend) both
//! implement them.
//!
//! Browser futures are not `Send`, so on `wasm32` the traits are declared
//! `?Send`; native builds keep the usual `Send + Sync` bounds so services can
//! sit behind an `Arc<dyn ...>`.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{
    Agent, AuthSession, Credentials, InstalledSkill, NewAgent, NewInstalledSkill, Skill,
    SignUpResponse, User,
};

/// `Send + Sync` on native targets, no bound on `wasm32`
#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSendSync: Send + Sync {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + Sync + ?Sized> MaybeSendSync for T {}

/// `Send + Sync` on native targets, no bound on `wasm32`
#[cfg(target_arch = "wasm32")]
pub trait MaybeSendSync {}
#[cfg(target_arch = "wasm32")]
impl<T: ?Sized> MaybeSendSync for T {}

/// Sign-up, sign-in and current-user lookup
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait IdentityProvider: MaybeSendSync {
    /// Register a new account
    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpResponse>;

    /// Sign in with email and password
    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<AuthSession>;

    /// End the current session
    async fn sign_out(&self) -> Result<()>;

    /// The signed-in user, if any
    async fn get_user(&self) -> Result<Option<User>>;
}

/// Row operations on the `agents` and `agent_skills` tables
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait AgentStore: MaybeSendSync {
    /// Insert an agent row. Fails with a duplicate-key error if the user
    /// already owns one.
    async fn insert_agent(&self, agent: &NewAgent) -> Result<()>;

    /// The single agent owned by `user_id`
    async fn agent_for_user(&self, user_id: &str) -> Result<Option<Agent>>;

    /// Skills installed on an agent, newest first
    async fn installed_skills(&self, agent_id: &str) -> Result<Vec<InstalledSkill>>;

    /// Insert a join row. Fails with a duplicate-key error if the skill is
    /// already installed on the agent.
    async fn install_skill(&self, skill: &NewInstalledSkill) -> Result<()>;

    /// Delete a join row by id
    async fn uninstall_skill(&self, installed_id: &str) -> Result<()>;
}

/// Read-only catalog of installable skills
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait SkillCatalog: MaybeSendSync {
    async fn list_skills(&self) -> Result<Vec<Skill>>;
}

/// Timer used for retry backoff
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Delay: MaybeSendSync {
    async fn sleep(&self, duration: Duration);
}

/// [`Delay`] backed by the tokio timer
#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioDelay;

#[cfg(not(target_arch = "wasm32"))]
#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_tokio_delay_waits() {
        let start = tokio::time::Instant::now();
        TokioDelay.sleep(Duration::from_secs(2)).await;
        assert!(start.elapsed() >= Duration::from_secs(2));
    }
}
