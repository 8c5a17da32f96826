//! Agent Provisioning
//!
//! Creates the single agent row for a freshly registered user. The insert is
//! retried with linear backoff; a duplicate-key rejection means the agent
//! already exists and counts as success.
//!
//! [`provision`] never fails. The login screen navigates on regardless of the
//! outcome, so the result is advisory only.

use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use crate::model::NewAgent;
use crate::service::{AgentStore, Delay};

/// Attempts made right after sign-up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Backoff before attempt `n` is `n * BACKOFF_UNIT`
pub const BACKOFF_UNIT: Duration = Duration::from_secs(1);

const SUFFIX_LEN: usize = 8;

/// Outcome of [`provision`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProvisionResult {
    /// The user has an agent (newly inserted or already present)
    pub created: bool,

    /// Identifier of the inserted agent; `None` when it already existed or
    /// provisioning gave up
    pub agent_id: Option<String>,
}

impl ProvisionResult {
    fn inserted(agent_id: String) -> Self {
        Self {
            created: true,
            agent_id: Some(agent_id),
        }
    }

    const fn already_exists() -> Self {
        Self {
            created: true,
            agent_id: None,
        }
    }

    const fn gave_up() -> Self {
        Self {
            created: false,
            agent_id: None,
        }
    }
}

/// Generate a candidate agent identifier: `AGENT_<unix millis>_<8 base-36 chars>`
pub fn generate_agent_id() -> String {
    format!("AGENT_{}_{}", Utc::now().timestamp_millis(), random_suffix())
}

fn random_suffix() -> String {
    let mut bits = Uuid::new_v4().as_u128();
    let mut suffix = String::with_capacity(SUFFIX_LEN);
    for _ in 0..SUFFIX_LEN {
        let digit = u32::try_from(bits % 36).unwrap_or(0);
        bits /= 36;
        if let Some(c) = char::from_digit(digit, 36) {
            suffix.push(c.to_ascii_uppercase());
        }
    }
    suffix
}

/// Display name for a user's agent: the email local-part plus `'s Agent`
pub fn agent_name(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    format!("{local}'s Agent")
}

/// Insert the agent row for `user_id`, retrying up to `max_attempts` times.
pub async fn provision<S, D>(
    store: &S,
    delay: &D,
    user_id: &str,
    user_email: &str,
    max_attempts: u32,
) -> ProvisionResult
where
    S: AgentStore + ?Sized,
    D: Delay + ?Sized,
{
    let name = agent_name(user_email);
    let mut remaining = max_attempts;

    while remaining > 0 {
        let agent = NewAgent {
            user_id: user_id.to_string(),
            agent_id: generate_agent_id(),
            name: name.clone(),
        };

        match store.insert_agent(&agent).await {
            Ok(()) => {
                tracing::info!(user_id, agent_id = %agent.agent_id, "agent created");
                return ProvisionResult::inserted(agent.agent_id);
            }
            Err(e) if e.is_duplicate_key() => {
                tracing::info!(user_id, "agent already exists for user");
                return ProvisionResult::already_exists();
            }
            Err(e) => {
                remaining -= 1;
                tracing::warn!(user_id, remaining, error = %e, "agent creation attempt failed");

                if remaining > 0 {
                    let next_attempt = max_attempts - remaining + 1;
                    delay.sleep(BACKOFF_UNIT * next_attempt).await;
                }
            }
        }
    }

    tracing::error!(user_id, max_attempts, "agent creation failed after all attempts");
    ProvisionResult::gave_up()
}
