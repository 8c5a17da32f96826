//! # zero-core
//!
//! Domain model and screen logic for the zero-agent web client.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   sign in/up    ┌────────────────────┐
//! │ Login screen │────────────────▶│  IdentityProvider  │
//! │   (login)    │──┐              └────────────────────┘
//! └──────┬───────┘  │ provision    ┌────────────────────┐
//!        │          └─────────────▶│     AgentStore     │
//!        ▼                         │ agents/agent_skills│
//! ┌──────────────┐────────────────▶└────────────────────┘
//! │  Dashboard   │                 ┌────────────────────┐
//! │ (dashboard)  │────────────────▶│    SkillCatalog    │
//! └──────────────┘                 └────────────────────┘
//! ```
//!
//! The screens only talk to the service traits, so the same logic runs
//! against the hosted project (`zero-client`) in the browser and against
//! [`MemoryBackend`] in tests.

pub mod dashboard;
pub mod error;
pub mod login;
pub mod memory;
pub mod model;
pub mod provision;
pub mod screen;
pub mod service;

pub use error::{ClientError, Result};
pub use memory::MemoryBackend;
pub use model::{
    Agent, AuthSession, Credentials, InstalledSkill, NewAgent, NewInstalledSkill, Skill,
    SignUpResponse, User,
};
pub use provision::{ProvisionResult, provision};
pub use screen::{PendingRedirect, Redirect, ScreenState};
pub use service::{AgentStore, Delay, IdentityProvider, SkillCatalog};
