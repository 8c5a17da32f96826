//! # zero-client
//!
//! HTTP implementations of the zero-core service traits.
//!
//! - [`SupabaseClient`]: sign-up/sign-in/sign-out/current user against GoTrue,
//!   and `agents`/`agent_skills` rows against PostgREST
//! - [`HttpSkillCatalog`]: the remote skill catalog
//!
//! Both compile for native targets and for `wasm32` (browser `fetch`).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use zero_client::{ClientConfig, HttpSkillCatalog, SupabaseClient};
//!
//! let config = ClientConfig::from_env()?;
//! let client = SupabaseClient::from_config(&config);
//! let catalog = HttpSkillCatalog::from_config(&config);
//!
//! let (resolution, skills) = zero_core::dashboard::mount(&client, &client, &catalog).await;
//! ```

pub mod catalog;
pub mod config;
pub mod supabase;

pub use catalog::HttpSkillCatalog;
pub use config::ClientConfig;
pub use supabase::SupabaseClient;
