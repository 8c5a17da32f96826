//! Client Configuration

use zero_core::error::{ClientError, Result};

/// Catalog host used when `SKILLS_API_URL` is not set
pub const DEFAULT_SKILLS_API_URL: &str = "https://api.zero-agent.app";

/// Endpoints and keys for the hosted services
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Project URL, e.g. `https://xyzcompany.supabase.co`
    pub supabase_url: String,

    /// Public anon key sent as `apikey`
    pub supabase_anon_key: String,

    /// Base URL of the skill catalog API
    pub skills_api_url: String,
}

impl ClientConfig {
    pub fn new(
        supabase_url: impl Into<String>,
        supabase_anon_key: impl Into<String>,
        skills_api_url: Option<String>,
    ) -> Result<Self> {
        let supabase_url = trim_base(supabase_url.into());
        let supabase_anon_key = supabase_anon_key.into();

        if supabase_url.is_empty() {
            return Err(ClientError::Config("SUPABASE_URL not set".into()));
        }
        if supabase_anon_key.is_empty() {
            return Err(ClientError::Config("SUPABASE_ANON_KEY not set".into()));
        }

        let skills_api_url = skills_api_url
            .map(trim_base)
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_SKILLS_API_URL.into());

        Ok(Self {
            supabase_url,
            supabase_anon_key,
            skills_api_url,
        })
    }

    /// Read `SUPABASE_URL`, `SUPABASE_ANON_KEY` and `SKILLS_API_URL` at runtime
    pub fn from_env() -> Result<Self> {
        Self::new(
            std::env::var("SUPABASE_URL").unwrap_or_default(),
            std::env::var("SUPABASE_ANON_KEY").unwrap_or_default(),
            std::env::var("SKILLS_API_URL").ok(),
        )
    }

    /// Same variables, captured at compile time. Used by the WASM build,
    /// which has no process environment.
    pub fn from_build_env() -> Result<Self> {
        Self::new(
            option_env!("SUPABASE_URL").unwrap_or_default(),
            option_env!("SUPABASE_ANON_KEY").unwrap_or_default(),
            option_env!("SKILLS_API_URL").map(String::from),
        )
    }
}

fn trim_base(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}
