//! Configuration for the sous gateway

use std::time::Duration;

use crate::{Error, Result};

/// Default recipe data provider base URL
const DEFAULT_RECIPE_API_URL: &str = "https://api.spoonacular.com";

/// Default port for the hosted session endpoint
const DEFAULT_PORT: u16 = 18420;

/// Every outbound tool call (HTTP and RPC) is time-boxed to this many seconds
const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 10;

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Agent display name announced to connecting clients
    pub agent_name: String,

    /// Port the session endpoint listens on
    pub port: u16,

    /// Recipe data provider settings
    pub recipes: RecipeApiConfig,

    /// Time box for Client Bridge RPC responses
    pub rpc_timeout: Duration,
}

/// Recipe data provider settings
#[derive(Debug, Clone)]
pub struct RecipeApiConfig {
    /// Base URL of the provider (scheme + host)
    pub base_url: String,

    /// API key, sent as a query parameter on every request
    pub api_key: String,

    /// Time box for each outbound lookup
    pub timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Reads `SOUS_AGENT_NAME` (default: "Basil"), `SOUS_PORT`,
    /// `SOUS_RECIPE_API_URL`, `SOUS_RECIPE_API_KEY` (required), and
    /// `SOUS_TOOL_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns an error if `SOUS_RECIPE_API_KEY` is unset or empty.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("SOUS_RECIPE_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Config("SOUS_RECIPE_API_KEY is not set".to_string()))?;

        let port = std::env::var("SOUS_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let timeout_secs = std::env::var("SOUS_TOOL_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(DEFAULT_TOOL_TIMEOUT_SECS);

        let base_url = std::env::var("SOUS_RECIPE_API_URL")
            .ok()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_RECIPE_API_URL.to_string());

        Ok(Self {
            agent_name: std::env::var("SOUS_AGENT_NAME")
                .ok()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "Basil".to_string()),
            port,
            recipes: RecipeApiConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                api_key,
                timeout: Duration::from_secs(timeout_secs),
            },
            rpc_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl RecipeApiConfig {
    /// Build a config pointing at an arbitrary endpoint, used by tests.
    #[must_use]
    pub fn for_endpoint(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout: Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECS),
        }
    }
}
