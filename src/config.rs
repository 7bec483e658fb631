use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::error::ApiError;

/// Client-side base path, proxied to the agent service by the web app
const DEFAULT_CLIENT_BASE_URL: &str = "/api/fastapi";
/// Agent service base URL for server-side calls
const DEFAULT_SERVER_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_AGENT_ID: &str = "self_corrective_rag";

const CLIENT_BASE_URL_KEYS: &[&str] = &["NEXT_PUBLIC_FASTAPI_BASE_URL"];
const SERVER_BASE_URL_KEYS: &[&str] = &["FASTAPI_BASE_URL"];
const AGENT_ID_KEYS: &[&str] = &["NEXT_PUBLIC_FASTAPI_AGENT_ID", "FASTAPI_AGENT_ID"];
const TEST_ENVIRONMENT_KEYS: &[&str] = &["PLAYWRIGHT_TEST_BASE_URL", "PLAYWRIGHT", "CI_PLAYWRIGHT"];

/// Agent Chat Bridge - agent history conversion and endpoint tooling
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,

    /// Agent service base URL, overrides FASTAPI_BASE_URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// HTTP connect timeout in seconds
    #[arg(long, env = "HTTP_CONNECT_TIMEOUT", default_value = "30", global = true)]
    pub connect_timeout: u64,

    /// HTTP request timeout in seconds
    #[arg(long, env = "HTTP_REQUEST_TIMEOUT", default_value = "60", global = true)]
    pub http_timeout: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert agent history into chat UI messages (JSON on stdout)
    History(HistoryArgs),

    /// List chat models and their backend mapping
    Models,

    /// Resolve a chat model id to its backend model id
    Resolve {
        /// Chat model id as sent by the UI
        model: String,
    },

    /// Print the resolved endpoints and agent id
    Endpoints,
}

#[derive(Args, Debug, Default)]
pub struct HistoryArgs {
    /// Read history JSON from this file ("-" for stdin) instead of the history endpoint
    #[arg(short, long)]
    pub input: Option<String>,

    /// Query parameter for the history request, as key=value (repeatable)
    #[arg(short = 'p', long = "param", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,

    /// Pretty-print the output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    // Agent service
    pub client_base_url: String,
    pub server_base_url: String,
    pub agent_id: String,

    // Provider selection
    pub is_test_environment: bool,

    // HTTP client
    pub http_connect_timeout: u64,
    pub http_request_timeout: u64,

    // Logging
    pub log_level: String,
}

impl Config {
    /// Load configuration with priority: CLI > ENV (.env included) > defaults.
    ///
    /// Call `dotenvy::dotenv()` before parsing `args` so clap sees `.env` values.
    pub fn load(args: &CliArgs) -> Result<Self> {
        let mut config = Self::from_lookup(|key| std::env::var(key).ok());

        if let Some(base_url) = args.base_url.as_deref().filter(|s| !s.is_empty()) {
            config.server_base_url = base_url.to_string();
        }
        config.http_connect_timeout = args.connect_timeout;
        config.http_request_timeout = args.http_timeout;
        config.log_level = args.log_level.clone();

        Ok(config)
    }

    /// Resolve configuration from an arbitrary key lookup.
    ///
    /// Each setting walks its key chain in order; a key that is unset or empty
    /// falls through to the next, and the hardcoded default comes last.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Config {
            client_base_url: first_non_empty(&lookup, CLIENT_BASE_URL_KEYS)
                .unwrap_or_else(|| DEFAULT_CLIENT_BASE_URL.to_string()),

            server_base_url: first_non_empty(&lookup, SERVER_BASE_URL_KEYS)
                .unwrap_or_else(|| DEFAULT_SERVER_BASE_URL.to_string()),

            agent_id: first_non_empty(&lookup, AGENT_ID_KEYS)
                .unwrap_or_else(|| DEFAULT_AGENT_ID.to_string()),

            is_test_environment: first_non_empty(&lookup, TEST_ENVIRONMENT_KEYS).is_some(),

            http_connect_timeout: lookup("HTTP_CONNECT_TIMEOUT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),

            http_request_timeout: lookup("HTTP_REQUEST_TIMEOUT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),

            log_level: first_non_empty(&lookup, &["LOG_LEVEL"])
                .unwrap_or_else(|| "info".to_string()),
        }
    }

    /// Streaming endpoint, as reached from the browser
    pub fn stream_endpoint(&self) -> String {
        format!("{}/stream", self.client_base_url)
    }

    /// History endpoint, as reached from the server
    pub fn history_endpoint(&self) -> String {
        format!("{}/history", self.server_base_url)
    }

    /// Validate configuration
    pub fn validate(&self) -> crate::error::Result<()> {
        // Server-side calls need an absolute URL; the client base may be a relative path
        if !(self.server_base_url.starts_with("http://")
            || self.server_base_url.starts_with("https://"))
        {
            return Err(ApiError::ConfigError(format!(
                "FASTAPI_BASE_URL must be an absolute http(s) URL: {}",
                self.server_base_url
            )));
        }

        if self.http_request_timeout == 0 {
            return Err(ApiError::ConfigError(
                "HTTP_REQUEST_TIMEOUT must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

fn first_non_empty<F>(lookup: &F, keys: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    keys.iter()
        .filter_map(|key| lookup(key))
        .find(|value| !value.is_empty())
}

/// Expand tilde (~) in file paths to user's home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Parse a `key=value` pair
fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}
