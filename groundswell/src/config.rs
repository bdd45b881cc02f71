use serde::Deserialize;
use std::env;
use std::str::FromStr;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub search: SearchConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Static access tokens checked against the `apiKey` field on intake.
    pub access_tokens: Vec<String>,
}

/// Web-search provider settings.
///
/// The result cap and recency window differ across deployments, so both are
/// configuration rather than fixed behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub max_results: u32,
    pub time_range: String,
    pub timeout_secs: u64,
}

/// Which synthesis strategy the server runs with.
///
/// `ToolCalling` drives an assistant run that may pause to request searches;
/// `Grounding` issues one blocking call to a model that searches internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisStrategy {
    ToolCalling,
    Grounding,
}

impl FromStr for SynthesisStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tool_calling" | "tool-calling" | "assistant" => Ok(Self::ToolCalling),
            "grounding" | "grounded" => Ok(Self::Grounding),
            other => Err(format!("unknown synthesis strategy: {other}")),
        }
    }
}

/// LLM provider configuration shared by both strategies.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub strategy: SynthesisStrategy,
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        let strategy = parse_env_or("SYNTHESIS_STRATEGY", SynthesisStrategy::ToolCalling);

        Self {
            server: ServerConfig {
                host: env::var("GROUNDSWELL_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("GROUNDSWELL_PORT", 3000),
                access_tokens: env::var("GROUNDSWELL_ACCESS_TOKENS")
                    .map(|keys| keys.split(',').map(|s| s.trim().to_string()).collect())
                    .unwrap_or_default(),
            },
            search: SearchConfig {
                api_key: env::var("SEARCH_API_KEY").ok(),
                base_url: env::var("SEARCH_BASE_URL").ok(),
                max_results: parse_env_or("SEARCH_MAX_RESULTS", 5),
                time_range: env::var("SEARCH_TIME_RANGE").unwrap_or_else(|_| "day".to_string()),
                timeout_secs: parse_env_or("SEARCH_TIMEOUT", 30),
            },
            llm: LlmConfig {
                strategy,
                model: env::var("LLM_MODEL").unwrap_or_else(|_| default_model(strategy).to_string()),
                api_key: env::var("LLM_API_KEY").ok(),
                base_url: env::var("LLM_BASE_URL").ok(),
                timeout_secs: parse_env_or("LLM_TIMEOUT", 120),
            },
        }
    }
}

fn default_model(strategy: SynthesisStrategy) -> &'static str {
    match strategy {
        SynthesisStrategy::ToolCalling => "gpt-4o",
        SynthesisStrategy::Grounding => "gemini-2.0-flash",
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}
