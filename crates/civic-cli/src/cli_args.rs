use std::path::PathBuf;
use std::time::Duration;

use civic_ai::OpenAiConfig;
use civic_assistant::AssistantConfig;
use civic_core::DEFAULT_PROXIMITY_THRESHOLD_METERS;
use civic_lifecycle::{LifecycleConfig, DEFAULT_VERIFY_REWARD_COINS};
use clap::Parser;

const DEFAULT_TEMPERATURE: f32 = 0.7;

fn parse_positive_u32(value: &str) -> Result<u32, String> {
    let parsed = value
        .parse::<u32>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_positive_f64(value: &str) -> Result<f64, String> {
    let parsed = value
        .parse::<f64>()
        .map_err(|error| format!("failed to parse float: {error}"))?;
    if !parsed.is_finite() || parsed <= 0.0 {
        return Err("value must be a finite number greater than 0".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Clone, Parser)]
#[command(
    name = "civic-agent",
    about = "Civic issue assistant backed by an OpenAI-compatible model",
    version
)]
pub struct Cli {
    #[arg(
        long,
        env = "CIVIC_API_BASE",
        default_value = civic_ai::DEFAULT_OPENAI_API_BASE,
        help = "Base URL for the OpenAI-compatible chat completions API"
    )]
    pub api_base: String,

    #[arg(
        long,
        env = "CIVIC_API_KEY",
        hide_env_values = true,
        help = "API key for the completion delegate; without one the assistant answers locally"
    )]
    pub api_key: Option<String>,

    #[arg(
        long,
        env = "CIVIC_MODEL",
        default_value = "gpt-4o-mini",
        help = "Model identifier sent with each completion request"
    )]
    pub model: String,

    #[arg(
        long = "max-output-tokens",
        env = "CIVIC_MAX_OUTPUT_TOKENS",
        default_value = "500",
        value_parser = parse_positive_u32,
        help = "Maximum tokens the delegate may generate per reply"
    )]
    pub max_output_tokens: u32,

    #[arg(
        long = "request-timeout-ms",
        env = "CIVIC_REQUEST_TIMEOUT_MS",
        default_value = "30000",
        value_parser = parse_positive_u64,
        help = "Timeout for one delegate call in milliseconds, retries included"
    )]
    pub request_timeout_ms: u64,

    #[arg(
        long = "max-retries",
        env = "CIVIC_MAX_RETRIES",
        default_value_t = 2,
        help = "Retries for retryable delegate failures (0 disables retrying)"
    )]
    pub max_retries: usize,

    #[arg(
        long = "proximity-threshold-meters",
        env = "CIVIC_PROXIMITY_THRESHOLD_METERS",
        default_value_t = DEFAULT_PROXIMITY_THRESHOLD_METERS,
        value_parser = parse_positive_f64,
        help = "Maximum distance from the report origin for on-site resolve and verify"
    )]
    pub proximity_threshold_meters: f64,

    #[arg(
        long = "verify-reward-coins",
        env = "CIVIC_VERIFY_REWARD_COINS",
        default_value_t = DEFAULT_VERIFY_REWARD_COINS,
        help = "Civic coins granted to the owner on first successful verification"
    )]
    pub verify_reward_coins: u64,

    #[arg(
        long,
        env = "CIVIC_FIXTURE",
        help = "JSON file with users and reports used to seed the in-memory store"
    )]
    pub fixture: Option<PathBuf>,

    #[arg(
        long,
        env = "CIVIC_USER_ID",
        help = "Citizen id used for ticket ownership checks"
    )]
    pub user_id: Option<u64>,

    #[arg(
        long,
        short = 'm',
        help = "Answer a single message and exit instead of reading stdin"
    )]
    pub message: Option<String>,
}

impl Cli {
    pub fn lifecycle_config(&self) -> LifecycleConfig {
        LifecycleConfig {
            proximity_threshold_meters: self.proximity_threshold_meters,
            verify_reward_coins: self.verify_reward_coins,
        }
    }

    pub fn assistant_config(&self) -> AssistantConfig {
        AssistantConfig {
            model: self.model.clone(),
            max_output_tokens: self.max_output_tokens,
            temperature: DEFAULT_TEMPERATURE,
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }

    /// `None` when no usable API key was supplied.
    pub fn openai_config(&self) -> Option<OpenAiConfig> {
        let api_key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())?;
        Some(OpenAiConfig {
            api_base: self.api_base.clone(),
            max_retries: self.max_retries,
            request_timeout_ms: self.request_timeout_ms,
            retry_deadline_ms: self.request_timeout_ms,
            ..OpenAiConfig::new(api_key)
        })
    }
}
