use crate::refine::openai::{
    DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECONDS,
};
use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;
use url::Url;

pub const ARG_LLM_URL: &str = "llm-url";
pub const ARG_LLM_API_KEY: &str = "llm-api-key";
pub const ARG_LLM_MODEL: &str = "llm-model";
pub const ARG_LLM_TIMEOUT: &str = "llm-timeout";
pub const ARG_LLM_TEMPERATURE: &str = "llm-temperature";
pub const ARG_LLM_MAX_TOKENS: &str = "llm-max-tokens";

#[derive(Debug)]
pub struct Options {
    pub url: Url,
    pub api_key: SecretString,
    pub model: String,
    pub timeout_seconds: u64,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Options {
    /// Parse LLM provider arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the API key is missing or blank.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let url = matches
            .get_one::<Url>(ARG_LLM_URL)
            .cloned()
            .context("missing required argument: --llm-url")?;
        let api_key = matches
            .get_one::<String>(ARG_LLM_API_KEY)
            .filter(|v| !v.trim().is_empty())
            .map(|v| SecretString::from(v.clone()))
            .context("missing required argument: --llm-api-key")?;
        let model = matches
            .get_one::<String>(ARG_LLM_MODEL)
            .cloned()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self {
            url,
            api_key,
            model,
            timeout_seconds: matches
                .get_one::<u64>(ARG_LLM_TIMEOUT)
                .copied()
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
            temperature: matches
                .get_one::<f32>(ARG_LLM_TEMPERATURE)
                .copied()
                .unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: matches
                .get_one::<u32>(ARG_LLM_MAX_TOKENS)
                .copied()
                .unwrap_or(DEFAULT_MAX_TOKENS),
        })
    }
}

fn validator_temperature(value: &str) -> std::result::Result<f32, String> {
    let parsed = value
        .parse::<f32>()
        .map_err(|e| format!("invalid temperature: {e}"))?;
    if (0.0..=2.0).contains(&parsed) {
        Ok(parsed)
    } else {
        Err("temperature must be between 0 and 2".to_string())
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_LLM_URL)
                .long(ARG_LLM_URL)
                .help("Base URL of the OpenAI compatible API")
                .env("REFINER_LLM_URL")
                .default_value("https://api.openai.com/v1")
                .value_parser(clap::value_parser!(Url)),
        )
        .arg(
            Arg::new(ARG_LLM_API_KEY)
                .long(ARG_LLM_API_KEY)
                .help("API key sent as a bearer token to the LLM provider")
                .env("REFINER_LLM_API_KEY")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_LLM_MODEL)
                .long(ARG_LLM_MODEL)
                .help("Model used to refine prompts")
                .env("REFINER_LLM_MODEL")
                .default_value(DEFAULT_MODEL),
        )
        .arg(
            Arg::new(ARG_LLM_TIMEOUT)
                .long(ARG_LLM_TIMEOUT)
                .help("Seconds to wait for the LLM provider")
                .env("REFINER_LLM_TIMEOUT")
                .default_value("30")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_LLM_TEMPERATURE)
                .long(ARG_LLM_TEMPERATURE)
                .help("Sampling temperature")
                .env("REFINER_LLM_TEMPERATURE")
                .default_value("0.5")
                .value_parser(validator_temperature),
        )
        .arg(
            Arg::new(ARG_LLM_MAX_TOKENS)
                .long(ARG_LLM_MAX_TOKENS)
                .help("Maximum number of tokens in the refined prompt")
                .env("REFINER_LLM_MAX_TOKENS")
                .default_value("100")
                .value_parser(clap::value_parser!(u32).range(1..)),
        )
}
