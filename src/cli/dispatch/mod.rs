//! Map parsed command-line arguments to the action to run.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{ARG_DSN, ARG_PORT, database, hashing, llm};
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .cloned()
        .filter(|v| !v.trim().is_empty())
        .context("missing required argument: --dsn")?;

    let database_opts = database::Options::parse(matches)?;
    let hashing_opts = hashing::Options::parse(matches)?;
    let llm_opts = llm::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        db_max_connections: database_opts.max_connections,
        db_timeout_seconds: database_opts.timeout_seconds,
        apply_schema: database_opts.apply_schema,
        hash_memory_kib: hashing_opts.memory_kib,
        hash_iterations: hashing_opts.iterations,
        llm_url: llm_opts.url,
        llm_api_key: llm_opts.api_key,
        llm_model: llm_opts.model,
        llm_timeout_seconds: llm_opts.timeout_seconds,
        llm_temperature: llm_opts.temperature,
        llm_max_tokens: llm_opts.max_tokens,
    }))
}
