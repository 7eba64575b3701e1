//! # Refiner (accounts + prompt refinement API)
//!
//! `refiner` is a small HTTP service with three operations: account
//! registration, login, and refinement of LLM prompts through an
//! OpenAI-compatible chat-completions API.
//!
//! ## Accounts
//!
//! An account is keyed by its (normalized) email. Registration checks the
//! store for an existing account first, but the store's unique constraint is
//! the final arbiter: a registration that loses a race surfaces as a generic
//! failure, never as a second account.
//!
//! Secrets are hashed with **Argon2id** before they reach the store, and login
//! verifies with the same primitive. Plaintext never hits the database.
//!
//! ## Outcomes vs. errors
//!
//! Duplicate emails, unknown users and wrong passwords are normal outcomes
//! (`success: false` with a message, HTTP 200). Only failures escaping an
//! operation become HTTP errors with a typed `{"error": ...}` body.
//!
//! ## Prompt refinement
//!
//! Refinement is a stateless pass-through to the configured LLM endpoint; an
//! empty completion yields an empty string.

pub mod accounts;
pub mod api;
pub mod cli;
pub mod refine;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
