use crate::{
    accounts::{Accounts, CredentialStore, Hasher, PgStore},
    api,
    refine::{OpenAiConfig, OpenAiRefiner, PromptRefiner},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::{sync::Arc, time::Duration};
use tracing::{debug, info};
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub apply_schema: bool,
    pub hash_memory_kib: u32,
    pub hash_iterations: u32,
    pub llm_url: Url,
    pub llm_api_key: SecretString,
    pub llm_model: String,
    pub llm_timeout_seconds: u64,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable, the schema cannot be
/// applied, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let hasher = Hasher::new(args.hash_memory_kib, args.hash_iterations)
        .context("Invalid password hashing parameters")?;

    let llm_config = OpenAiConfig::new(args.llm_url, args.llm_api_key)
        .with_model(args.llm_model)
        .with_timeout(Duration::from_secs(args.llm_timeout_seconds))
        .with_temperature(args.llm_temperature)
        .with_max_tokens(args.llm_max_tokens);
    debug!("LLM config: {:?}", llm_config);

    let refiner: Arc<dyn PromptRefiner> =
        Arc::new(OpenAiRefiner::new(llm_config).context("Failed to build LLM client")?);

    let store = Arc::new(
        PgStore::connect(
            &args.dsn,
            args.db_max_connections,
            Duration::from_secs(args.db_timeout_seconds),
        )
        .await
        .context("Failed to connect to database")?,
    );

    let served = async {
        if args.apply_schema {
            store
                .apply_schema()
                .await
                .context("Failed to apply database schema")?;
            info!("Database schema applied");
        }

        let credential_store: Arc<dyn CredentialStore> = store.clone();
        let accounts = Arc::new(Accounts::new(credential_store, hasher));

        api::new(args.port, accounts, refiner).await
    }
    .await;

    store.close().await;
    debug!("Credential store closed");

    served
}
