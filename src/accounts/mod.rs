//! Account provisioning and authentication.

pub mod memory;
pub mod password;
pub mod store;
pub mod token;

pub use self::memory::MemoryStore;
pub use self::password::{HashError, Hasher};
pub use self::store::{CredentialStore, PgStore, StoreError};

use std::{fmt, sync::Arc};
use thiserror::Error;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

pub const MSG_USER_CREATED: &str = "User created successfully.";
pub const MSG_EMAIL_IN_USE: &str = "Email already in use.";
pub const MSG_LOGIN_SUCCESSFUL: &str = "Login successful.";
pub const MSG_UNKNOWN_USER: &str = "User does not exist.";
pub const MSG_WRONG_PASSWORD: &str = "Incorrect password.";

/// A stored account.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password_hash", &"***")
            .finish()
    }
}

/// Account fields supplied at registration; the store assigns the id.
#[derive(Clone)]
pub struct NewAccount {
    pub email: String,
    pub username: String,
    pub password_hash: String,
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password_hash", &"***")
            .finish()
    }
}

/// Failures that escape an account operation.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("credential store error: {0}")]
    Store(#[from] StoreError),
    #[error(transparent)]
    Hash(#[from] HashError),
    #[error("failed to generate session token: {0}")]
    Token(#[from] rand::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    Created { user_id: Uuid },
    EmailInUse,
    /// The insert was rejected by the store; carries the store's description.
    Failed(String),
}

impl RegisterOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Created { .. })
    }

    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Created { .. } => MSG_USER_CREATED.to_string(),
            Self::EmailInUse => MSG_EMAIL_IN_USE.to_string(),
            Self::Failed(reason) => format!("Failed to create user: {reason}"),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated { token: String },
    UnknownUser,
    WrongPassword,
}

impl LoginOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::Authenticated { .. } => MSG_LOGIN_SUCCESSFUL,
            Self::UnknownUser => MSG_UNKNOWN_USER,
            Self::WrongPassword => MSG_WRONG_PASSWORD,
        }
    }
}

impl fmt::Debug for LoginOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authenticated { .. } => f.write_str("Authenticated"),
            Self::UnknownUser => f.write_str("UnknownUser"),
            Self::WrongPassword => f.write_str("WrongPassword"),
        }
    }
}

/// Registration and login over an injected [`CredentialStore`].
#[derive(Clone)]
pub struct Accounts {
    store: Arc<dyn CredentialStore>,
    hasher: Hasher,
}

impl Accounts {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>, hasher: Hasher) -> Self {
        Self { store, hasher }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Create an account unless `email` is taken.
    ///
    /// The existence check is advisory: the store rejects a duplicate that
    /// slips past it, and that rejection comes back as
    /// [`RegisterOutcome::Failed`].
    ///
    /// # Errors
    /// Returns an error if the lookup fails or the secret cannot be hashed.
    #[instrument(skip(self, secret))]
    pub async fn register(
        &self,
        email: &str,
        secret: &str,
        username: &str,
    ) -> Result<RegisterOutcome, AccountError> {
        if self.store.find_by_email(email).await?.is_some() {
            debug!("Email already in use");
            return Ok(RegisterOutcome::EmailInUse);
        }

        let password_hash = self.hasher.hash_blocking(secret).await?;

        let account = NewAccount {
            email: email.to_string(),
            username: username.to_string(),
            password_hash,
        };

        match self.store.insert(account).await {
            Ok(created) => {
                info!(user_id = %created.id, "Account created");
                Ok(RegisterOutcome::Created {
                    user_id: created.id,
                })
            }
            Err(e) => {
                error!("Error inserting account: {e}");
                Ok(RegisterOutcome::Failed(e.to_string()))
            }
        }
    }

    /// Check `secret` against the account stored for `email`.
    ///
    /// # Errors
    /// Returns an error if the lookup fails, the stored hash is malformed, or
    /// no token can be generated.
    #[instrument(skip(self, secret))]
    pub async fn authenticate(
        &self,
        email: &str,
        secret: &str,
    ) -> Result<LoginOutcome, AccountError> {
        let Some(account) = self.store.find_by_email(email).await? else {
            debug!("User not found");
            return Ok(LoginOutcome::UnknownUser);
        };

        if !self
            .hasher
            .verify_blocking(secret, &account.password_hash)
            .await?
        {
            debug!(user_id = %account.id, "Password mismatch");
            return Ok(LoginOutcome::WrongPassword);
        }

        let token = token::generate()?;
        debug!(user_id = %account.id, "Login successful");

        Ok(LoginOutcome::Authenticated { token })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    fn accounts(store: Arc<dyn CredentialStore>) -> Accounts {
        Accounts::new(store, Hasher::new(1024, 1).unwrap())
    }

    /// Never sees an existing account, but the insert loses the race.
    struct RacingStore;

    #[async_trait]
    impl CredentialStore for RacingStore {
        async fn find_by_email(&self, _email: &str) -> Result<Option<Account>, StoreError> {
            Ok(None)
        }

        async fn insert(&self, _account: NewAccount) -> Result<Account, StoreError> {
            Err(StoreError::Duplicate)
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }

        async fn close(&self) {}
    }

    /// Lookup works but the insert exceeds the query timeout.
    struct SlowInsertStore;

    #[async_trait]
    impl CredentialStore for SlowInsertStore {
        async fn find_by_email(&self, _email: &str) -> Result<Option<Account>, StoreError> {
            Ok(None)
        }

        async fn insert(&self, _account: NewAccount) -> Result<Account, StoreError> {
            Err(StoreError::Timeout)
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }

        async fn close(&self) {}
    }

    struct UnreachableStore;

    #[async_trait]
    impl CredentialStore for UnreachableStore {
        async fn find_by_email(&self, _email: &str) -> Result<Option<Account>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }

        async fn insert(&self, _account: NewAccount) -> Result<Account, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }

        async fn close(&self) {}
    }

    #[tokio::test]
    async fn register_creates_exactly_one_account() {
        let store = Arc::new(MemoryStore::new());
        let accounts = accounts(store.clone());

        let outcome = accounts.register("a@x.com", "pw1", "alice").await.unwrap();
        let RegisterOutcome::Created { user_id } = outcome else {
            panic!("expected Created, got {outcome:?}");
        };
        assert!(!user_id.is_nil());
        assert_eq!(store.len().await, 1);

        let stored = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(stored.id, user_id);
        assert_eq!(stored.username, "alice");
    }

    #[tokio::test]
    async fn register_never_stores_plaintext() {
        let store = Arc::new(MemoryStore::new());
        let accounts = accounts(store.clone());
        accounts.register("a@x.com", "pw1", "alice").await.unwrap();

        let stored = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "pw1");
        assert!(!stored.password_hash.contains("pw1"));
    }

    #[tokio::test]
    async fn register_duplicate_email_creates_nothing() {
        let store = Arc::new(MemoryStore::new());
        let accounts = accounts(store.clone());
        accounts.register("a@x.com", "pw1", "alice").await.unwrap();

        let outcome = accounts.register("a@x.com", "pw2", "bob").await.unwrap();
        assert_eq!(outcome, RegisterOutcome::EmailInUse);
        assert!(!outcome.is_success());
        assert_eq!(outcome.message(), "Email already in use.");
        assert_eq!(store.len().await, 1);

        let stored = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(stored.username, "alice");
    }

    #[tokio::test]
    async fn register_lost_race_is_a_generic_failure() {
        let accounts = accounts(Arc::new(RacingStore));

        let outcome = accounts.register("a@x.com", "pw1", "alice").await.unwrap();
        assert!(!outcome.is_success());
        assert_eq!(
            outcome.message(),
            "Failed to create user: email already registered"
        );
    }

    #[tokio::test]
    async fn register_insert_timeout_is_a_generic_failure() {
        let accounts = accounts(Arc::new(SlowInsertStore));

        let outcome = accounts.register("a@x.com", "pw1", "alice").await.unwrap();
        assert_eq!(
            outcome,
            RegisterOutcome::Failed("store operation timed out".to_string())
        );
        assert_eq!(
            outcome.message(),
            "Failed to create user: store operation timed out"
        );
    }

    #[tokio::test]
    async fn register_lookup_failure_escapes() {
        let accounts = accounts(Arc::new(UnreachableStore));
        let result = accounts.register("a@x.com", "pw1", "alice").await;
        assert!(matches!(result, Err(AccountError::Store(_))));
    }

    #[tokio::test]
    async fn authenticate_unknown_user() {
        let accounts = accounts(Arc::new(MemoryStore::new()));
        let outcome = accounts.authenticate("z@x.com", "pw1").await.unwrap();
        assert_eq!(outcome, LoginOutcome::UnknownUser);
        assert_eq!(outcome.message(), "User does not exist.");
    }

    #[tokio::test]
    async fn authenticate_wrong_password() {
        let accounts = accounts(Arc::new(MemoryStore::new()));
        accounts.register("a@x.com", "pw1", "alice").await.unwrap();

        let outcome = accounts.authenticate("a@x.com", "pw9").await.unwrap();
        assert_eq!(outcome, LoginOutcome::WrongPassword);
        assert_eq!(outcome.message(), "Incorrect password.");
    }

    #[tokio::test]
    async fn authenticate_issues_fresh_tokens() {
        let accounts = accounts(Arc::new(MemoryStore::new()));
        accounts.register("a@x.com", "pw1", "alice").await.unwrap();

        let first = accounts.authenticate("a@x.com", "pw1").await.unwrap();
        let second = accounts.authenticate("a@x.com", "pw1").await.unwrap();
        assert!(first.is_success());
        assert_eq!(first.message(), "Login successful.");

        match (first, second) {
            (
                LoginOutcome::Authenticated { token: a },
                LoginOutcome::Authenticated { token: b },
            ) => {
                assert!(!a.is_empty());
                assert_ne!(a, b);
            }
            other => panic!("expected two successful logins, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn authenticate_malformed_stored_hash_escapes() {
        let store = Arc::new(MemoryStore::new());
        store
            .insert(NewAccount {
                email: "a@x.com".to_string(),
                username: "alice".to_string(),
                password_hash: "pw1".to_string(),
            })
            .await
            .unwrap();

        let result = accounts(store).authenticate("a@x.com", "pw1").await;
        assert!(matches!(result, Err(AccountError::Hash(_))));
    }

    #[tokio::test]
    async fn register_then_login_scenario() {
        let accounts = accounts(Arc::new(MemoryStore::new()));

        assert!(
            accounts
                .register("a@x.com", "pw1", "alice")
                .await
                .unwrap()
                .is_success()
        );
        assert_eq!(
            accounts.register("a@x.com", "pw2", "bob").await.unwrap(),
            RegisterOutcome::EmailInUse
        );
        assert!(
            accounts
                .authenticate("a@x.com", "pw1")
                .await
                .unwrap()
                .is_success()
        );
        assert_eq!(
            accounts.authenticate("a@x.com", "pw9").await.unwrap(),
            LoginOutcome::WrongPassword
        );
        assert_eq!(
            accounts.authenticate("z@x.com", "pw1").await.unwrap(),
            LoginOutcome::UnknownUser
        );
    }

    #[test]
    fn debug_output_hides_secrets() {
        let account = Account {
            id: Uuid::nil(),
            email: "a@x.com".to_string(),
            username: "alice".to_string(),
            password_hash: "$argon2id$secret".to_string(),
        };
        assert!(!format!("{account:?}").contains("secret"));

        let outcome = LoginOutcome::Authenticated {
            token: "tok".to_string(),
        };
        assert_eq!(format!("{outcome:?}"), "Authenticated");
    }
}
