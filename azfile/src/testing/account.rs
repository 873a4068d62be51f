//! Storage account credentials and service handles loaded from the environment
//!
//! The primary account is mandatory and its loaders panic; the secondary
//! account is optional and its loaders return `StorageError::Config`.

use std::env;

use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

use crate::{
    Environment, Pipeline, PipelineOptions, ServiceUrl, SharedKeyCredential, StorageError,
    StorageResult,
};

/// Storage account name and base64 access key
#[derive(Clone)]
pub struct Account {
    /// Storage account name
    pub name: String,
    /// Base64 access key
    pub key: String,
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Account {
    /// Builds a Shared Key credential for this account
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Config` if the key is not valid base64
    pub fn credential(&self) -> StorageResult<SharedKeyCredential> {
        SharedKeyCredential::new(&self.name, &self.key)
    }

    /// Service handle for this account, honoring `AZFILE_ENDPOINT`
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Config` if the endpoint, credential or HTTP client cannot be built
    pub fn service_url(&self) -> StorageResult<ServiceUrl> {
        self.service_url_in(&Environment::try_from_env()?)
    }

    /// Service handle for this account in `environment`
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Config` if the endpoint, credential or HTTP client cannot be built
    pub fn service_url_in(&self, environment: &Environment) -> StorageResult<ServiceUrl> {
        let endpoint = environment.try_service_endpoint(&self.name)?;
        let options = PipelineOptions {
            timeout: environment.request_timeout(),
            ..PipelineOptions::default()
        };
        let pipeline = Pipeline::try_new(Some(self.credential()?), options)?;
        Ok(ServiceUrl::new(endpoint, pipeline))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Loads the primary account from `ACCOUNT_NAME` and `ACCOUNT_KEY`
///
/// # Panics
///
/// Panics if either variable is missing or empty
#[must_use]
pub fn account_from_env() -> Account {
    match (non_empty_var("ACCOUNT_NAME"), non_empty_var("ACCOUNT_KEY")) {
        (Some(name), Some(key)) => Account { name, key },
        _ => panic!("ACCOUNT_NAME and ACCOUNT_KEY environment vars must be set before running tests"),
    }
}

/// Loads the secondary account from `SECONDARY_ACCOUNT_NAME` and `SECONDARY_ACCOUNT_KEY`
///
/// # Errors
///
/// Returns `StorageError::Config` if either variable is missing or empty
pub fn secondary_account_from_env() -> StorageResult<Account> {
    match (
        non_empty_var("SECONDARY_ACCOUNT_NAME"),
        non_empty_var("SECONDARY_ACCOUNT_KEY"),
    ) {
        (Some(name), Some(key)) => Ok(Account { name, key }),
        _ => Err(StorageError::Config(
            "SECONDARY_ACCOUNT_NAME and/or SECONDARY_ACCOUNT_KEY environment variables not specified"
                .to_string(),
        )),
    }
}

/// Service handle for the primary account
///
/// # Panics
///
/// Panics if the account is not configured or its key is invalid
#[must_use]
pub fn get_fsu() -> ServiceUrl {
    account_from_env()
        .service_url()
        .unwrap_or_else(|e| panic!("failed to build service URL: {e}"))
}

/// Service handle for the secondary account
///
/// Requests go to `SECONDARY_AZFILE_ENDPOINT` when set, then `AZFILE_ENDPOINT`,
/// then the account's own Azure host. With only `AZFILE_ENDPOINT` set, both
/// accounts share that endpoint.
///
/// # Errors
///
/// Returns `StorageError::Config` if the secondary account is not configured or
/// its endpoint cannot be built
pub fn get_alternate_fsu() -> StorageResult<ServiceUrl> {
    let account = secondary_account_from_env()?;
    account.service_url_in(&Environment::secondary_from_env()?)
}

/// Shared Key credential for the primary account, plus the account name
///
/// # Panics
///
/// Panics if the account is not configured or its key is invalid
#[must_use]
pub fn get_credential() -> (SharedKeyCredential, String) {
    let account = account_from_env();
    let credential = account
        .credential()
        .unwrap_or_else(|e| panic!("failed to build credential: {e}"));
    (credential, account.name)
}

/// Loads `.env` and installs a test-friendly tracing subscriber; safe to call repeatedly
pub fn setup_test_env() {
    dotenvy::dotenv().ok();

    let level = LevelFilter::from_level(Environment::from_env().tracing_level());
    fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_test_writer()
        .try_init()
        .ok();
}
