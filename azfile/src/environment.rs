//! Endpoint configuration for different deployment targets

use std::env;
use std::time::Duration;

use tracing::Level;
use url::Url;

use crate::error::{StorageError, StorageResult};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const ENDPOINT_VAR: &str = "AZFILE_ENDPOINT";
const SECONDARY_ENDPOINT_VAR: &str = "SECONDARY_AZFILE_ENDPOINT";

fn endpoint_from_var(var: &str) -> StorageResult<Option<Url>> {
    match env::var(var) {
        Ok(endpoint) if !endpoint.trim().is_empty() => {
            let endpoint = endpoint.trim();
            Url::parse(endpoint)
                .map(Some)
                .map_err(|e| StorageError::Config(format!("Invalid {var} {endpoint}: {e}")))
        }
        _ => Ok(None),
    }
}

/// Where the File service lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Public Azure cloud, one host per account
    Azure,
    /// Fixed endpoint (emulator, proxy or mock server)
    Custom {
        /// Service root URL
        endpoint: Url,
    },
}

impl Environment {
    /// Creates an Environment from the `AZFILE_ENDPOINT` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `AZFILE_ENDPOINT` is set but is not a valid URL
    #[must_use]
    pub fn from_env() -> Self {
        Self::try_from_env().unwrap_or_else(|e| panic!("{e}"))
    }

    /// Fallible [`Environment::from_env`]
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Config` if `AZFILE_ENDPOINT` is set but is not a valid URL
    pub fn try_from_env() -> StorageResult<Self> {
        Ok(endpoint_from_var(ENDPOINT_VAR)?
            .map_or(Self::Azure, |endpoint| Self::Custom { endpoint }))
    }

    /// Environment for the secondary account
    ///
    /// `SECONDARY_AZFILE_ENDPOINT` wins when set, so each account can have its
    /// own emulator or proxy. Otherwise this is [`Environment::try_from_env`]:
    /// a single `AZFILE_ENDPOINT` then serves both accounts.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Config` if either variable is set but is not a valid URL
    pub fn secondary_from_env() -> StorageResult<Self> {
        match endpoint_from_var(SECONDARY_ENDPOINT_VAR)? {
            Some(endpoint) => Ok(Self::Custom { endpoint }),
            None => Self::try_from_env(),
        }
    }

    /// Returns the File service root for `account`
    ///
    /// # Panics
    ///
    /// Panics if `account` cannot form a valid host name
    #[must_use]
    pub fn service_endpoint(&self, account: &str) -> Url {
        self.try_service_endpoint(account).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Fallible [`Environment::service_endpoint`]; `Custom` ignores `account`
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Config` if `account` cannot form a valid host name
    pub fn try_service_endpoint(&self, account: &str) -> StorageResult<Url> {
        match self {
            Self::Azure => Url::parse(&format!("https://{account}.file.core.windows.net/"))
                .map_err(|e| {
                    StorageError::Config(format!("Invalid storage account name {account}: {e}"))
                }),
            Self::Custom { endpoint } => Ok(endpoint.clone()),
        }
    }

    /// Per-request timeout, overridable with `AZFILE_TIMEOUT_SECS`
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        let secs = env::var("AZFILE_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    /// Log level, overridable with `TRACING_LEVEL`
    #[must_use]
    pub fn tracing_level(&self) -> Level {
        env::var("TRACING_LEVEL")
            .ok()
            .and_then(|val| val.parse::<Level>().ok())
            .unwrap_or(match self {
                Self::Azure => Level::INFO,
                Self::Custom { .. } => Level::DEBUG,
            })
    }
}
