//! Request pipeline: one signing step, one HTTP round trip, status check

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderValue, CONTENT_LENGTH};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};
use url::Url;

use crate::credential::SharedKeyCredential;
use crate::error::{ServiceCode, StorageError, StorageResult};
use crate::models::header_string;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const X_MS_ERROR_CODE: &str = "x-ms-error-code";
const X_MS_REQUEST_ID: &str = "x-ms-request-id";

/// Options applied to every request sent through a [`Pipeline`]
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Per-request timeout
    pub timeout: Duration,
    /// Optional `User-Agent` override
    pub user_agent: Option<String>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: None,
        }
    }
}

struct Inner {
    client: Client,
    credential: Option<SharedKeyCredential>,
}

/// Shared HTTP client plus credential; cloning is cheap
#[derive(Clone)]
pub struct Pipeline {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("credential", &self.inner.credential)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Builds a pipeline, signing requests with `credential` when present
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Config` if the HTTP client cannot be built
    pub fn try_new(
        credential: Option<SharedKeyCredential>,
        options: PipelineOptions,
    ) -> StorageResult<Self> {
        let mut builder = Client::builder().timeout(options.timeout);
        if let Some(user_agent) = options.user_agent {
            builder = builder.user_agent(user_agent);
        }
        let client = builder
            .build()
            .map_err(|e| StorageError::Config(format!("failed to build HTTP client: {e}")))?;

        debug!(
            "Initialized file service pipeline with {}s timeout",
            options.timeout.as_secs()
        );

        Ok(Self {
            inner: Arc::new(Inner { client, credential }),
        })
    }

    /// Builds a pipeline that signs every request with `credential`
    ///
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialized
    #[must_use]
    pub fn new(credential: SharedKeyCredential, options: PipelineOptions) -> Self {
        Self::try_new(Some(credential), options).expect("failed to initialize HTTP client")
    }

    /// Starts a request against `url`
    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.inner.client.request(method, url)
    }

    /// Signs and sends a request, accepting only the listed statuses
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Service` for any other status and
    /// `StorageError::Transport` when no response arrives
    pub(crate) async fn send(
        &self,
        builder: RequestBuilder,
        expected: &[StatusCode],
    ) -> StorageResult<Response> {
        let mut request = builder.build()?;

        if request.body().is_none() && request.method() == Method::PUT {
            request
                .headers_mut()
                .insert(CONTENT_LENGTH, HeaderValue::from_static("0"));
        }

        if let Some(credential) = &self.inner.credential {
            credential.authorize(&mut request)?;
        }

        let method = request.method().clone();
        let url = request.url().clone();
        debug!("{} {}", method, url);

        let response = self.inner.client.execute(request).await?;
        let status = response.status();

        if expected.contains(&status) {
            debug!("{} {} -> {}", method, url, status);
            return Ok(response);
        }

        let code = header_string(response.headers(), X_MS_ERROR_CODE).unwrap_or_default();
        let request_id = header_string(response.headers(), X_MS_REQUEST_ID);
        let message = response.text().await.unwrap_or_default();

        warn!(
            "{} {} failed with {} ({}), request id {:?}",
            method, url, status, code, request_id
        );

        Err(StorageError::Service {
            status,
            code: ServiceCode::new(code),
            message,
            request_id,
        })
    }
}
