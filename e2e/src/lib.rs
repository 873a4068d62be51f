//! Live tests against a real storage account
//!
//! Every test is ignored by default. Run them with
//! `ACCOUNT_NAME=... ACCOUNT_KEY=... cargo test -p e2e-tests -- --ignored`.

use std::thread;

use azfile::testing::{account_from_env, create_new_share, delete_share, get_fsu, setup_test_env};
use azfile::{ServiceUrl, ShareUrl};

/// A freshly created share that is deleted again when dropped
///
/// Prefer [`ShareContext::cleanup`] at the end of a test. Dropping without it,
/// e.g. while a failed assertion unwinds, deletes the share synchronously.
pub struct ShareContext {
    /// Service handle for the primary account
    pub fsu: ServiceUrl,
    /// The share under test
    pub share: ShareUrl,
    /// Generated share name
    pub name: String,
    cleaned_up: bool,
}

impl ShareContext {
    /// Creates a share on the primary account
    ///
    /// # Panics
    ///
    /// Panics if the account is not configured or the share cannot be created
    pub async fn new() -> Self {
        setup_test_env();

        let fsu = get_fsu();
        let (share, name) = create_new_share(&fsu).await;
        tracing::info!("Created test share {name}");

        Self {
            fsu,
            share,
            name,
            cleaned_up: false,
        }
    }

    /// Deletes the share and waits for the service to accept the request
    pub async fn cleanup(mut self) {
        delete_share(&self.share).await;
        self.cleaned_up = true;
    }
}

impl Drop for ShareContext {
    fn drop(&mut self) {
        if self.cleaned_up {
            return;
        }

        // The test's runtime is blocked in `join` below, so the delete runs on a
        // runtime of its own with a fresh client: connections pooled by the
        // test's client are driven by the blocked runtime.
        let name = self.name.clone();
        let cleanup = thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| format!("failed to build runtime: {e}"))?;
            let fsu = account_from_env()
                .service_url()
                .map_err(|e| format!("failed to build service URL: {e}"))?;
            runtime.block_on(delete_share(&fsu.new_share_url(&name)));
            Ok::<_, String>(())
        });

        match cleanup.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!("Failed to clean up share {}: {e}", self.name),
            Err(_) => tracing::warn!("Cleanup of share {} panicked", self.name),
        }
    }
}
