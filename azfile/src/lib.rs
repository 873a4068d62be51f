//! Azure File storage client
//!
//! Thin handles over the File service REST API: a service handle hands out
//! share handles, shares hand out directory handles, and directories hand out
//! file handles. Building a handle is local; only the explicit operations
//! (`create`, `delete`, `upload_range`, ...) go over the wire.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Shared Key request signing
pub mod credential;

/// Endpoint and runtime configuration
pub mod environment;

/// Typed storage errors
pub mod error;

/// Request and response value types
pub mod models;

/// Signed request dispatch
pub mod pipeline;

/// Service, share, directory and file handles
pub mod urls;

/// Test scaffolding for creating ephemeral shares, directories and files
#[cfg(feature = "test-utils")]
pub mod testing;

pub use credential::SharedKeyCredential;
pub use environment::Environment;
pub use error::{ServiceCode, StorageError, StorageResult};
pub use models::{CreatedResponse, DeletedResponse, FileHttpHeaders, FileProperties, Metadata};
pub use pipeline::{Pipeline, PipelineOptions};
pub use urls::{DirectoryUrl, FileUrl, ServiceUrl, ShareUrl};
