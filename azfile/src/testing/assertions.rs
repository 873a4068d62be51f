//! Fixtures and assertions shared by File service tests

use std::fmt::Debug;

use crate::{FileHttpHeaders, Metadata, StorageResult};

/// Headers with every settable field populated except the MD5
#[must_use]
pub fn basic_headers() -> FileHttpHeaders {
    FileHttpHeaders {
        content_type: Some("my_type".to_string()),
        content_disposition: Some("my_disposition".to_string()),
        cache_control: Some("control".to_string()),
        content_md5: None,
        content_language: Some("my_language".to_string()),
        content_encoding: Some("my_encoding".to_string()),
    }
}

/// Single-entry metadata map `foo=bar`
#[must_use]
pub fn basic_metadata() -> Metadata {
    Metadata::from([("foo".to_string(), "bar".to_string())])
}

/// Asserts that `result` failed with a service error carrying `code`
///
/// # Panics
///
/// Panics if `result` succeeded, failed without a service code, or carries a different code
#[track_caller]
pub fn validate_storage_error<T: Debug>(result: &StorageResult<T>, code: &str) {
    let err = match result {
        Ok(value) => panic!("expected service error {code}, got success: {value:?}"),
        Err(err) => err,
    };

    match err.service_code() {
        Some(actual) => assert_eq!(actual.as_str(), code, "unexpected service code: {err}"),
        None => panic!("expected service error {code}, got: {err}"),
    }
}
