//! Unique, service-valid names for test shares, directories and files

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use chrono::{Timelike, Utc};

/// Prefix for generated share names
pub const SHARE_PREFIX: &str = "rs";
/// Prefix for generated directory names
pub const DIRECTORY_PREFIX: &str = "rstestdirectory";
/// Prefix for generated file names
pub const FILE_PREFIX: &str = "rstestfile";
/// Substring the service uses in request validation failures
pub const VALIDATION_ERROR_SUBSTRING: &str = "validation failed";
/// Payload written by [`create_new_file_from_share_with_default_data`](super::create_new_file_from_share_with_default_data)
pub const FILE_DEFAULT_DATA: &str = "file default data";

const DEFAULT_CALLER: &str = "foo";
// Keeps "rstestdirectory" + caller + timestamp well inside 63 chars
const MAX_CALLER_LEN: usize = 24;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

fn sanitize(caller: &str) -> String {
    caller
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .take(MAX_CALLER_LEN)
        .collect()
}

/// Identifies the running test from its thread name
///
/// The test harness names each test thread after the test path, e.g.
/// `share::test_create_share` becomes `createshare`. Falls back to `"foo"`
/// on the main thread or when nothing usable remains.
#[must_use]
pub fn caller_identifier() -> String {
    let current = thread::current();
    let name = current
        .name()
        .filter(|name| *name != "main")
        .and_then(|name| name.rsplit("::").next())
        .map(|name| name.strip_prefix("test_").unwrap_or(name))
        .map(sanitize)
        .unwrap_or_default();

    if name.is_empty() {
        DEFAULT_CALLER.to_string()
    } else {
        name
    }
}

/// Concatenates `prefix`, the lower-cased `caller`, and the current minute,
/// second and nanosecond, followed by a per-process sequence number
///
/// The timestamp fields are zero-padded to 2, 2 and 9 digits, so distinct
/// clock readings never render to the same digits. The sequence number keeps
/// two calls within the same clock tick apart.
#[must_use]
pub fn generate_name_for(prefix: &str, caller: &str) -> String {
    let now = Utc::now();
    let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!(
        "{prefix}{}{:02}{:02}{:09}{sequence}",
        sanitize(caller),
        now.minute(),
        now.second(),
        now.nanosecond()
    )
}

/// [`generate_name_for`] with the running test as the caller
#[must_use]
pub fn generate_name(prefix: &str) -> String {
    generate_name_for(prefix, &caller_identifier())
}

/// Unique share name for the running test
#[must_use]
pub fn generate_share_name() -> String {
    generate_name(SHARE_PREFIX)
}

/// Unique directory name for the running test
#[must_use]
pub fn generate_directory_name() -> String {
    generate_name(DIRECTORY_PREFIX)
}

/// Unique file name for the running test
#[must_use]
pub fn generate_file_name() -> String {
    generate_name(FILE_PREFIX)
}
