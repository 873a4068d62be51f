//! Helpers that name, and optionally create, per-test shares, directories and files
//!
//! The `get_*` helpers only derive handles. The `create_new_*` helpers issue the
//! create call and panic unless the service answers 201.

use tracing::{debug, warn};

use super::names::{
    generate_directory_name, generate_file_name, generate_name, generate_share_name,
    FILE_DEFAULT_DATA,
};
use crate::{CreatedResponse, DirectoryUrl, FileHttpHeaders, FileUrl, ServiceUrl, ShareUrl};

const CREATED: u16 = 201;

#[track_caller]
fn assert_created(result: crate::StorageResult<CreatedResponse>, what: &str, name: &str) {
    match result {
        Ok(response) => assert_eq!(
            response.status_code(),
            CREATED,
            "unexpected status creating {what} {name}"
        ),
        Err(e) => panic!("failed to create {what} {name}: {e}"),
    }
}

/// Handle to a share with a generated name; nothing is created
#[must_use]
pub fn get_share_url(fsu: &ServiceUrl) -> (ShareUrl, String) {
    let name = generate_share_name();
    (fsu.new_share_url(&name), name)
}

/// Handle to a top-level directory with a generated name; nothing is created
#[must_use]
pub fn get_directory_url_from_share(share: &ShareUrl) -> (DirectoryUrl, String) {
    let name = generate_directory_name();
    (share.new_directory_url(&name), name)
}

/// Handle to a subdirectory with a generated name; nothing is created
#[must_use]
pub fn get_directory_url_from_directory(parent: &DirectoryUrl) -> (DirectoryUrl, String) {
    let name = generate_directory_name();
    (parent.new_directory_url(&name), name)
}

/// Handle to a file in the share's root directory; nothing is created
#[must_use]
pub fn get_file_url_from_share(share: &ShareUrl) -> (FileUrl, String) {
    get_file_url_from_directory(&share.new_root_directory_url())
}

/// Handle to a file with a generated name; nothing is created
#[must_use]
pub fn get_file_url_from_directory(directory: &DirectoryUrl) -> (FileUrl, String) {
    let name = generate_file_name();
    (directory.new_file_url(&name), name)
}

/// Creates a share with a generated name
///
/// # Panics
///
/// Panics unless the service answers 201
pub async fn create_new_share(fsu: &ServiceUrl) -> (ShareUrl, String) {
    let (share, name) = get_share_url(fsu);
    assert_created(share.create(None, 0).await, "share", &name);
    (share, name)
}

/// Creates a share whose name starts with `prefix`
///
/// # Panics
///
/// Panics unless the service answers 201
pub async fn create_new_share_with_prefix(fsu: &ServiceUrl, prefix: &str) -> (ShareUrl, String) {
    let name = generate_name(prefix);
    let share = fsu.new_share_url(&name);
    assert_created(share.create(None, 0).await, "share", &name);
    (share, name)
}

/// Creates a top-level directory with a generated name
///
/// # Panics
///
/// Panics unless the service answers 201
pub async fn create_new_directory_from_share(share: &ShareUrl) -> (DirectoryUrl, String) {
    let (directory, name) = get_directory_url_from_share(share);
    assert_created(directory.create(None).await, "directory", &name);
    (directory, name)
}

/// Creates a subdirectory with a generated name
///
/// # Panics
///
/// Panics unless the service answers 201
pub async fn create_new_directory_from_directory(parent: &DirectoryUrl) -> (DirectoryUrl, String) {
    let (directory, name) = get_directory_url_from_directory(parent);
    assert_created(directory.create(None).await, "directory", &name);
    (directory, name)
}

/// Creates a subdirectory whose name starts with `prefix`
///
/// # Panics
///
/// Panics unless the service answers 201
pub async fn create_new_directory_with_prefix(
    parent: &DirectoryUrl,
    prefix: &str,
) -> (DirectoryUrl, String) {
    let name = generate_name(prefix);
    let directory = parent.new_directory_url(&name);
    assert_created(directory.create(None).await, "directory", &name);
    (directory, name)
}

/// Creates a zero-filled file of `size` bytes in the share's root directory
///
/// # Panics
///
/// Panics unless the service answers 201
pub async fn create_new_file_from_share(share: &ShareUrl, size: u64) -> (FileUrl, String) {
    create_new_file_from_directory(&share.new_root_directory_url(), size).await
}

/// Creates a file in the share's root directory holding [`FILE_DEFAULT_DATA`]
///
/// # Panics
///
/// Panics if creating the file or uploading the data fails
pub async fn create_new_file_from_share_with_default_data(share: &ShareUrl) -> (FileUrl, String) {
    let data = FILE_DEFAULT_DATA.as_bytes();
    let (file, name) = create_new_file_from_share(share, data.len() as u64).await;

    if let Err(e) = file.upload_range(0, data.to_vec()).await {
        panic!("failed to upload default data to {name}: {e}");
    }

    (file, name)
}

/// Creates a zero-filled file of `size` bytes with a generated name
///
/// # Panics
///
/// Panics unless the service answers 201
pub async fn create_new_file_from_directory(directory: &DirectoryUrl, size: u64) -> (FileUrl, String) {
    let (file, name) = get_file_url_from_directory(directory);
    assert_created(
        file.create(size, &FileHttpHeaders::default(), None).await,
        "file",
        &name,
    );
    (file, name)
}

/// Creates a zero-filled file of `size` bytes whose name starts with `prefix`
///
/// # Panics
///
/// Panics unless the service answers 201
pub async fn create_new_file_with_prefix(
    directory: &DirectoryUrl,
    prefix: &str,
    size: u64,
) -> (FileUrl, String) {
    let name = generate_name(prefix);
    let file = directory.new_file_url(&name);
    assert_created(
        file.create(size, &FileHttpHeaders::default(), None).await,
        "file",
        &name,
    );
    (file, name)
}

/// Deletes a share created by a test, logging instead of failing on error
pub async fn delete_share(share: &ShareUrl) {
    match share.delete().await {
        Ok(_) => debug!("Cleaned up share {}", share.name()),
        Err(e) => warn!("Failed to clean up share {}: {e}", share.name()),
    }
}
