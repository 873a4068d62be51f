//! Handles to the service, shares, directories and files
//!
//! A handle is a URL plus the pipeline used to reach it. Deriving a child
//! handle never touches the network; whether the resource exists is decided
//! by the service when an operation is issued.

use percent_encoding::percent_decode_str;
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Method, StatusCode};
use tracing::info;
use url::Url;

use crate::error::{StorageError, StorageResult};
use crate::models::{
    apply_metadata, CreatedResponse, DeletedResponse, FileHttpHeaders, FileProperties, Metadata,
};
use crate::pipeline::Pipeline;

const RESTYPE: &str = "restype";
const SMB_PERMISSION_INHERIT: &str = "inherit";
const SMB_TIME_NOW: &str = "now";

fn child_url(parent: &Url, name: &str) -> Url {
    let mut url = parent.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(name);
    }
    url
}

fn last_segment(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.rev().find(|s| !s.is_empty()))
        .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
        .unwrap_or_default()
}

/// Inclusive end of a `len`-byte range at `offset`; `len` must be non-zero
fn range_end(offset: u64, len: u64) -> StorageResult<u64> {
    offset.checked_add(len - 1).ok_or_else(|| {
        StorageError::InvalidInput(format!(
            "range of {len} bytes at offset {offset} exceeds the addressable size"
        ))
    })
}

/// Handle to the File service of one storage account
#[derive(Debug, Clone)]
pub struct ServiceUrl {
    url: Url,
    pipeline: Pipeline,
}

impl ServiceUrl {
    /// Wraps the service endpoint, e.g. `https://<account>.file.core.windows.net/`
    #[must_use]
    pub const fn new(url: Url, pipeline: Pipeline) -> Self {
        Self { url, pipeline }
    }

    /// Service endpoint
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Pipeline shared by every handle derived from this one
    #[must_use]
    pub const fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Handle to the share `name`; no request is made
    #[must_use]
    pub fn new_share_url(&self, name: &str) -> ShareUrl {
        ShareUrl {
            url: child_url(&self.url, name),
            pipeline: self.pipeline.clone(),
        }
    }
}

/// Handle to a share
#[derive(Debug, Clone)]
pub struct ShareUrl {
    url: Url,
    pipeline: Pipeline,
}

impl ShareUrl {
    /// Share URL
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Share name
    #[must_use]
    pub fn name(&self) -> String {
        last_segment(&self.url)
    }

    /// Handle to the share's root directory
    #[must_use]
    pub fn new_root_directory_url(&self) -> DirectoryUrl {
        DirectoryUrl {
            url: self.url.clone(),
            pipeline: self.pipeline.clone(),
            root: true,
        }
    }

    /// Handle to a top-level directory of this share
    #[must_use]
    pub fn new_directory_url(&self, name: &str) -> DirectoryUrl {
        self.new_root_directory_url().new_directory_url(name)
    }

    /// Creates the share
    ///
    /// # Arguments
    ///
    /// * `metadata` - Optional user metadata
    /// * `quota_gib` - Maximum share size in GiB, 0 for the service default
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Service` with `ShareAlreadyExists` if the share exists
    pub async fn create(
        &self,
        metadata: Option<&Metadata>,
        quota_gib: u32,
    ) -> StorageResult<CreatedResponse> {
        let mut builder = self
            .pipeline
            .request(Method::PUT, self.url.clone())
            .query(&[(RESTYPE, "share")]);
        if quota_gib > 0 {
            builder = builder.header("x-ms-share-quota", quota_gib.to_string());
        }
        if let Some(metadata) = metadata {
            builder = apply_metadata(builder, metadata);
        }

        let response = self.pipeline.send(builder, &[StatusCode::CREATED]).await?;
        info!("Created share {}", self.name());
        Ok(CreatedResponse::from_response(&response))
    }

    /// Deletes the share together with its snapshots
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Service` with `ShareNotFound` if the share does not exist
    pub async fn delete(&self) -> StorageResult<DeletedResponse> {
        let builder = self
            .pipeline
            .request(Method::DELETE, self.url.clone())
            .query(&[(RESTYPE, "share")])
            .header("x-ms-delete-snapshots", "include");

        let response = self.pipeline.send(builder, &[StatusCode::ACCEPTED]).await?;
        info!("Deleted share {}", self.name());
        Ok(DeletedResponse::from_response(&response))
    }
}

/// Handle to a directory, possibly the root directory of a share
#[derive(Debug, Clone)]
pub struct DirectoryUrl {
    url: Url,
    pipeline: Pipeline,
    root: bool,
}

impl DirectoryUrl {
    /// Directory URL
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Directory name; empty for a share's root directory
    #[must_use]
    pub fn name(&self) -> String {
        if self.root {
            String::new()
        } else {
            last_segment(&self.url)
        }
    }

    /// Handle to a subdirectory
    #[must_use]
    pub fn new_directory_url(&self, name: &str) -> Self {
        Self {
            url: child_url(&self.url, name),
            pipeline: self.pipeline.clone(),
            root: false,
        }
    }

    /// Handle to a file in this directory
    #[must_use]
    pub fn new_file_url(&self, name: &str) -> FileUrl {
        FileUrl {
            url: child_url(&self.url, name),
            pipeline: self.pipeline.clone(),
        }
    }

    /// Creates the directory with inherited permissions
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Service` with `ResourceAlreadyExists` or
    /// `ParentNotFound` when the service rejects the request
    pub async fn create(&self, metadata: Option<&Metadata>) -> StorageResult<CreatedResponse> {
        if self.root {
            return Err(StorageError::InvalidInput(
                "the root directory always exists".to_string(),
            ));
        }

        let mut builder = self
            .pipeline
            .request(Method::PUT, self.url.clone())
            .query(&[(RESTYPE, "directory")])
            .header("x-ms-file-permission", SMB_PERMISSION_INHERIT)
            .header("x-ms-file-attributes", "Directory")
            .header("x-ms-file-creation-time", SMB_TIME_NOW)
            .header("x-ms-file-last-write-time", SMB_TIME_NOW);
        if let Some(metadata) = metadata {
            builder = apply_metadata(builder, metadata);
        }

        let response = self.pipeline.send(builder, &[StatusCode::CREATED]).await?;
        Ok(CreatedResponse::from_response(&response))
    }

    /// Deletes the directory, which must be empty
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Service` if the directory is missing or not empty
    pub async fn delete(&self) -> StorageResult<DeletedResponse> {
        let builder = self
            .pipeline
            .request(Method::DELETE, self.url.clone())
            .query(&[(RESTYPE, "directory")]);

        let response = self.pipeline.send(builder, &[StatusCode::ACCEPTED]).await?;
        Ok(DeletedResponse::from_response(&response))
    }
}

/// Handle to a file
#[derive(Debug, Clone)]
pub struct FileUrl {
    url: Url,
    pipeline: Pipeline,
}

impl FileUrl {
    /// File URL
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// File name
    #[must_use]
    pub fn name(&self) -> String {
        last_segment(&self.url)
    }

    /// Creates (or replaces) the file with a fixed size and zeroed content
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Service` with `ParentNotFound` if the directory is missing
    pub async fn create(
        &self,
        size: u64,
        headers: &FileHttpHeaders,
        metadata: Option<&Metadata>,
    ) -> StorageResult<CreatedResponse> {
        let mut builder = self
            .pipeline
            .request(Method::PUT, self.url.clone())
            .header("x-ms-type", "file")
            .header("x-ms-content-length", size.to_string())
            .header("x-ms-file-permission", SMB_PERMISSION_INHERIT)
            .header("x-ms-file-attributes", "None")
            .header("x-ms-file-creation-time", SMB_TIME_NOW)
            .header("x-ms-file-last-write-time", SMB_TIME_NOW);
        builder = headers.apply(builder);
        if let Some(metadata) = metadata {
            builder = apply_metadata(builder, metadata);
        }

        let response = self.pipeline.send(builder, &[StatusCode::CREATED]).await?;
        Ok(CreatedResponse::from_response(&response))
    }

    /// Writes `data` at `offset`; the range must lie within the file size
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidInput` for an empty body or a range past `u64::MAX`,
    /// and `StorageError::Service` with `InvalidRange` for an out-of-bounds write
    pub async fn upload_range(&self, offset: u64, data: Vec<u8>) -> StorageResult<CreatedResponse> {
        if data.is_empty() {
            return Err(StorageError::InvalidInput(
                "range upload body must not be empty".to_string(),
            ));
        }

        let len = data.len() as u64;
        let end = range_end(offset, len)?;
        let builder = self
            .pipeline
            .request(Method::PUT, self.url.clone())
            .query(&[("comp", "range")])
            .header("x-ms-range", format!("bytes={offset}-{end}"))
            .header("x-ms-write", "update")
            .header(CONTENT_LENGTH, len.to_string())
            .body(data);

        let response = self.pipeline.send(builder, &[StatusCode::CREATED]).await?;
        Ok(CreatedResponse::from_response(&response))
    }

    /// Reads `count` bytes from `offset`, or the rest of the file when `count` is `None`
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidInput` if the range ends past `u64::MAX`, and
    /// `StorageError::Service` with `ResourceNotFound` if the file is missing
    pub async fn download(&self, offset: u64, count: Option<u64>) -> StorageResult<Vec<u8>> {
        let mut builder = self.pipeline.request(Method::GET, self.url.clone());
        match count {
            Some(0) => return Ok(Vec::new()),
            Some(count) => {
                let end = range_end(offset, count)?;
                builder = builder.header("x-ms-range", format!("bytes={offset}-{end}"));
            }
            None if offset > 0 => {
                builder = builder.header("x-ms-range", format!("bytes={offset}-"));
            }
            None => {}
        }

        let response = self
            .pipeline
            .send(builder, &[StatusCode::OK, StatusCode::PARTIAL_CONTENT])
            .await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Fetches size, HTTP headers and metadata
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Service` if the file is missing
    pub async fn get_properties(&self) -> StorageResult<FileProperties> {
        let builder = self.pipeline.request(Method::HEAD, self.url.clone());
        let response = self.pipeline.send(builder, &[StatusCode::OK]).await?;
        Ok(FileProperties::from_response(&response))
    }

    /// Deletes the file
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Service` with `ResourceNotFound` if the file is missing
    pub async fn delete(&self) -> StorageResult<DeletedResponse> {
        let builder = self.pipeline.request(Method::DELETE, self.url.clone());
        let response = self.pipeline.send(builder, &[StatusCode::ACCEPTED]).await?;
        Ok(DeletedResponse::from_response(&response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineOptions;
    use pretty_assertions::assert_eq;

    fn service() -> ServiceUrl {
        let pipeline = Pipeline::try_new(None, PipelineOptions::default()).unwrap();
        ServiceUrl::new(
            Url::parse("https://myaccount.file.core.windows.net/").unwrap(),
            pipeline,
        )
    }

    #[test]
    fn test_handles_compose_paths() {
        let share = service().new_share_url("myshare");
        let dir = share.new_directory_url("a").new_directory_url("b");
        let file = dir.new_file_url("data.bin");

        assert_eq!(share.url().path(), "/myshare");
        assert_eq!(dir.url().path(), "/myshare/a/b");
        assert_eq!(file.url().path(), "/myshare/a/b/data.bin");
        assert_eq!(share.name(), "myshare");
        assert_eq!(dir.name(), "b");
        assert_eq!(file.name(), "data.bin");
    }

    #[test]
    fn test_root_directory_has_no_name() {
        let share = service().new_share_url("myshare");
        let root = share.new_root_directory_url();
        let file = root.new_file_url("top.txt");

        assert_eq!(root.name(), "");
        assert_eq!(root.url(), share.url());
        assert_eq!(file.url().path(), "/myshare/top.txt");
    }

    #[test]
    fn test_names_are_percent_encoded() {
        let file = service()
            .new_share_url("myshare")
            .new_root_directory_url()
            .new_file_url("with space#1");

        assert_eq!(file.url().path(), "/myshare/with%20space%231");
        assert_eq!(file.name(), "with space#1");
    }

    #[tokio::test]
    async fn test_upload_range_rejects_empty_body() {
        let file = service()
            .new_share_url("myshare")
            .new_root_directory_url()
            .new_file_url("f");

        let err = file.upload_range(0, Vec::new()).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_download_range_past_u64_max_is_rejected() {
        let file = service()
            .new_share_url("myshare")
            .new_root_directory_url()
            .new_file_url("f");

        let err = file.download(10, Some(u64::MAX)).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidInput(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_upload_range_past_u64_max_is_rejected() {
        let file = service()
            .new_share_url("myshare")
            .new_root_directory_url()
            .new_file_url("f");

        let err = file.upload_range(u64::MAX - 1, vec![1, 2, 3]).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidInput(_)), "got {err:?}");
    }

    #[test]
    fn test_range_end_is_inclusive() {
        assert_eq!(range_end(0, 1).unwrap(), 0);
        assert_eq!(range_end(10, 5).unwrap(), 14);
        assert_eq!(range_end(u64::MAX, 1).unwrap(), u64::MAX);
        assert!(range_end(u64::MAX, 2).is_err());
    }

    #[tokio::test]
    async fn test_root_directory_cannot_be_created() {
        let root = service().new_share_url("myshare").new_root_directory_url();
        let err = root.create(None).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidInput(_)));
    }
}
