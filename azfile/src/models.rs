//! Request and response value types

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::{HeaderMap, CONTENT_LENGTH, CONTENT_TYPE, ETAG, LAST_MODIFIED};
use reqwest::{RequestBuilder, Response, StatusCode};

const META_PREFIX: &str = "x-ms-meta-";
const X_MS_REQUEST_ID: &str = "x-ms-request-id";

/// User-defined name/value pairs sent as `x-ms-meta-*` headers
pub type Metadata = BTreeMap<String, String>;

/// Standard HTTP properties stored with a file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileHttpHeaders {
    /// `Content-Type` returned on download
    pub content_type: Option<String>,
    /// `Content-Encoding` returned on download
    pub content_encoding: Option<String>,
    /// `Content-Language` returned on download
    pub content_language: Option<String>,
    /// `Cache-Control` returned on download
    pub cache_control: Option<String>,
    /// Raw MD5 digest of the whole file
    pub content_md5: Option<Vec<u8>>,
    /// `Content-Disposition` returned on download
    pub content_disposition: Option<String>,
}

impl FileHttpHeaders {
    pub(crate) fn apply(&self, mut builder: RequestBuilder) -> RequestBuilder {
        let pairs = [
            ("x-ms-content-type", &self.content_type),
            ("x-ms-content-encoding", &self.content_encoding),
            ("x-ms-content-language", &self.content_language),
            ("x-ms-cache-control", &self.cache_control),
            ("x-ms-content-disposition", &self.content_disposition),
        ];
        for (name, value) in pairs {
            if let Some(value) = value {
                builder = builder.header(name, value);
            }
        }
        if let Some(md5) = &self.content_md5 {
            builder = builder.header("x-ms-content-md5", STANDARD.encode(md5));
        }
        builder
    }

    fn from_response_headers(headers: &HeaderMap) -> Self {
        Self {
            content_type: header_string(headers, CONTENT_TYPE.as_str()),
            content_encoding: header_string(headers, "content-encoding"),
            content_language: header_string(headers, "content-language"),
            cache_control: header_string(headers, "cache-control"),
            content_md5: header_string(headers, "content-md5")
                .and_then(|md5| STANDARD.decode(md5).ok()),
            content_disposition: header_string(headers, "content-disposition"),
        }
    }
}

pub(crate) fn apply_metadata(mut builder: RequestBuilder, metadata: &Metadata) -> RequestBuilder {
    for (key, value) in metadata {
        builder = builder.header(format!("{META_PREFIX}{key}"), value);
    }
    builder
}

/// Outcome of a successful create or upload call
#[derive(Debug, Clone)]
pub struct CreatedResponse {
    /// HTTP status, 201 on success
    pub status: StatusCode,
    /// `ETag` of the new resource
    pub etag: Option<String>,
    /// `Last-Modified` of the new resource
    pub last_modified: Option<String>,
    /// Service request id, useful when reporting failures
    pub request_id: Option<String>,
}

impl CreatedResponse {
    /// Numeric HTTP status code
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    pub(crate) fn from_response(response: &Response) -> Self {
        let headers = response.headers();
        Self {
            status: response.status(),
            etag: header_string(headers, ETAG.as_str()),
            last_modified: header_string(headers, LAST_MODIFIED.as_str()),
            request_id: header_string(headers, X_MS_REQUEST_ID),
        }
    }
}

/// Outcome of a successful delete call
#[derive(Debug, Clone)]
pub struct DeletedResponse {
    /// HTTP status, 202 on success
    pub status: StatusCode,
    /// Service request id
    pub request_id: Option<String>,
}

impl DeletedResponse {
    /// Numeric HTTP status code
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    pub(crate) fn from_response(response: &Response) -> Self {
        Self {
            status: response.status(),
            request_id: header_string(response.headers(), X_MS_REQUEST_ID),
        }
    }
}

/// Properties returned by a HEAD on a file
#[derive(Debug, Clone)]
pub struct FileProperties {
    /// Size of the file in bytes
    pub content_length: u64,
    /// Stored HTTP headers
    pub http_headers: FileHttpHeaders,
    /// Stored metadata, keys without the `x-ms-meta-` prefix
    pub metadata: Metadata,
    /// Current `ETag`
    pub etag: Option<String>,
}

impl FileProperties {
    pub(crate) fn from_response(response: &Response) -> Self {
        let headers = response.headers();
        let metadata = headers
            .iter()
            .filter_map(|(name, value)| {
                let key = name.as_str().strip_prefix(META_PREFIX)?;
                Some((key.to_string(), value.to_str().ok()?.to_string()))
            })
            .collect();

        Self {
            content_length: header_string(headers, CONTENT_LENGTH.as_str())
                .and_then(|len| len.parse().ok())
                .unwrap_or_default(),
            http_headers: FileHttpHeaders::from_response_headers(headers),
            metadata,
            etag: header_string(headers, ETAG.as_str()),
        }
    }
}

pub(crate) fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
