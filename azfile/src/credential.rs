//! Shared Key authorization for the File service

use std::collections::BTreeMap;
use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::header::{
    HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_ENCODING, CONTENT_LANGUAGE, CONTENT_LENGTH,
    CONTENT_TYPE, IF_MATCH, IF_MODIFIED_SINCE, IF_NONE_MATCH, IF_UNMODIFIED_SINCE, RANGE,
};
use reqwest::Request;
use sha2::Sha256;

use crate::error::{StorageError, StorageResult};

type HmacSha256 = Hmac<Sha256>;

/// REST API version stamped on every request
pub const SERVICE_VERSION: &str = "2019-02-02";

const X_MS_DATE: &str = "x-ms-date";
const X_MS_VERSION: &str = "x-ms-version";
const X_MS_PREFIX: &str = "x-ms-";
const CONTENT_MD5: &str = "content-md5";

/// Storage account name plus its decoded access key
#[derive(Clone)]
pub struct SharedKeyCredential {
    account_name: String,
    account_key: Vec<u8>,
}

// Keep the key out of logs
impl fmt::Debug for SharedKeyCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedKeyCredential")
            .field("account_name", &self.account_name)
            .finish_non_exhaustive()
    }
}

impl SharedKeyCredential {
    /// Creates a credential from an account name and a base64 account key
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Config` if the name is empty or the key is not valid base64
    pub fn new(account_name: &str, account_key: &str) -> StorageResult<Self> {
        if account_name.is_empty() {
            return Err(StorageError::Config(
                "account name must not be empty".to_string(),
            ));
        }

        let account_key = STANDARD
            .decode(account_key.trim())
            .map_err(|e| StorageError::Config(format!("account key is not valid base64: {e}")))?;

        Ok(Self {
            account_name: account_name.to_string(),
            account_key,
        })
    }

    /// The storage account this credential signs for
    #[must_use]
    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    /// Computes `base64(HMAC-SHA256(key, string_to_sign))`
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Config` if the key cannot seed the MAC
    pub fn sign(&self, string_to_sign: &str) -> StorageResult<String> {
        let mut mac = HmacSha256::new_from_slice(&self.account_key)
            .map_err(|e| StorageError::Config(format!("invalid account key: {e}")))?;
        mac.update(string_to_sign.as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }

    /// Stamps date and version headers and adds the `SharedKey` authorization header
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Config` if signing fails
    pub fn authorize(&self, request: &mut Request) -> StorageResult<()> {
        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let headers = request.headers_mut();
        headers.insert(X_MS_DATE, header_value(&date)?);
        headers.insert(X_MS_VERSION, HeaderValue::from_static(SERVICE_VERSION));

        let signature = self.sign(&self.string_to_sign(request))?;
        let authorization = format!("SharedKey {}:{signature}", self.account_name);
        request
            .headers_mut()
            .insert(AUTHORIZATION, header_value(&authorization)?);

        Ok(())
    }

    pub(crate) fn string_to_sign(&self, request: &Request) -> String {
        let headers = request.headers();

        let content_length = match header_str(headers, CONTENT_LENGTH.as_str()) {
            "0" => "",
            other => other,
        };

        [
            request.method().as_str(),
            header_str(headers, CONTENT_ENCODING.as_str()),
            header_str(headers, CONTENT_LANGUAGE.as_str()),
            content_length,
            header_str(headers, CONTENT_MD5),
            header_str(headers, CONTENT_TYPE.as_str()),
            // x-ms-date takes precedence over Date
            "",
            header_str(headers, IF_MODIFIED_SINCE.as_str()),
            header_str(headers, IF_MATCH.as_str()),
            header_str(headers, IF_NONE_MATCH.as_str()),
            header_str(headers, IF_UNMODIFIED_SINCE.as_str()),
            header_str(headers, RANGE.as_str()),
        ]
        .join("\n")
            + "\n"
            + &canonicalized_headers(headers)
            + &self.canonicalized_resource(request.url())
    }

    fn canonicalized_resource(&self, url: &url::Url) -> String {
        let mut resource = format!("/{}{}", self.account_name, url.path());

        let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in url.query_pairs() {
            params
                .entry(name.to_lowercase())
                .or_default()
                .push(value.into_owned());
        }

        for (name, mut values) in params {
            values.sort();
            resource.push('\n');
            resource.push_str(&name);
            resource.push(':');
            resource.push_str(&values.join(","));
        }

        resource
    }
}

fn canonicalized_headers(headers: &HeaderMap) -> String {
    let mut ms_headers: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (name, value) in headers {
        let name = name.as_str();
        if name.starts_with(X_MS_PREFIX) {
            ms_headers
                .entry(name)
                .or_default()
                .push(value.to_str().unwrap_or_default().trim());
        }
    }

    ms_headers
        .into_iter()
        .map(|(name, values)| format!("{name}:{}\n", values.join(",")))
        .collect()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

fn header_value(value: &str) -> StorageResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| StorageError::InvalidInput(format!("invalid header value {value:?}: {e}")))
}
