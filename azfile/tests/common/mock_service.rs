use azfile::{Pipeline, PipelineOptions, ServiceUrl, SharedKeyCredential};
use url::Url;
use wiremock::{MockServer, Request, ResponseTemplate};

/// Account the mock service pretends to serve
pub const TEST_ACCOUNT: &str = "devaccount";
/// "Jefe", base64 encoded
pub const TEST_KEY: &str = "SmVmZQ==";

/// Mock File service plus a signed service handle pointing at it
pub struct MockFileService {
    pub server: MockServer,
    pub fsu: ServiceUrl,
}

impl MockFileService {
    pub async fn start() -> Self {
        azfile::testing::setup_test_env();

        let server = MockServer::start().await;
        let credential =
            SharedKeyCredential::new(TEST_ACCOUNT, TEST_KEY).expect("Failed to build credential");
        let pipeline = Pipeline::new(credential, PipelineOptions::default());
        let endpoint = Url::parse(&server.uri()).expect("Mock server URI is not a URL");

        Self {
            server,
            fsu: ServiceUrl::new(endpoint, pipeline),
        }
    }

    /// Requests received so far, in arrival order
    pub async fn requests(&self) -> Vec<Request> {
        self.server
            .received_requests()
            .await
            .expect("Request recording is disabled")
    }
}

/// 201 response as the service returns it for create calls
pub fn created() -> ResponseTemplate {
    ResponseTemplate::new(201)
        .insert_header("etag", "\"0x8D9A1B2C3D4E5F6\"")
        .insert_header("last-modified", "Mon, 19 Oct 2026 10:00:00 GMT")
        .insert_header("x-ms-request-id", "00000000-0000-0000-0000-000000000001")
}

/// Error response carrying a service code and an XML error document
pub fn service_error(status: u16, code: &str) -> ResponseTemplate {
    ResponseTemplate::new(status)
        .insert_header("x-ms-error-code", code)
        .insert_header("x-ms-request-id", "00000000-0000-0000-0000-000000000002")
        .set_body_string(format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?><Error><Code>{code}</Code><Message>mock</Message></Error>"
        ))
}

/// Value of a request header, or an empty string
pub fn header<'a>(request: &'a Request, name: &str) -> &'a str {
    request
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}
