mod common;

use common::*;

use azfile::testing::{
    create_new_share, create_new_share_with_prefix, delete_share, get_share_url,
    validate_storage_error, SHARE_PREFIX,
};
use azfile::ServiceCode;
use pretty_assertions::assert_eq;
use wiremock::matchers::{header_exists, method, path_regex, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_get_share_url_makes_no_request() {
    let mock = MockFileService::start().await;

    let (share, name) = get_share_url(&mock.fsu);

    assert_eq!(share.name(), name);
    assert!(name.starts_with(SHARE_PREFIX));
    assert!(mock.requests().await.is_empty());
}

#[tokio::test]
async fn test_create_new_share() {
    let mock = MockFileService::start().await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/rs[a-z0-9]+$"))
        .and(query_param("restype", "share"))
        .and(header_exists("authorization"))
        .respond_with(created())
        .expect(1)
        .mount(&mock.server)
        .await;

    let (share, name) = create_new_share(&mock.fsu).await;

    assert_eq!(share.name(), name);
    assert!(name.starts_with("rscreatenewshare"));

    let requests = mock.requests().await;
    let request = &requests[0];
    assert_eq!(request.url.path(), format!("/{name}"));
    assert!(header(request, "authorization").starts_with("SharedKey devaccount:"));
    assert_eq!(header(request, "x-ms-version"), "2019-02-02");
    assert!(!header(request, "x-ms-date").is_empty());
    assert!(request.headers.get("x-ms-share-quota").is_none());
}

#[tokio::test]
async fn test_create_new_share_with_prefix() {
    let mock = MockFileService::start().await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/customprefix[a-z0-9]+$"))
        .respond_with(created())
        .expect(1)
        .mount(&mock.server)
        .await;

    let (share, name) = create_new_share_with_prefix(&mock.fsu, "customprefix").await;

    assert!(name.starts_with("customprefix"));
    assert_eq!(share.name(), name);
}

#[tokio::test]
async fn test_create_existing_share_is_a_conflict() {
    let mock = MockFileService::start().await;
    Mock::given(method("PUT"))
        .and(query_param("restype", "share"))
        .respond_with(created())
        .up_to_n_times(1)
        .mount(&mock.server)
        .await;
    Mock::given(method("PUT"))
        .and(query_param("restype", "share"))
        .respond_with(service_error(409, ServiceCode::SHARE_ALREADY_EXISTS))
        .mount(&mock.server)
        .await;

    let (share, _) = create_new_share(&mock.fsu).await;
    let result = share.create(None, 0).await;

    let err = result.as_ref().unwrap_err();
    assert!(err.is_conflict());
    assert!(err.to_string().contains(ServiceCode::SHARE_ALREADY_EXISTS));
    validate_storage_error(&result, ServiceCode::SHARE_ALREADY_EXISTS);
}

#[tokio::test]
async fn test_share_create_sends_quota_and_metadata() {
    let mock = MockFileService::start().await;
    Mock::given(method("PUT"))
        .respond_with(created())
        .mount(&mock.server)
        .await;

    let (share, _) = get_share_url(&mock.fsu);
    let response = share
        .create(Some(&azfile::testing::basic_metadata()), 10)
        .await
        .unwrap();

    assert_eq!(response.status_code(), 201);
    assert_eq!(response.etag.as_deref(), Some("\"0x8D9A1B2C3D4E5F6\""));
    assert_eq!(
        response.request_id.as_deref(),
        Some("00000000-0000-0000-0000-000000000001")
    );

    let requests = mock.requests().await;
    assert_eq!(header(&requests[0], "x-ms-share-quota"), "10");
    assert_eq!(header(&requests[0], "x-ms-meta-foo"), "bar");
}

#[tokio::test]
#[should_panic(expected = "failed to create share")]
async fn test_create_new_share_panics_on_service_error() {
    let mock = MockFileService::start().await;
    Mock::given(method("PUT"))
        .respond_with(service_error(403, ServiceCode::AUTHENTICATION_FAILED))
        .mount(&mock.server)
        .await;

    let _ = create_new_share(&mock.fsu).await;
}

#[tokio::test]
async fn test_delete_share() {
    let mock = MockFileService::start().await;
    Mock::given(method("DELETE"))
        .and(query_param("restype", "share"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock.server)
        .await;

    let (share, _) = get_share_url(&mock.fsu);
    let response = share.delete().await.unwrap();

    assert_eq!(response.status_code(), 202);
    let requests = mock.requests().await;
    assert_eq!(header(&requests[0], "x-ms-delete-snapshots"), "include");
}

#[tokio::test]
async fn test_delete_share_tolerates_missing_share() {
    let mock = MockFileService::start().await;
    Mock::given(method("DELETE"))
        .respond_with(service_error(404, ServiceCode::SHARE_NOT_FOUND))
        .expect(2)
        .mount(&mock.server)
        .await;

    let (share, _) = get_share_url(&mock.fsu);
    delete_share(&share).await;

    let result = share.delete().await;
    validate_storage_error(&result, ServiceCode::SHARE_NOT_FOUND);
}
