//! HTTP clients for the identity provider, object storage and payment processor,
//! exercised against wiremock servers.

use serde_json::json;
use turfy_admin::integrations::{
    CloudinaryStorage, ConnectedAccountRequest, IdentityProvider, IdentityToolkitClient,
    ObjectStorage, PaymentProcessor, StripeClient, UploadObject, UpstreamError,
};
use uuid::Uuid;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn identity_lookup_by_email_returns_first_account() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/projects/turfy-test/accounts:lookup"))
        .and(header("authorization", "Bearer svc-token"))
        .and(body_string_contains("ada@turfy.io"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [{"localId": "uid-ada", "email": "ada@turfy.io"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = IdentityToolkitClient::new(
        server.uri(),
        Some("turfy-test".to_string()),
        Some("svc-token".to_string()),
    );
    let user = client.find_user_by_email("ada@turfy.io").await.unwrap().unwrap();

    assert_eq!(user.uid, "uid-ada");
    assert_eq!(user.email.as_deref(), Some("ada@turfy.io"));
}

#[tokio::test]
async fn identity_lookup_without_accounts_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/projects/turfy-test/accounts:lookup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = IdentityToolkitClient::new(
        server.uri(),
        Some("turfy-test".to_string()),
        Some("svc-token".to_string()),
    );

    assert!(client.find_user_by_email("nobody@turfy.io").await.unwrap().is_none());

    // A token that resolves to no account is an error, not an anonymous user
    let err = client.verify_id_token("id-token").await.unwrap_err();
    assert!(matches!(err, UpstreamError::MalformedResponse { .. }));
}

#[tokio::test]
async fn identity_errors_carry_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("x".repeat(2048)))
        .mount(&server)
        .await;

    let client = IdentityToolkitClient::new(
        server.uri(),
        Some("turfy-test".to_string()),
        Some("svc-token".to_string()),
    );
    let err = client.find_user_by_email("ada@turfy.io").await.unwrap_err();

    assert_eq!(err.status(), Some(403));
    assert_eq!(err.service(), "identity provider");
    let UpstreamError::Status { body, .. } = err else {
        panic!("expected status error");
    };
    assert_eq!(body.len(), 512);
}

#[tokio::test]
async fn storage_rename_is_signed_and_invalidates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1_1/turfy/image/rename"))
        .and(body_string_contains("from_public_id=venues%2Ftemp%2Fa"))
        .and(body_string_contains("to_public_id=venues%2Fv1%2Fa"))
        .and(body_string_contains("invalidate=true"))
        .and(body_string_contains("api_key=key"))
        .and(body_string_contains("signature="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "public_id": "venues/v1/a",
            "secure_url": "https://res.cloudinary.test/turfy/venues/v1/a.jpg"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let storage = CloudinaryStorage::new(
        server.uri(),
        Some("turfy".to_string()),
        Some("key".to_string()),
        Some("secret".to_string()),
    );
    let moved = storage.rename("venues/temp/a", "venues/v1/a").await.unwrap();

    assert_eq!(moved.storage_key, "venues/v1/a");
    assert_eq!(moved.url, "https://res.cloudinary.test/turfy/venues/v1/a.jpg");
}

#[tokio::test]
async fn storage_upload_posts_multipart_into_folder() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1_1/turfy/auto/upload"))
        .and(body_string_contains("venues/temp"))
        .and(body_string_contains("image-bytes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "public_id": "venues/temp/abc",
            "secure_url": "https://res.cloudinary.test/turfy/venues/temp/abc.jpg"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let storage = CloudinaryStorage::new(
        server.uri(),
        Some("turfy".to_string()),
        Some("key".to_string()),
        Some("secret".to_string()),
    );
    let stored = storage
        .upload(UploadObject {
            folder: "venues/temp".to_string(),
            file_name: "pitch.jpg".to_string(),
            content_type: Some("image/jpeg".to_string()),
            bytes: b"image-bytes".to_vec(),
        })
        .await
        .unwrap();

    assert_eq!(stored.storage_key, "venues/temp/abc");
}

#[tokio::test]
async fn payment_account_request_carries_company_and_metadata() {
    let server = MockServer::start().await;
    let venue_id = Uuid::new_v4();
    let owner_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/v1/accounts"))
        .and(header("authorization", "Bearer sk_test_123"))
        .and(body_string_contains("type=standard"))
        .and(body_string_contains("business_type=company"))
        .and(body_string_contains(format!("venueId%5D={venue_id}")))
        .and(body_string_contains("transfers%5D%5Brequested%5D=true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "acct_123"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = StripeClient::new(server.uri(), Some("sk_test_123".to_string()));
    let account = client
        .create_connected_account(&ConnectedAccountRequest {
            email: "olive@turfy.io".to_string(),
            company_name: "Pitch A".to_string(),
            venue_id,
            owner_id,
        })
        .await
        .unwrap();

    assert_eq!(account.id, "acct_123");
}

#[tokio::test]
async fn payment_processor_without_key_is_not_configured() {
    let client = StripeClient::new("http://127.0.0.1:9", None);
    let err = client
        .create_connected_account(&ConnectedAccountRequest {
            email: "olive@turfy.io".to_string(),
            company_name: "Pitch A".to_string(),
            venue_id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, UpstreamError::NotConfigured { service: "payment processor" }));
}
