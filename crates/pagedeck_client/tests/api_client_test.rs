//! Tests for the remote call layer and the typed backend operations.

use pagedeck_client::testing::MockTransport;
use pagedeck_client::{
    AlaiApi, ApiClient, ApiRequest, Auth, Credentials, Method, RequestBody,
};
use pagedeck_core::AuditLog;
use pagedeck_error::ApiErrorKind;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

fn credentials() -> Credentials {
    Credentials {
        api_key: "key-123".to_string(),
        email: "user@example.com".to_string(),
        password: "hunter2".to_string(),
    }
}

#[tokio::test]
async fn test_non_200_status_is_failure_with_one_entry() {
    let transport = MockTransport::new();
    transport.respond(Method::Get, "/get-presentations-list", 500, r#"{"detail":"boom"}"#);
    let api = AlaiApi::new(Arc::new(transport));
    let mut audit = AuditLog::new();

    let err = api
        .list_presentations(&mut audit, "tok")
        .await
        .expect_err("500 must fail");

    assert!(matches!(err.kind, ApiErrorKind::Status { status: 500, .. }));
    assert_eq!(audit.len(), 1);
    let entry = &audit.entries()[0];
    assert_eq!(entry.step(), "get_existing_presentations");
    assert!(!entry.success());
    assert_eq!(entry.data(), &json!({"detail": "boom"}));
    assert_eq!(
        entry.error().as_deref(),
        Some(r#"Status 500: {"detail":"boom"}"#)
    );
}

#[tokio::test]
async fn test_status_201_is_still_a_failure() {
    let transport = MockTransport::new();
    transport.respond(Method::Post, "/create-new-presentation", 201, "{}");
    let api = AlaiApi::new(Arc::new(transport));
    let mut audit = AuditLog::new();

    let result = api.create_presentation(&mut audit, "tok", "p-1").await;

    assert!(result.is_err());
    assert!(!audit.entries()[0].success());
}

#[tokio::test]
async fn test_empty_body_is_empty_object() -> anyhow::Result<()> {
    let transport = MockTransport::new();
    transport.respond(Method::Post, "/set-active-variant", 200, "  ");
    let api = AlaiApi::new(Arc::new(transport));
    let mut audit = AuditLog::new();

    let body = api.set_active_variant(&mut audit, "tok", "s-1", "v-1").await?;

    assert_eq!(body, json!({}));
    assert!(audit.entries()[0].success());
    Ok(())
}

#[tokio::test]
async fn test_unparseable_body_is_failure() {
    let transport = MockTransport::new();
    transport.respond(Method::Post, "/update-slide-entity", 200, "<html>");
    let api = AlaiApi::new(Arc::new(transport));
    let mut audit = AuditLog::new();

    let err = api
        .update_slide_entity(&mut audit, "tok", json!({"id": "s"}))
        .await
        .expect_err("html is not json");

    assert!(matches!(err.kind, ApiErrorKind::Parse(_)));
    assert_eq!(audit.len(), 1);
    assert!(!audit.entries()[0].success());
}

#[tokio::test]
async fn test_transport_error_is_recorded_as_exception() {
    let transport = MockTransport::new();
    transport.fail(Method::Get, "/get-presentation/", "connection reset");
    let api = AlaiApi::new(Arc::new(transport));
    let mut audit = AuditLog::new();

    let err = api
        .first_slide_id(&mut audit, "tok", "p-1")
        .await
        .expect_err("transport failure");

    assert!(matches!(err.kind, ApiErrorKind::Transport(_)));
    let entry = &audit.entries()[0];
    assert_eq!(
        entry.error().as_deref(),
        Some("Exception during get_presentation_details: connection reset")
    );
}

#[tokio::test]
async fn test_authenticate_sends_api_key_and_returns_token() -> anyhow::Result<()> {
    let transport = MockTransport::new();
    transport.respond(Method::Post, "/auth/v1/token", 200, r#"{"access_token":"abc"}"#);
    let api = AlaiApi::new(Arc::new(transport.clone()));
    let mut audit = AuditLog::new();

    let token = api.authenticate(&mut audit, &credentials()).await?;

    assert_eq!(token, "abc");
    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].header_value("apikey"), Some("key-123"));
    assert!(requests[0].header_value("Authorization").is_none());
    match &requests[0].body {
        RequestBody::Json(body) => {
            assert_eq!(body["email"], "user@example.com");
            assert_eq!(body["gotrue_meta_security"], json!({}));
        }
        other => panic!("unexpected body {:?}", other),
    }
    assert_eq!(audit.steps(), vec!["authentication"]);
    Ok(())
}

#[tokio::test]
async fn test_authenticate_without_token_is_rejected() {
    let transport = MockTransport::new();
    transport.respond(Method::Post, "/auth/v1/token", 200, r#"{"error":"nope"}"#);
    let api = AlaiApi::new(Arc::new(transport));
    let mut audit = AuditLog::new();

    let err = api
        .authenticate(&mut audit, &credentials())
        .await
        .expect_err("missing token");

    assert!(matches!(err.kind, ApiErrorKind::Rejected(_)));
    assert_eq!(audit.len(), 1);
    assert_eq!(audit.entries()[0].data(), &json!({"error": "nope"}));
}

#[tokio::test]
async fn test_bearer_header_on_authenticated_calls() -> anyhow::Result<()> {
    let transport = MockTransport::new();
    transport.respond(
        Method::Get,
        "/get-presentations-list",
        200,
        r#"[{"id":"a"},{"id":"b"},{"name":"no id"}]"#,
    );
    let api = AlaiApi::new(Arc::new(transport.clone()));
    let mut audit = AuditLog::new();

    let ids = api.list_presentations(&mut audit, "tok").await?;

    assert_eq!(ids.len(), 2);
    assert!(ids.contains("a") && ids.contains("b"));
    assert_eq!(
        transport.requests()[0].header_value("authorization"),
        Some("Bearer tok")
    );
    Ok(())
}

#[tokio::test]
async fn test_first_slide_id_rejects_empty_presentation() {
    let transport = MockTransport::new();
    transport.respond(Method::Get, "/get-presentation/p-1", 200, r#"{"slides":[]}"#);
    let api = AlaiApi::new(Arc::new(transport));
    let mut audit = AuditLog::new();

    let err = api
        .first_slide_id(&mut audit, "tok", "p-1")
        .await
        .expect_err("no slides");

    assert!(err.to_string().contains("No slides found in the presentation"));
    assert_eq!(
        audit.entries()[0].error().as_deref(),
        Some("No slides found in the presentation")
    );
}

#[tokio::test]
async fn test_upload_sends_multipart_parts() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let first = dir.path().join("img1.jpg");
    let second = dir.path().join("img2.jpg");
    tokio::fs::write(&first, b"jpeg-one").await?;
    tokio::fs::write(&second, b"jpeg-two").await?;

    let transport = MockTransport::new();
    transport.respond(Method::Post, "/upload-images-for-slide-generation", 200, r#"[{"id":"i1"}]"#);
    let api = AlaiApi::new(Arc::new(transport.clone()));
    let mut audit = AuditLog::new();

    api.upload_images(&mut audit, "tok", "p-1", &[first, second])
        .await?;

    let requests = transport.requests();
    match &requests[0].body {
        RequestBody::Multipart { files, fields } => {
            assert_eq!(files.len(), 2);
            assert!(files.iter().all(|f| f.field == "files" && f.mime == "image/jpeg"));
            assert_eq!(files[0].file_name, "img1.jpg");
            assert_eq!(files[1].bytes, b"jpeg-two".to_vec());
            assert_eq!(fields[0].0, "upload_input");
            let input: serde_json::Value = serde_json::from_str(&fields[0].1)?;
            assert_eq!(input, json!({"presentation_id": "p-1"}));
        }
        other => panic!("unexpected body {:?}", other),
    }
    assert_eq!(audit.steps(), vec!["upload_images_to_presentation"]);
    Ok(())
}

#[tokio::test]
async fn test_upload_missing_file_fails_without_request() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let transport = MockTransport::new();
    let api = AlaiApi::new(Arc::new(transport.clone()));
    let mut audit = AuditLog::new();

    let result = api
        .upload_images(&mut audit, "tok", "p-1", &[dir.path().join("gone.jpg")])
        .await;

    assert!(matches!(result.map_err(|e| e.kind), Err(ApiErrorKind::Upload(_))));
    assert!(transport.requests().is_empty());
    assert_eq!(audit.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_share_code_is_plain_text() -> anyhow::Result<()> {
    let transport = MockTransport::new();
    transport.respond(Method::Post, "/upsert-presentation-share", 200, "\"XYZ\"\n");
    let api = AlaiApi::new(Arc::new(transport));
    let mut audit = AuditLog::new();

    let code = api.share_presentation(&mut audit, "tok", "p-1").await?;

    assert_eq!(code, "XYZ");
    assert_eq!(audit.entries()[0].data(), &json!("XYZ"));
    Ok(())
}

#[tokio::test]
async fn test_accept_closure_controls_outcome() -> anyhow::Result<()> {
    let transport = MockTransport::new();
    transport.respond(Method::Get, "example.test/ok", 200, r#"{"n":3}"#);
    let client = ApiClient::new(Arc::new(transport));
    let mut audit = AuditLog::new();

    let n = client
        .call(
            &mut audit,
            "probe",
            Auth::None,
            ApiRequest::get("https://example.test/ok"),
            |r| r.body["n"].as_i64().ok_or_else(|| "no n".to_string()),
        )
        .await?;
    assert_eq!(n, 3);

    let rejected = client
        .call(
            &mut audit,
            "probe",
            Auth::None,
            ApiRequest::get("https://example.test/ok"),
            |_| Err::<(), _>("not wanted".to_string()),
        )
        .await;
    assert!(rejected.is_err());

    assert_eq!(audit.len(), 2);
    assert!(audit.entries()[0].success());
    assert_eq!(audit.entries()[1].error().as_deref(), Some("not wanted"));
    Ok(())
}

#[tokio::test]
async fn test_unrouted_request_is_404() {
    let client = ApiClient::new(Arc::new(MockTransport::new()));
    let mut audit = AuditLog::new();

    let err = client
        .call_json(&mut audit, "probe", Auth::None, ApiRequest::get("https://nowhere.test"))
        .await
        .expect_err("no route");

    assert!(matches!(err.kind, ApiErrorKind::Status { status: 404, .. }));
}
