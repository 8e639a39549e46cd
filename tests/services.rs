use mintscan_cli::files::validate_files;
use mintscan_cli::listing::{filter_by_status, sort_by_date, statistics};
use mintscan_cli::models::{DocumentType, ProcessStatus, VehicleCategory};
use mintscan_cli::{
    ApiClient, AuthService, Config, ErrorKind, ListService, ProcessService, SubmitOptions,
};
use mockito::Matcher;
use serde_json::json;
use std::fs;
use tempfile::TempDir;
use uuid::Uuid;

fn client_for(server: &mockito::ServerGuard) -> ApiClient {
    ApiClient::new(&Config::new(server.url())).unwrap()
}

#[test]
fn login_returns_token() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/login")
        .match_body(Matcher::Json(json!({"username": "station1", "password": "s3cret!!"})))
        .with_status(200)
        .with_body(r#"{"token":"eyJhbGciOi"}"#)
        .create();

    let token = AuthService::new(client_for(&server))
        .login("station1", "s3cret!!")
        .unwrap();
    assert_eq!(token, "eyJhbGciOi");
    mock.assert();
}

#[test]
fn login_with_blank_credentials_never_calls_the_service() {
    let mut server = mockito::Server::new();
    let mock = server.mock("POST", "/login").expect(0).create();
    let auth = AuthService::new(client_for(&server));

    let err = auth.login("station1", "").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    let err = auth.login("   ", "s3cret!!").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    let err = auth.login("station1", " \t").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    mock.assert();
}

#[test]
fn login_without_token_in_response_fails() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/login")
        .with_status(200)
        .with_body("{}")
        .create();

    let err = AuthService::new(client_for(&server))
        .login("station1", "s3cret!!")
        .unwrap_err();
    assert!(err.is_api());
    assert_eq!(err.to_string(), "no token in response");
}

#[test]
fn login_with_empty_token_fails() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/login")
        .with_status(200)
        .with_body(r#"{"token":""}"#)
        .create();

    let err = AuthService::new(client_for(&server))
        .login("station1", "s3cret!!")
        .unwrap_err();
    assert_eq!(err.to_string(), "no token in response");
}

#[test]
fn login_rejected_credentials_propagate_unchanged() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/login")
        .with_status(401)
        .with_body(r#"{"title":"Unauthorized","detail":"bad password","code":"INVALID_CREDENTIALS","status":401}"#)
        .create();

    let err = AuthService::new(client_for(&server))
        .login("station1", "wrong-pass")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Api);
    assert_eq!(err.to_string(), "invalid credentials");
    assert_eq!(err.detail(), Some("bad password"));
}

#[test]
fn submit_multiple_sends_only_valid_files() {
    let dir = TempDir::new().unwrap();
    let front = dir.path().join("front.jpg");
    let back = dir.path().join("back.png");
    let notes = dir.path().join("notes.txt");
    fs::write(&front, [0u8, 1, 2]).unwrap();
    fs::write(&back, b"png").unwrap();
    fs::write(&notes, b"text").unwrap();

    let validation = validate_files(&[&front, &notes, &back]);
    assert_eq!(validation.valid_files.len(), 2);
    assert_eq!(validation.errors.len(), 1);

    let id = Uuid::parse_str("731cb083-7d83-4ce7-a0ce-1a3b19b7e422").unwrap();
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/process/pool")
        .match_header("authorization", "Bearer tok")
        .match_body(Matcher::Json(json!({
            "id": id.to_string(),
            "type": "coc",
            "category": "M1",
            "images": [
                {"base64": "AAEC", "fileName": "front.jpg", "fileType": "image/jpeg"},
                {"base64": "cG5n", "fileName": "back.png", "fileType": "image/png"}
            ],
            "name": "Batch 7"
        })))
        .with_status(200)
        .with_body(json!({"success": true, "id": id.to_string(), "message": "queued"}).to_string())
        .create();

    let options = SubmitOptions {
        name: Some("Batch 7".into()),
        extract_accuracy: false,
        process_id: Some(id),
    };
    let response = ProcessService::new(client_for(&server))
        .submit_multiple(
            "tok",
            &validation.valid_files,
            DocumentType::Coc,
            VehicleCategory::M1,
            &options,
        )
        .unwrap();
    assert!(response.success);
    assert_eq!(response.id, id.to_string());
    mock.assert();
}

#[test]
fn submit_single_generates_an_id() {
    let dir = TempDir::new().unwrap();
    let scan = dir.path().join("scan.pdf");
    fs::write(&scan, b"%PDF").unwrap();

    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/process/pool")
        .match_body(Matcher::PartialJson(json!({
            "type": "titv-new",
            "category": "N1",
            "extractAccuracy": true
        })))
        .with_status(200)
        .with_body(r#"{"success":true,"id":"generated","message":"queued"}"#)
        .create();

    let options = SubmitOptions {
        extract_accuracy: true,
        ..Default::default()
    };
    let response = ProcessService::new(client_for(&server))
        .submit_single("tok", &scan, DocumentType::TitvNew, VehicleCategory::N1, &options)
        .unwrap();
    assert_eq!(response.message, "queued");
    mock.assert();
}

#[test]
fn submit_with_no_encodable_file_makes_no_request() {
    let dir = TempDir::new().unwrap();
    let notes = dir.path().join("notes.txt");
    fs::write(&notes, b"text").unwrap();

    let mut server = mockito::Server::new();
    let mock = server.mock("POST", "/process/pool").expect(0).create();

    let err = ProcessService::new(client_for(&server))
        .submit_multiple(
            "tok",
            &[&notes],
            DocumentType::Coc,
            VehicleCategory::M1,
            &SubmitOptions::default(),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    mock.assert();
}

#[test]
fn retrieve_not_processed_document() {
    let id = Uuid::new_v4();
    let mut server = mockito::Server::new();
    server
        .mock("GET", format!("/process/{}", id).as_str())
        .match_header("authorization", "Bearer tok")
        .with_status(422)
        .with_body(r#"{"code":"DOCUMENT_NOT_PROCESSED","detail":"status RECOGNIZING"}"#)
        .create();

    let err = ProcessService::new(client_for(&server))
        .retrieve("tok", id)
        .unwrap_err();
    assert_eq!(err.to_string(), "document not yet processed");
    assert_eq!(err.detail(), Some("status RECOGNIZING"));
}

#[test]
fn retrieve_completed_document() {
    let id = Uuid::new_v4();
    let mut server = mockito::Server::new();
    server
        .mock("GET", format!("/process/{}", id).as_str())
        .with_status(200)
        .with_body(
            json!({
                "id": id.to_string(),
                "documentId": "doc-9",
                "license": {"id": "l", "code": "C", "customerId": "cu", "itv": "ITV-4"},
                "technicalCard": {
                    "type": "coc",
                    "category": "M1",
                    "model": "Ibiza",
                    "vehicleLicense": null,
                    "vin": "VSSZZZ6JZ",
                    "ict": null,
                    "data": {"E": "VSSZZZ6JZ", "F.1": "1550", "accuracy": 0.93, "reformas": []}
                },
                "status": "COMPLETED",
                "createdAt": "2024-05-01T10:00:00Z",
                "updatedAt": "2024-05-01T10:02:00Z"
            })
            .to_string(),
        )
        .create();

    let doc = ProcessService::new(client_for(&server))
        .retrieve("tok", id)
        .unwrap();
    assert_eq!(doc.status, ProcessStatus::Completed);
    assert_eq!(doc.technical_card.data.section("F.1"), Some("1550"));
    assert_eq!(doc.technical_card.data.reformas, Some(vec![]));
}

#[test]
fn abort_posts_without_body() {
    let id = Uuid::new_v4();
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", format!("/process/pool/abort/{}", id).as_str())
        .match_header("authorization", "Bearer tok")
        .match_body("")
        .with_status(200)
        .with_body(r#"{"success":true,"message":"aborted"}"#)
        .create();

    let response = ProcessService::new(client_for(&server))
        .abort("tok", id)
        .unwrap();
    assert!(response.success);
    assert_eq!(response.message, "aborted");
    mock.assert();
}

fn listing_body() -> String {
    let doc = |id: &str, status: &str, itv: &str, created: &str| {
        json!({
            "id": id,
            "license": {"id": "l", "code": "C", "customerId": "cu", "itv": itv},
            "technicalCard": {"type": "coc", "category": "M1", "model": "Ibiza"},
            "status": status,
            "documentId": null,
            "createdAt": created,
            "updatedAt": created
        })
    };
    json!({
        "processDocuments": [
            doc("a", "COMPLETED", "ITV-1", "2024-01-10T08:00:00Z"),
            doc("b", "PENDING", "ITV-1", "2024-03-10T08:00:00Z"),
            doc("c", "COMPLETED", "ITV-2", "2024-02-10T08:00:00Z"),
            doc("d", "FAILED", "ITV-2", "2024-04-10T08:00:00Z"),
            doc("e", "COMPLETED", "ITV-1", "2024-05-10T08:00:00Z")
        ]
    })
    .to_string()
}

#[test]
fn list_filter_completed_newest_first() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/process")
        .match_header("authorization", "Bearer tok")
        .with_status(200)
        .with_body(listing_body())
        .create();

    let docs = ListService::new(client_for(&server)).list("tok").unwrap();
    assert_eq!(docs.len(), 5);

    let completed = sort_by_date(&filter_by_status(&docs, ProcessStatus::Completed), true, true);
    let ids: Vec<_> = completed.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, ["e", "c", "a"]);

    let stats = statistics(&docs);
    assert_eq!(stats.total, 5);
    assert_eq!(stats.by_status[&ProcessStatus::Completed], 3);
    assert_eq!(stats.by_itv["ITV-2"], 2);
}

#[test]
fn list_without_documents_field_is_empty() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/process")
        .with_status(200)
        .with_body("{}")
        .create();

    let docs = ListService::new(client_for(&server)).list("tok").unwrap();
    assert!(docs.is_empty());
}

#[test]
fn list_with_expired_token() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/process")
        .with_status(401)
        .with_body(r#"{"code":"EXPIRED_TOKEN"}"#)
        .create();

    let err = ListService::new(client_for(&server))
        .list("old")
        .unwrap_err();
    assert_eq!(err.to_string(), "token invalid or expired");
    assert_eq!(err.status(), Some(401));
}
