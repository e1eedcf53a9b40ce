use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use dataroom::billing::Billing;
use dataroom::dataroom::Dataroom;
use dataroom::router::{AppState, app_router, cookie_key};

const COOKIE: &str = "sessionId=test";

async fn test_app(dir: &tempfile::TempDir) -> Router {
    let db_path = dir.path().join("test.sqlite");
    let url = format!("sqlite:{}", db_path.display());
    let store = dataroom::db::connect(&url).await.expect("connect scratch db");

    let http = reqwest::Client::new();
    let state = AppState::new(
        store,
        Dataroom::new(dir.path().join("dataroom")),
        Billing::disabled(http.clone()),
        http,
        cookie_key(),
    );
    app_router(state)
}

async fn json_body(resp: axum::response::Response) -> Value {
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn upload_then_list_then_read_results() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir).await;

    let boundary = "dataroom-test-boundary";
    let multipart = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"project\"\r\n\r\n\
         acme\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"files\"; filename=\"notes.txt\"\r\n\
         Content-Type: text/plain\r\n\r\n\
         hello\r\n\
         --{boundary}--\r\n"
    );

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/files/upload")
                .header(header::COOKIE, COOKIE)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(multipart))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let payload = json_body(resp).await;
    assert_eq!(payload["message"], "Files uploaded successfully");
    assert_eq!(payload["uploadedFiles"].as_array().unwrap().len(), 1);

    let uploaded = dir.path().join("dataroom").join("acme").join("notes.txt");
    assert_eq!(std::fs::read_to_string(uploaded).unwrap(), "hello");

    // a generated result file shows up in the listing and is readable
    let results = dir.path().join("dataroom").join("acme").join("results");
    std::fs::create_dir_all(&results).unwrap();
    std::fs::write(results.join("summary.md"), "all good").unwrap();

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/projects")
                .header(header::COOKIE, COOKIE)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let payload = json_body(resp).await;
    assert_eq!(payload[0]["name"], "acme");
    assert_eq!(payload[0]["files"][0], "summary.md");

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/files/acme/summary.md")
                .header(header::COOKIE, COOKIE)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let payload = json_body(resp).await;
    assert_eq!(payload["fileContents"], "all good");
}

#[tokio::test]
async fn create_and_delete_project() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir).await;

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/projects")
                .header(header::COOKIE, COOKIE)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"name":"acme"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(dir.path().join("dataroom").join("acme").is_dir());

    let resp = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/projects/acme")
                .header(header::COOKIE, COOKIE)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(!dir.path().join("dataroom").join("acme").exists());
}

#[tokio::test]
async fn traversal_names_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir).await;

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/files/..%2F..%2Fetc/passwd")
                .header(header::COOKIE, COOKIE)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_result_file_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir).await;

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/files/acme/absent.md")
                .header(header::COOKIE, COOKIE)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
