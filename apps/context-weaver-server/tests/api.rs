//! HTTP endpoint integration tests using axum-test

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::{TestRequest, TestServer};
use serde_json::{json, Value};

use context_weaver_server::config::Config;
use context_weaver_server::db::create_memory_pool;
use context_weaver_server::state::AppState;
use context_weaver_server::store::SqliteStore;

const FOX: &str = "The quick brown fox jumps over the lazy dog";

async fn create_test_server() -> TestServer {
    create_test_server_with(Config::default()).await
}

async fn create_test_server_with(config: Config) -> TestServer {
    let pool = create_memory_pool().await.unwrap();
    let state = AppState::new(config, Arc::new(SqliteStore::new(pool)));
    TestServer::new(context_weaver_server::app(state)).unwrap()
}

fn small_document_config(max_document_bytes: usize) -> Config {
    let mut config = Config::default();
    config.documents.max_document_bytes = max_document_bytes;
    config
}

fn multipart_body(boundary: &str, file_name: &str, content: &[u8]) -> Bytes {
    let mut body = format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\n\
         Content-Type: text/plain\r\n\r\n",
        b = boundary,
        f = file_name
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    Bytes::from(body)
}

fn as_user(request: TestRequest, user: &str) -> TestRequest {
    request.add_header(
        HeaderName::from_static("x-user-id"),
        HeaderValue::from_str(user).unwrap(),
    )
}

async fn create_document(server: &TestServer, user: &str, title: &str, content: &str, tags: &[&str]) -> String {
    let response = as_user(server.post("/api/v1/documents"), user)
        .json(&json!({ "title": title, "content": content, "tags": tags }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json::<Value>()["id"].as_str().unwrap().to_string()
}

async fn create_annotation(server: &TestServer, user: &str, body: Value) -> Value {
    let response = as_user(server.post("/api/v1/annotations"), user).json(&body).await;
    assert_eq!(response.status_code(), StatusCode::CREATED, "{}", response.text());
    response.json::<Value>()
}

fn segment_texts(render: &Value) -> Vec<String> {
    render["segments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["text"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_returns_200() {
    let server = create_test_server().await;
    let response = server.get("/health").await;
    response.assert_status_ok();

    let json = response.json::<Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "context-weaver-server");
}

#[tokio::test]
async fn test_missing_user_header_is_unauthorized() {
    let server = create_test_server().await;
    let response = server.get("/api/v1/documents").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"], "unauthorized");
}

#[tokio::test]
async fn test_render_quick_brown_fox() {
    let server = create_test_server().await;
    let doc = create_document(&server, "user-a", "Fox", "The quick brown fox", &[]).await;

    let annotation = create_annotation(
        &server,
        "user-a",
        json!({ "document_id": doc, "position_start": 4, "position_end": 9, "color": "green", "content": "fast" }),
    )
    .await;
    assert_eq!(annotation["highlighted_text"], "quick");

    let response = as_user(server.get(&format!("/api/v1/documents/{}/render", doc)), "user-a").await;
    response.assert_status_ok();
    let render = response.json::<Value>();

    assert_eq!(segment_texts(&render), vec!["The ", "quick", " brown fox"]);
    assert_eq!(render["length"], 19);
    let segments = render["segments"].as_array().unwrap();
    assert_eq!(segments[0]["highlighted"], false);
    assert_eq!(segments[1]["highlighted"], true);
    assert_eq!(segments[1]["color"], "green");
    assert_eq!(segments[1]["annotation"]["id"], annotation["id"]);

    let html = as_user(
        server.get(&format!("/api/v1/documents/{}/render?format=html", doc)),
        "user-a",
    )
    .await;
    html.assert_status_ok();
    let text = html.text();
    assert!(text.starts_with("The <mark class=\"cw-highlight cw-highlight-green\""));
    assert!(text.ends_with("quick</mark> brown fox"));
}

#[tokio::test]
async fn test_selection_round_trip_creates_annotation() {
    let server = create_test_server().await;
    let doc = create_document(&server, "user-a", "Fox", FOX, &[]).await;
    create_annotation(
        &server,
        "user-a",
        json!({ "document_id": doc, "position_start": 4, "position_end": 9 }),
    )
    .await;

    // Rendered runs: "The " | "quick" | " brown fox jumps over the lazy dog".
    // Select "ick brown" from inside the highlight into the trailing run.
    let response = as_user(
        server.post(&format!("/api/v1/documents/{}/selection", doc)),
        "user-a",
    )
    .json(&json!({ "anchor": { "node": 1, "offset": 2 }, "focus": { "node": 2, "offset": 6 } }))
    .await;
    response.assert_status_ok();
    let range = response.json::<Value>();
    assert_eq!(range["text"], "ick brown");
    assert_eq!(range["start"], 6);
    assert_eq!(range["end"], 15);

    let created = create_annotation(
        &server,
        "user-a",
        json!({
            "document_id": doc,
            "position_start": range["start"],
            "position_end": range["end"],
            "highlighted_text": range["text"],
            "color": "blue",
        }),
    )
    .await;
    assert_eq!(created["color"], "blue");

    let render = as_user(server.get(&format!("/api/v1/documents/{}/render", doc)), "user-a")
        .await
        .json::<Value>();
    let texts = segment_texts(&render);
    assert_eq!(texts.concat(), FOX);
    assert_eq!(texts, vec!["The ", "quick", " brown", " fox jumps over the lazy dog"]);
}

#[tokio::test]
async fn test_empty_or_foreign_selection_is_null() {
    let server = create_test_server().await;
    let doc = create_document(&server, "user-a", "Spaces", "word     word", &[]).await;
    let url = format!("/api/v1/documents/{}/selection", doc);

    let whitespace = as_user(server.post(&url), "user-a")
        .json(&json!({ "anchor": { "node": 0, "offset": 5 }, "focus": { "node": 0, "offset": 8 } }))
        .await;
    whitespace.assert_status_ok();
    assert_eq!(whitespace.json::<Value>(), Value::Null);

    let foreign = as_user(server.post(&url), "user-a")
        .json(&json!({
            "document_id": "some-other-document",
            "anchor": { "node": 0, "offset": 0 },
            "focus": { "node": 0, "offset": 4 }
        }))
        .await;
    foreign.assert_status_ok();
    assert_eq!(foreign.json::<Value>(), Value::Null);
}

#[tokio::test]
async fn test_overlapping_annotations_render_without_duplication() {
    let server = create_test_server().await;
    let content = "0123456789abcdefghij";
    let doc = create_document(&server, "user-a", "Digits", content, &[]).await;

    for (start, end) in [(0, 10), (5, 15)] {
        create_annotation(
            &server,
            "user-a",
            json!({ "document_id": doc, "position_start": start, "position_end": end }),
        )
        .await;
    }

    let render = as_user(server.get(&format!("/api/v1/documents/{}/render", doc)), "user-a")
        .await
        .json::<Value>();
    let texts = segment_texts(&render);
    assert_eq!(texts.concat(), content);
    assert_eq!(texts, vec!["0123456789", "abcde", "fghij"]);
}

#[tokio::test]
async fn test_annotation_validation() {
    let server = create_test_server().await;
    let doc = create_document(&server, "user-a", "Fox", "The quick brown fox", &[]).await;

    let cases = [
        json!({ "document_id": doc, "position_start": 4, "position_end": 500 }),
        json!({ "document_id": doc, "position_start": 9, "position_end": 4 }),
        json!({ "document_id": doc, "position_start": 4, "position_end": 9, "highlighted_text": "slow" }),
        json!({ "document_id": doc, "position_start": 4, "position_end": 9, "color": "teal" }),
    ];
    for body in cases {
        let response = as_user(server.post("/api/v1/annotations"), "user-a").json(&body).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{}", body);
    }

    let missing = as_user(server.post("/api/v1/annotations"), "user-a")
        .json(&json!({ "document_id": "nope", "position_start": 0, "position_end": 1 }))
        .await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_and_delete_annotation() {
    let server = create_test_server().await;
    let doc = create_document(&server, "user-a", "Fox", "The quick brown fox", &[]).await;
    let annotation = create_annotation(
        &server,
        "user-a",
        json!({ "document_id": doc, "position_start": 4, "position_end": 9 }),
    )
    .await;
    assert_eq!(annotation["color"], "yellow");
    let url = format!("/api/v1/annotations/{}", annotation["id"].as_str().unwrap());

    let updated = as_user(server.patch(&url), "user-a")
        .json(&json!({ "content": "a note", "color": "pink" }))
        .await;
    updated.assert_status_ok();
    let updated = updated.json::<Value>();
    assert_eq!(updated["content"], "a note");
    assert_eq!(updated["color"], "pink");
    assert_eq!(updated["position_start"], 4);

    let bad_color = as_user(server.patch(&url), "user-a")
        .json(&json!({ "color": "teal" }))
        .await;
    assert_eq!(bad_color.status_code(), StatusCode::BAD_REQUEST);

    let other_user = as_user(server.delete(&url), "user-b").await;
    assert_eq!(other_user.status_code(), StatusCode::NOT_FOUND);

    let deleted = as_user(server.delete(&url), "user-a").await;
    assert_eq!(deleted.status_code(), StatusCode::NO_CONTENT);
    assert_eq!(as_user(server.get(&url), "user-a").await.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rows_are_isolated_per_user() {
    let server = create_test_server().await;
    let doc = create_document(&server, "user-a", "Private", "secret text", &[]).await;

    let response = as_user(server.get(&format!("/api/v1/documents/{}", doc)), "user-b").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let listed = as_user(server.get("/api/v1/documents"), "user-b").await.json::<Value>();
    assert_eq!(listed, json!([]));

    let annotate = as_user(server.post("/api/v1/annotations"), "user-b")
        .json(&json!({ "document_id": doc, "position_start": 0, "position_end": 6 }))
        .await;
    assert_eq!(annotate.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_document_filters() {
    let server = create_test_server().await;
    create_document(&server, "user-a", "Rivers", "Water flows downhill", &["geography"]).await;
    create_document(&server, "user-a", "Mountains", "Rock goes uphill", &["geography", "draft"]).await;
    create_document(&server, "user-a", "Poems", "Water, water everywhere", &["literature"]).await;

    let titles = |value: Value| -> Vec<String> {
        let mut titles: Vec<String> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["title"].as_str().unwrap().to_string())
            .collect();
        titles.sort();
        titles
    };

    let by_tag = as_user(server.get("/api/v1/documents?tag=geography"), "user-a").await;
    assert_eq!(titles(by_tag.json()), vec!["Mountains", "Rivers"]);

    let by_search = as_user(server.get("/api/v1/documents?q=WATER"), "user-a").await;
    assert_eq!(titles(by_search.json()), vec!["Poems", "Rivers"]);

    let both = as_user(server.get("/api/v1/documents?tag=geography&q=rock"), "user-a").await;
    assert_eq!(titles(both.json()), vec!["Mountains"]);
}

#[tokio::test]
async fn test_connections_lifecycle_and_cascade() {
    let server = create_test_server().await;
    let source = create_document(&server, "user-a", "Claim", "The earth is round", &[]).await;
    let target = create_document(&server, "user-a", "Evidence", "Ships vanish hull first", &[]).await;
    let other = create_document(&server, "user-a", "Unrelated", "Cats sleep a lot", &[]).await;

    let annotation = create_annotation(
        &server,
        "user-a",
        json!({ "document_id": source, "position_start": 13, "position_end": 18 }),
    )
    .await;

    let wrong_document = as_user(server.post("/api/v1/connections"), "user-a")
        .json(&json!({
            "source_document_id": other,
            "target_document_id": target,
            "connection_type": "supports",
            "source_annotation_id": annotation["id"],
        }))
        .await;
    assert_eq!(wrong_document.status_code(), StatusCode::BAD_REQUEST);

    let created = as_user(server.post("/api/v1/connections"), "user-a")
        .json(&json!({
            "source_document_id": source,
            "target_document_id": target,
            "connection_type": "supports",
            "source_annotation_id": annotation["id"],
            "description": "  observational evidence  ",
        }))
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);
    let created = created.json::<Value>();
    assert_eq!(created["connection_type"], "supports");
    assert_eq!(created["description"], "observational evidence");

    let for_target = as_user(
        server.get(&format!("/api/v1/connections?document_id={}", target)),
        "user-a",
    )
    .await
    .json::<Value>();
    assert_eq!(for_target.as_array().unwrap().len(), 1);

    let for_other = as_user(
        server.get(&format!("/api/v1/connections?document_id={}", other)),
        "user-a",
    )
    .await
    .json::<Value>();
    assert_eq!(for_other, json!([]));

    // Deleting the source document removes its annotations and connections
    let deleted = as_user(server.delete(&format!("/api/v1/documents/{}", source)), "user-a").await;
    assert_eq!(deleted.status_code(), StatusCode::NO_CONTENT);

    let connections = as_user(server.get("/api/v1/connections"), "user-a").await.json::<Value>();
    assert_eq!(connections, json!([]));

    let annotations = as_user(server.get("/api/v1/annotations"), "user-a").await.json::<Value>();
    assert_eq!(annotations, json!([]));
}

#[tokio::test]
async fn test_delete_connection() {
    let server = create_test_server().await;
    let a = create_document(&server, "user-a", "A", "alpha", &[]).await;
    let b = create_document(&server, "user-a", "B", "beta", &[]).await;

    let created = as_user(server.post("/api/v1/connections"), "user-a")
        .json(&json!({ "source_document_id": a, "target_document_id": b, "connection_type": "related" }))
        .await
        .json::<Value>();
    let url = format!("/api/v1/connections/{}", created["id"].as_str().unwrap());

    assert_eq!(as_user(server.delete(&url), "user-a").await.status_code(), StatusCode::NO_CONTENT);
    assert_eq!(as_user(server.delete(&url), "user-a").await.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_annotations_across_documents() {
    let server = create_test_server().await;
    let a = create_document(&server, "user-a", "A", "alpha beta", &[]).await;
    let b = create_document(&server, "user-a", "B", "gamma delta", &[]).await;

    create_annotation(&server, "user-a", json!({ "document_id": a, "position_start": 0, "position_end": 5 })).await;
    create_annotation(&server, "user-a", json!({ "document_id": b, "position_start": 6, "position_end": 11 })).await;

    let all = as_user(server.get("/api/v1/annotations"), "user-a").await.json::<Value>();
    assert_eq!(all.as_array().unwrap().len(), 2);

    let only_b = as_user(server.get(&format!("/api/v1/annotations?document_id={}", b)), "user-a")
        .await
        .json::<Value>();
    let only_b = only_b.as_array().unwrap();
    assert_eq!(only_b.len(), 1);
    assert_eq!(only_b[0]["highlighted_text"], "delta");

    let per_document = as_user(server.get(&format!("/api/v1/documents/{}/annotations", a)), "user-a")
        .await
        .json::<Value>();
    assert_eq!(per_document[0]["highlighted_text"], "alpha");
}

#[tokio::test]
async fn test_multipart_upload() {
    let server = create_test_server().await;
    let boundary = "cw-test-boundary";
    let body = format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"field-notes.txt\"\r\n\
         Content-Type: text/plain\r\n\r\n\
         Observed three herons.\r\n\
         --{b}\r\n\
         Content-Disposition: form-data; name=\"tags\"\r\n\r\n\
         birds, fieldwork\r\n\
         --{b}--\r\n",
        b = boundary
    );

    let response = as_user(server.post("/api/v1/documents/upload"), "user-a")
        .content_type(&format!("multipart/form-data; boundary={}", boundary))
        .bytes(Bytes::from(body))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED, "{}", response.text());

    let document = response.json::<Value>();
    assert_eq!(document["title"], "field-notes");
    assert_eq!(document["content"], "Observed three herons.");
    assert_eq!(document["file_name"], "field-notes.txt");
    assert_eq!(document["tags"], json!(["birds", "fieldwork"]));
    assert_eq!(document["size"], 22);
}

#[tokio::test]
async fn test_unknown_render_format() {
    let server = create_test_server().await;
    let doc = create_document(&server, "user-a", "Doc", "text", &[]).await;

    let response = as_user(
        server.get(&format!("/api/v1/documents/{}/render?format=pdf", doc)),
        "user-a",
    )
    .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_escape_heavy_document_under_limit_is_accepted() {
    let max = 100_000;
    let server = create_test_server_with(small_document_config(max)).await;

    // Every newline is two bytes once JSON encoded
    let content = "\n".repeat(max - 1_000);
    let response = as_user(server.post("/api/v1/documents"), "user-a")
        .json(&json!({ "title": "Blank lines", "content": content }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED, "{}", response.text());
    assert_eq!(response.json::<Value>()["size"], (max - 1_000) as u64);
}

#[tokio::test]
async fn test_oversized_document_is_bad_request() {
    let max = 1_000;
    let server = create_test_server_with(small_document_config(max)).await;

    let response = as_user(server.post("/api/v1/documents"), "user-a")
        .json(&json!({ "title": "Too long", "content": "a".repeat(max + 1) }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "bad_request");

    let boundary = "cw-test-boundary";
    let upload = as_user(server.post("/api/v1/documents/upload"), "user-a")
        .content_type(&format!("multipart/form-data; boundary={}", boundary))
        .bytes(multipart_body(boundary, "long.txt", "a".repeat(max + 1).as_bytes()))
        .await;
    assert_eq!(upload.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(upload.json::<Value>()["error"], "bad_request");
}

#[tokio::test]
async fn test_non_utf8_upload_is_rejected() {
    let server = create_test_server().await;
    let boundary = "cw-test-boundary";

    let response = as_user(server.post("/api/v1/documents/upload"), "user-a")
        .content_type(&format!("multipart/form-data; boundary={}", boundary))
        .bytes(multipart_body(boundary, "latin1.txt", &[0x63, 0x61, 0x66, 0xe9, 0xff]))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "encoding_error");

    let listed = as_user(server.get("/api/v1/documents"), "user-a").await.json::<Value>();
    assert_eq!(listed, json!([]));
}
