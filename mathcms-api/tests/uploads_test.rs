/// Integration tests for file uploads
///
/// Files are written to a temporary upload root; the tests check both the
/// responses and what is left on disk.

mod common;

use axum::http::StatusCode;
use common::{Part, TestContext};
use serde_json::json;
use uuid::Uuid;

const PNG: &[u8] = b"\x89PNG\r\n\x1a\nnot really an image";
const PDF: &[u8] = b"%PDF-1.4\n% test document\n";

#[tokio::test]
async fn test_image_upload() {
    let ctx = TestContext::new();

    let response = ctx
        .multipart(
            "/uploads/images",
            Some(&ctx.editor_token),
            vec![Part::file("image/png", "poster.png", PNG.to_vec())],
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    let data = &response.body["data"];
    assert!(data["url"].as_str().unwrap().starts_with("/uploads/images/"));
    assert!(data["filename"].as_str().unwrap().ends_with(".png"));
    assert_eq!(data["originalName"], "poster.png");
    assert_eq!(data["mimeType"], "image/png");
    assert_eq!(data["size"], PNG.len());

    let stored = ctx.stored_files("images");
    assert_eq!(stored, vec![data["filename"].as_str().unwrap().to_string()]);
}

#[tokio::test]
async fn test_upload_requires_token() {
    let ctx = TestContext::new();

    let response = ctx
        .multipart(
            "/uploads/images",
            None,
            vec![Part::file("image/png", "poster.png", PNG.to_vec())],
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(ctx.stored_files("images").is_empty());
}

#[tokio::test]
async fn test_rejects_unsupported_type() {
    let ctx = TestContext::new();

    let response = ctx
        .multipart(
            "/uploads/images",
            Some(&ctx.editor_token),
            vec![Part::file("image/bmp", "scan.bmp", vec![0u8; 16])],
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["errors"][0]["field"], "file");

    let response = ctx
        .multipart(
            "/documents/upload",
            Some(&ctx.editor_token),
            vec![Part::file("image/png", "poster.png", PNG.to_vec())],
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    assert!(ctx.stored_files("images").is_empty());
    assert!(ctx.stored_files("documents").is_empty());
}

#[tokio::test]
async fn test_missing_file_field() {
    let ctx = TestContext::new();

    let response = ctx
        .multipart(
            "/uploads/images",
            Some(&ctx.editor_token),
            vec![Part::text("changes", "nothing attached")],
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["errors"][0]["message"], "No file was uploaded");
}

#[tokio::test]
async fn test_oversize_image_is_rejected_and_removed() {
    let ctx = TestContext::new();
    let too_big = vec![0u8; 10 * 1024 * 1024 + 1];

    let response = ctx
        .multipart(
            "/uploads/images",
            Some(&ctx.editor_token),
            vec![Part::file("image/jpeg", "huge.jpg", too_big)],
        )
        .await;

    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.body["message"], "File exceeds the 10 MB limit");
    assert!(ctx.stored_files("images").is_empty());
}

#[tokio::test]
async fn test_document_upload_reports_file_type() {
    let ctx = TestContext::new();

    let response = ctx
        .multipart(
            "/documents/upload",
            Some(&ctx.editor_token),
            vec![Part::file("application/pdf", "paper.pdf", PDF.to_vec())],
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.body["data"]["fileType"], "pdf");
    assert!(response.body["data"]["url"]
        .as_str()
        .unwrap()
        .starts_with("/uploads/documents/"));
    assert_eq!(ctx.stored_files("documents").len(), 1);
}

#[tokio::test]
async fn test_document_versions() {
    let ctx = TestContext::new();
    let id = ctx
        .create(
            "/documents",
            json!({ "title": "Notes on Galois theory", "authors": ["E. Galois"], "fileType": "latex" }),
        )
        .await;

    let response = ctx
        .multipart(
            &format!("/documents/{}/versions", id),
            Some(&ctx.editor_token),
            vec![
                Part::file("application/pdf", "galois-v1.pdf", PDF.to_vec()),
                Part::text("changes", "First draft"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["message"], "Version 1 added");
    assert_eq!(response.body["data"]["fileType"], "pdf");
    assert_eq!(response.body["data"]["versions"][0]["changes"], "First draft");

    let response = ctx
        .multipart(
            &format!("/documents/{}/versions", id),
            Some(&ctx.editor_token),
            vec![Part::file("text/markdown", "galois-v2.md", b"# Galois".to_vec())],
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = ctx.get(&format!("/documents/{}", id)).await;
    let data = &response.body["data"];
    assert_eq!(data["versions"].as_array().unwrap().len(), 2);
    assert_eq!(data["versions"][1]["version"], 2);
    assert_eq!(data["fileType"], "markdown");
    assert_eq!(data["fileUrl"], data["versions"][1]["fileUrl"]);
    assert_eq!(data["fileSize"], 8);
    assert_eq!(ctx.stored_files("documents").len(), 2);
}

#[tokio::test]
async fn test_version_for_unknown_document() {
    let ctx = TestContext::new();

    let response = ctx
        .multipart(
            &format!("/documents/{}/versions", Uuid::new_v4()),
            Some(&ctx.editor_token),
            vec![Part::file("application/pdf", "lost.pdf", PDF.to_vec())],
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(ctx.stored_files("documents").is_empty());
}

#[tokio::test]
async fn test_researcher_avatar() {
    let ctx = TestContext::new();
    let id = ctx
        .create(
            "/researchers",
            json!({ "name": "Srinivasa Ramanujan", "email": "ramanujan@math.example.org" }),
        )
        .await;

    let response = ctx
        .multipart(
            &format!("/researchers/{}/avatar", id),
            Some(&ctx.editor_token),
            vec![Part::file("image/jpeg", "portrait.jpg", vec![0xFF, 0xD8, 0xFF, 0xE0])],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    let avatar = response.body["data"]["avatar"].as_str().unwrap().to_string();
    assert!(avatar.starts_with("/uploads/images/"));
    assert!(avatar.ends_with(".jpg"));

    let response = ctx.get(&format!("/researchers/{}", id)).await;
    assert_eq!(response.body["data"]["avatar"], avatar.as_str());
}
