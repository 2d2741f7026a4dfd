//! Upload endpoint integration tests.

mod helpers;

use std::time::Duration;

use axum_test::multipart::{MultipartForm, Part};
use bytes::Bytes;
use helpers::{bearer, FakeProber, RecordingStorage, TestApp};
use uuid::Uuid;

const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";

fn form(field: &str, content_type: &str, data: &[u8]) -> MultipartForm {
    let part = Part::bytes(Bytes::copy_from_slice(data))
        .file_name("upload.bin")
        .mime_type(content_type);
    MultipartForm::new().add_part(field, part)
}

fn video_bytes(len: usize) -> Vec<u8> {
    let mut data = b"\x00\x00\x00\x18ftypmp42".to_vec();
    data.resize(len, 0x42);
    data
}

fn key_from_url(url: &str) -> &str {
    url.trim_start_matches("https://cdn.tubely.test/")
}

#[tokio::test]
async fn test_thumbnail_upload_updates_record() {
    let app = TestApp::spawn().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .server
        .put(&format!("/videos/{}/thumbnail", video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(form("thumbnail", "image/png", PNG_HEADER))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    let url = body["thumbnail_url"].as_str().expect("thumbnail_url set");
    assert!(body["video_url"].is_null());

    let stored = app.storage.stored();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].content_type, "image/png");
    assert_eq!(stored[0].bytes, PNG_HEADER);
    assert_eq!(url, RecordingStorage::url_for(&stored[0].key));

    // Thumbnails carry no orientation segment
    let key = key_from_url(url);
    assert!(!key.contains('/'));
    assert!(key.ends_with(".png"));
    assert_eq!(key.len(), 43 + ".png".len());

    let persisted = app.stored_video(video.id).await;
    assert_eq!(persisted.thumbnail_url.as_deref(), Some(url));
}

#[tokio::test]
async fn test_repeat_uploads_get_distinct_keys() {
    let app = TestApp::spawn().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let mut urls = Vec::new();
    for _ in 0..2 {
        let response = app
            .server
            .put(&format!("/videos/{}/thumbnail", video.id))
            .add_header("Authorization", bearer(owner))
            .multipart(form("thumbnail", "image/jpeg", b"\xff\xd8\xff\xe0jfif"))
            .await;
        assert_eq!(response.status_code(), 200);
        let body: serde_json::Value = response.json();
        urls.push(body["thumbnail_url"].as_str().unwrap().to_string());
    }

    assert_ne!(urls[0], urls[1]);
    assert!(urls.iter().all(|u| u.ends_with(".jpeg")));
    let persisted = app.stored_video(video.id).await;
    assert_eq!(persisted.thumbnail_url.as_deref(), Some(urls[1].as_str()));
}

#[tokio::test]
async fn test_content_type_parameters_and_case_are_normalized() {
    let app = TestApp::spawn().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .server
        .put(&format!("/videos/{}/thumbnail", video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(form("thumbnail", "Image/PNG; charset=binary", PNG_HEADER))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(app.storage.stored()[0].content_type, "image/png");
}

#[tokio::test]
async fn test_unsupported_media_type_is_rejected_before_storage() {
    let app = TestApp::spawn().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .server
        .put(&format!("/videos/{}/thumbnail", video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(form("thumbnail", "image/gif", b"GIF89a"))
        .await;

    assert_eq!(response.status_code(), 415);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "UNSUPPORTED_MEDIA_TYPE");
    assert!(app.storage.stored().is_empty());
    assert_eq!(app.stored_video(video.id).await, video);
}

#[tokio::test]
async fn test_image_type_rejected_on_video_route() {
    let app = TestApp::spawn().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .server
        .put(&format!("/videos/{}/video", video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(form("video", "image/png", PNG_HEADER))
        .await;

    assert_eq!(response.status_code(), 415);
    assert!(app.prober.probed().is_empty());
    assert_eq!(app.scratch_entries(), 0);
}

#[tokio::test]
async fn test_missing_form_field_is_malformed() {
    let app = TestApp::spawn().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .server
        .put(&format!("/videos/{}/thumbnail", video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(form("file", "image/png", PNG_HEADER))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "MALFORMED_UPLOAD");
    assert!(app.storage.stored().is_empty());
}

#[tokio::test]
async fn test_empty_file_is_malformed() {
    let app = TestApp::spawn().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .server
        .put(&format!("/videos/{}/thumbnail", video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(form("thumbnail", "image/png", b""))
        .await;

    assert_eq!(response.status_code(), 400);
    assert!(app.storage.stored().is_empty());
}

#[tokio::test]
async fn test_non_owner_is_forbidden_and_body_ignored() {
    let app = TestApp::spawn().await;
    let owner = Uuid::new_v4();
    let intruder = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    // The content type would be rejected too; ownership is checked first.
    let response = app
        .server
        .put(&format!("/videos/{}/thumbnail", video.id))
        .add_header("Authorization", bearer(intruder))
        .multipart(form("thumbnail", "image/gif", b"GIF89a"))
        .await;

    assert_eq!(response.status_code(), 403);
    assert!(app.storage.stored().is_empty());
    assert_eq!(app.stored_video(video.id).await, video);
}

#[tokio::test]
async fn test_unknown_record_is_not_found() {
    let app = TestApp::spawn().await;
    let user = Uuid::new_v4();

    let response = app
        .server
        .put(&format!("/videos/{}/thumbnail", Uuid::new_v4()))
        .add_header("Authorization", bearer(user))
        .multipart(form("thumbnail", "image/png", PNG_HEADER))
        .await;

    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_identifier_is_checked_before_credentials() {
    let app = TestApp::spawn().await;

    let response = app
        .server
        .put("/videos/not-a-uuid/thumbnail")
        .multipart(form("thumbnail", "image/png", PNG_HEADER))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INVALID_IDENTIFIER");
    assert_eq!(body["error"], "Invalid ID");
}

#[tokio::test]
async fn test_missing_or_invalid_token_is_unauthorized() {
    let app = TestApp::spawn().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;
    let path = format!("/videos/{}/thumbnail", video.id);

    let response = app
        .server
        .put(&path)
        .multipart(form("thumbnail", "image/png", PNG_HEADER))
        .await;
    assert_eq!(response.status_code(), 401);

    let response = app
        .server
        .put(&path)
        .add_header("Authorization", "Bearer not.a.token")
        .multipart(form("thumbnail", "image/png", PNG_HEADER))
        .await;
    assert_eq!(response.status_code(), 401);
    assert!(app.storage.stored().is_empty());
}

#[tokio::test]
async fn test_oversized_thumbnail_is_malformed() {
    let app = TestApp::builder()
        .max_thumbnail_size_bytes(1024)
        .build()
        .await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .server
        .put(&format!("/videos/{}/thumbnail", video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(form("thumbnail", "image/png", &[0u8; 4096]))
        .await;

    assert_eq!(response.status_code(), 400);
    assert!(app.storage.stored().is_empty());
}

#[tokio::test]
async fn test_landscape_video_is_stored_under_orientation_prefix() {
    let app = TestApp::spawn().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;
    let data = video_bytes(16 * 1024);

    let response = app
        .server
        .put(&format!("/videos/{}/video", video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(form("video", "video/mp4", &data))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    let url = body["video_url"].as_str().expect("video_url set");
    let key = key_from_url(url);
    assert!(key.starts_with("landscape/"), "unexpected key {}", key);
    assert!(key.ends_with(".mp4"));

    let stored = app.storage.stored();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].content_type, "video/mp4");
    assert_eq!(stored[0].bytes, data);

    // The staged copy the prober saw is gone
    let probed = app.prober.probed();
    assert_eq!(probed.len(), 1);
    assert!(!probed[0].exists());
    assert_eq!(app.scratch_entries(), 0);
}

#[tokio::test]
async fn test_video_upload_keeps_existing_thumbnail() {
    let app = TestApp::spawn().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let thumbnail = app
        .server
        .put(&format!("/videos/{}/thumbnail", video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(form("thumbnail", "image/png", PNG_HEADER))
        .await;
    assert_eq!(thumbnail.status_code(), 200);
    let thumbnail_body: serde_json::Value = thumbnail.json();
    let thumbnail_url = thumbnail_body["thumbnail_url"].as_str().unwrap().to_string();

    let response = app
        .server
        .put(&format!("/videos/{}/video", video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(form("video", "video/mp4", &video_bytes(4096)))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["thumbnail_url"].as_str(), Some(thumbnail_url.as_str()));
    assert!(body["video_url"].as_str().unwrap().contains("/landscape/"));

    let persisted = app.stored_video(video.id).await;
    assert_eq!(persisted.thumbnail_url.as_deref(), Some(thumbnail_url.as_str()));
    assert!(persisted.video_url.is_some());
}

#[tokio::test]
async fn test_video_orientations() {
    for (width, height, prefix) in [
        (1080, 1920, "portrait/"),
        (1000, 1000, "other/"),
        (1636, 900, "other/"),
    ] {
        let app = TestApp::builder()
            .prober(FakeProber::dimensions(width, height))
            .build()
            .await;
        let owner = Uuid::new_v4();
        let video = app.seed_video(owner).await;

        let response = app
            .server
            .put(&format!("/videos/{}/video", video.id))
            .add_header("Authorization", bearer(owner))
            .multipart(form("video", "video/mp4", &video_bytes(1024)))
            .await;

        assert_eq!(response.status_code(), 200);
        let key = app.storage.stored()[0].key.clone();
        assert!(
            key.starts_with(prefix),
            "{}x{} stored as {}",
            width,
            height,
            key
        );
    }
}

#[tokio::test]
async fn test_probe_failure_cleans_up_and_leaves_record() {
    let app = TestApp::builder()
        .prober(FakeProber::failing("moov atom not found"))
        .build()
        .await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .server
        .put(&format!("/videos/{}/video", video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(form("video", "video/mp4", &video_bytes(4096)))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "CLASSIFICATION_FAILURE");
    assert!(!response.text().contains("moov"));

    assert!(app.storage.stored().is_empty());
    assert_eq!(app.scratch_entries(), 0);
    assert_eq!(app.stored_video(video.id).await, video);
}

#[tokio::test]
async fn test_oversized_video_aborts_staging() {
    let app = TestApp::builder().max_video_size_bytes(8 * 1024).build().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .server
        .put(&format!("/videos/{}/video", video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(form("video", "video/mp4", &video_bytes(32 * 1024)))
        .await;

    assert_eq!(response.status_code(), 400);
    assert!(app.prober.probed().is_empty());
    assert_eq!(app.scratch_entries(), 0);
}

#[tokio::test]
async fn test_storage_failure_is_bad_gateway() {
    let app = TestApp::spawn().await;
    app.storage.fail_stores();
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .server
        .put(&format!("/videos/{}/video", video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(form("video", "video/mp4", &video_bytes(2048)))
        .await;

    assert_eq!(response.status_code(), 502);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "STORAGE_FAILURE");
    assert!(!response.text().contains("SlowDown"));
    assert_eq!(app.scratch_entries(), 0);
    assert_eq!(app.stored_video(video.id).await, video);
}

#[tokio::test]
async fn test_persist_failure_removes_orphaned_object() {
    let app = TestApp::builder().failing_updates().build().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .server
        .put(&format!("/videos/{}/thumbnail", video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(form("thumbnail", "image/png", PNG_HEADER))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "METADATA_PERSIST_FAILURE");

    let stored_key = app.storage.stored()[0].key.clone();
    let mut deleted = app.storage.deleted();
    for _ in 0..50 {
        if !deleted.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        deleted = app.storage.deleted();
    }
    assert_eq!(deleted, vec![stored_key]);
    assert_eq!(app.stored_video(video.id).await, video);
}

#[tokio::test]
async fn test_embedded_backend_returns_data_uri() {
    let app = TestApp::builder()
        .embedded_backend()
        .build_with_real_storage()
        .await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .server
        .put(&format!("/videos/{}/thumbnail", video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(form("thumbnail", "image/png", b"\x89PNG"))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["thumbnail_url"], "data:image/png;base64,iVBORw==");
}

#[tokio::test]
async fn test_local_backend_serves_uploaded_asset() {
    let app = TestApp::builder()
        .local_backend()
        .build_with_real_storage()
        .await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .server
        .put(&format!("/videos/{}/thumbnail", video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(form("thumbnail", "image/png", PNG_HEADER))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    let url = body["thumbnail_url"].as_str().unwrap();
    let key = url
        .strip_prefix("http://localhost:8091/assets/")
        .expect("url rooted at the assets base");
    assert!(app.assets_dir.path().join(key).exists());

    let asset = app.server.get(&format!("/assets/{}", key)).await;
    assert_eq!(asset.status_code(), 200);
    assert_eq!(asset.as_bytes().as_ref(), PNG_HEADER);
}
