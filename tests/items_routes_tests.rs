use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode, header},
};
use listing_api::{
    Config, ListingState, listing_router,
    db::models::Item,
    service::content_hasher::image_filename,
};
use serde_json::{Value, json};
use std::fs;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "listing-test-boundary";

struct TestApp {
    app: Router,
    state: ListingState,
    dir: TempDir,
}

async fn spawn_app() -> TestApp {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let images_dir = dir.path().join("images");
    fs::create_dir(&images_dir).expect("failed to create images dir");
    fs::write(images_dir.join("default.jpg"), b"default image").expect("failed to write default");

    let cfg = Config {
        database_url: format!("sqlite:{}", dir.path().join("items.sqlite3").display()),
        images_dir,
        ..Config::default()
    };
    let state = ListingState::from_config(&cfg)
        .await
        .expect("failed to build state");
    let app = listing_router(state.clone(), &cfg);
    TestApp { app, state, dir }
}

impl TestApp {
    async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(req).await.expect("request failed")
    }

    async fn get(&self, uri: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
    }

    /// Writes `bytes` to a source file and posts it as a server-side path.
    async fn post_item(&self, name: &str, category: &str, bytes: &[u8]) -> Response<Body> {
        let source = self.dir.path().join(format!("source-{}", image_filename(bytes)));
        fs::write(&source, bytes).expect("failed to write source image");
        let form = format!(
            "name={name}&category={category}&image={}",
            source.display()
        );
        self.send(
            Request::builder()
                .method("POST")
                .uri("/items")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form))
                .expect("failed to build request"),
        )
        .await
    }
}

async fn json_body(resp: Response<Body>) -> Value {
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&body).expect("response body was not json")
}

fn multipart_body(name: &str, category: &str, filename: &str, image: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\n{name}\r\n\
         --{BOUNDARY}\r\nContent-Disposition: form-data; name=\"category\"\r\n\r\n{category}\r\n\
         --{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\n\
         Content-Type: image/jpeg\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(image);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

#[tokio::test]
async fn root_reports_liveness() {
    let t = spawn_app().await;
    let resp = t.get("/").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!({"message": "Hello, world!"}));
}

#[tokio::test]
async fn created_item_is_listed_with_hashed_image() {
    let t = spawn_app().await;

    let resp = t.post_item("N", "C", b"jpeg-bytes").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!({"message": "item received: N"}));

    let resp = t.get("/items").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    let items: Vec<Item> = serde_json::from_value(body["item"].clone()).unwrap();
    assert_eq!(
        items,
        vec![Item {
            name: "N".into(),
            category: "C".into(),
            image_filename: image_filename(b"jpeg-bytes"),
        }]
    );
}

#[tokio::test]
async fn empty_listing_is_an_empty_array() {
    let t = spawn_app().await;
    let resp = t.get("/items").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body, json!({"item": []}));
    assert!(body.get("items").is_none());
}

#[tokio::test]
async fn get_by_id_returns_single_item_or_empty() {
    let t = spawn_app().await;
    t.post_item("Desk", "Office", b"desk").await;

    let resp = t.get("/items/1").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["name"], "Desk");
    assert_eq!(body[0]["category"], "Office");

    let resp = t.get("/items/1001").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!([]));
}

#[tokio::test]
async fn non_numeric_id_is_bad_request() {
    let t = spawn_app().await;
    let resp = t.get("/items/abc").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await, json!({"message": "invalid item id: abc"}));
}

#[tokio::test]
async fn search_matches_exact_name_only() {
    let t = spawn_app().await;
    t.post_item("Shirt", "Fashion", b"one").await;
    t.post_item("Shirts", "Fashion", b"two").await;
    t.post_item("shirt", "Fashion", b"three").await;

    let resp = t.get("/search?keyword=Shirt").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let items: Vec<Item> = serde_json::from_value(json_body(resp).await).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "Shirt");
    assert_eq!(items[0].image_filename, image_filename(b"one"));

    let resp = t.get("/search?keyword=Hat").await;
    assert_eq!(json_body(resp).await, json!([]));
}

#[tokio::test]
async fn same_category_is_stored_once() {
    let t = spawn_app().await;
    t.post_item("Dune", "Books", b"dune").await;
    t.post_item("Emma", "Books", b"emma").await;

    let categories = t
        .state
        .items
        .storage()
        .list_categories()
        .await
        .expect("failed to list categories");
    assert_eq!(categories.iter().filter(|c| c.name == "Books").count(), 1);
}

#[tokio::test]
async fn multipart_upload_is_stored_and_served() {
    let t = spawn_app().await;

    let resp = t
        .send(
            Request::builder()
                .method("POST")
                .uri("/items")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(multipart_body(
                    "Camera",
                    "Electronics",
                    "camera.jpg",
                    b"camera-bytes",
                )))
                .expect("failed to build request"),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        json_body(resp).await,
        json!({"message": "item received: Camera"})
    );

    let filename = image_filename(b"camera-bytes");
    let resp = t.get(&format!("/image/{filename}")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["x-image-default"], "false");
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"camera-bytes");
}

#[tokio::test]
async fn missing_form_field_is_bad_request() {
    let t = spawn_app().await;
    let resp = t
        .send(
            Request::builder()
                .method("POST")
                .uri("/items")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("name=Lamp&category=Home"))
                .expect("failed to build request"),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(resp).await,
        json!({"message": "missing form field: image"})
    );
}

#[tokio::test]
async fn unreadable_image_source_creates_nothing() {
    let t = spawn_app().await;
    let resp = t
        .send(
            Request::builder()
                .method("POST")
                .uri("/items")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("name=Ghost&category=None&image=/nonexistent/ghost.jpg"))
                .expect("failed to build request"),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = t.get("/items").await;
    assert_eq!(json_body(resp).await, json!({"item": []}));
}

#[tokio::test]
async fn storage_failure_is_a_500_and_server_keeps_serving() {
    let t = spawn_app().await;
    sqlx::query("DROP TABLE items")
        .execute(t.state.items.storage().pool())
        .await
        .expect("failed to drop table");

    let resp = t.get("/items").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(resp).await,
        json!({"message": "An internal server error occurred."})
    );

    let resp = t.get("/").await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn cors_allows_only_front_url() {
    let t = spawn_app().await;
    let preflight = |origin: &str| {
        Request::builder()
            .method("OPTIONS")
            .uri("/items")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .expect("failed to build request")
    };

    let resp = t.send(preflight("http://localhost:3000")).await;
    assert_eq!(
        resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
    let methods = resp.headers()[header::ACCESS_CONTROL_ALLOW_METHODS]
        .to_str()
        .unwrap()
        .to_string();
    for m in ["GET", "PUT", "POST", "DELETE"] {
        assert!(methods.contains(m), "{m} missing from {methods}");
    }

    let resp = t.send(preflight("http://evil.example")).await;
    assert!(
        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}

#[tokio::test]
async fn server_side_path_is_hashed_but_never_served() {
    let t = spawn_app().await;
    let resp = t.post_item("x", "y", b"DB_PASSWORD=hunter2").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(t.get("/items").await).await;
    let filename = body["item"][0]["image_filename"]
        .as_str()
        .expect("image_filename missing")
        .to_string();
    assert_eq!(filename, image_filename(b"DB_PASSWORD=hunter2"));

    let resp = t.get(&format!("/image/{filename}")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["x-image-default"], "true");
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"default image");
}

#[tokio::test]
async fn empty_file_part_counts_as_missing_image() {
    let t = spawn_app().await;
    let resp = t
        .send(
            Request::builder()
                .method("POST")
                .uri("/items")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(multipart_body("Camera", "Electronics", "", b"")))
                .expect("failed to build request"),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(resp).await,
        json!({"message": "missing form field: image"})
    );

    let resp = t.get("/items").await;
    assert_eq!(json_body(resp).await, json!({"item": []}));
}
