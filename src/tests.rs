//! Integration tests for the caravan backend.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{multipart, Client, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::{Config, LogFormat};
use crate::db::{init_database, DocumentStore};
use crate::media::MediaStore;
use crate::{create_router, AppState};

const ADMIN_KEY: &str = "test-admin-key";

/// Test fixture for integration tests.
struct TestFixture {
    /// Sends the admin key on every request
    client: Client,
    /// Sends no credentials
    anon: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_key(Some(ADMIN_KEY.to_string())).await
    }

    async fn with_key(admin_api_key: Option<String>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");
        let media_dir = temp_dir.path().join("media");

        // Bind first so media URLs can point at the real port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let store = Arc::new(DocumentStore::new(pool));
        let media = Arc::new(
            MediaStore::open(&media_dir, &base_url)
                .await
                .expect("Failed to open media dir"),
        );

        let config = Config {
            project_id: "caravan-test".to_string(),
            admin_api_key: admin_api_key.clone(),
            db_path,
            media_dir,
            public_base_url: base_url.clone(),
            bind_addr: addr,
            log_level: "warn".to_string(),
            log_format: LogFormat::Pretty,
            max_upload_bytes: 1024 * 1024,
        };

        let state = AppState {
            store,
            media,
            config: Arc::new(config),
        };

        let app = create_router(state);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(Duration::from_millis(100)).await;

        let mut client_builder = Client::builder();
        if let Some(key) = admin_api_key {
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert("x-api-key", key.parse().unwrap());
            client_builder = client_builder.default_headers(headers);
        }

        TestFixture {
            client: client_builder.build().unwrap(),
            anon: Client::new(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap())
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let resp = self
            .client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap())
    }

    async fn put(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let resp = self
            .client
            .put(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap())
    }

    async fn delete(&self, path: &str) -> (StatusCode, Value) {
        let resp = self.client.delete(self.url(path)).send().await.unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap())
    }

    async fn revision(&self) -> i64 {
        let (_, body) = self.get("/api/revision").await;
        body["data"]["revisionId"].as_i64().unwrap()
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .anon
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_admin_routes_require_key() {
    let fixture = TestFixture::new().await;

    // No key
    let resp = fixture
        .anon
        .get(fixture.url("/api/admin/bookings"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    // Wrong key
    let resp = fixture
        .anon
        .post(fixture.url("/api/admin/caravans"))
        .header("x-api-key", "wrong-key")
        .json(&json!({ "name": "Sneaky", "price": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // Bearer token
    let resp = fixture
        .anon
        .get(fixture.url("/api/admin/bookings"))
        .bearer_auth(ADMIN_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Public routes need nothing
    let resp = fixture
        .anon
        .get(fixture.url("/api/caravans"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_admin_routes_open_without_configured_key() {
    let fixture = TestFixture::with_key(None).await;

    let resp = fixture
        .anon
        .get(fixture.url("/api/admin/newsletter"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_caravan_crud() {
    let fixture = TestFixture::new().await;
    let initial_revision = fixture.revision().await;

    // Create
    let (status, body) = fixture
        .post(
            "/api/admin/caravans",
            json!({
                "name": "Outback 21",
                "series": "Outback",
                "price": 89990,
                "berths": 4,
                "featured": true,
                "variants": [
                    { "name": "Off-grid pack", "priceDelta": 6500 },
                    { "name": "Trade-in credit", "priceDelta": -2000 }
                ]
            }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["revisionId"], initial_revision + 1);
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert!(body["data"]["createdAt"].is_string());
    assert!(body["data"]["updatedAt"].is_string());
    assert_eq!(body["data"]["priceRange"]["min"], 87990.0);
    assert_eq!(body["data"]["priceRange"]["max"], 96490.0);

    // Read
    let (status, body) = fixture.get(&format!("/api/caravans/{}", id)).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["id"], id.as_str());
    assert_eq!(body["data"]["name"], "Outback 21");

    // Filtered list
    let (_, body) = fixture.get("/api/caravans?series=Outback&featured=true").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    let (_, body) = fixture.get("/api/caravans?series=Touring").await;
    assert!(body["data"].as_array().unwrap().is_empty());

    // Update
    let (status, body) = fixture
        .put(
            &format!("/api/admin/caravans/{}", id),
            json!({ "price": 91990, "available": false }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["price"], 91990.0);
    assert_eq!(body["data"]["available"], false);
    assert_eq!(body["data"]["name"], "Outback 21");
    assert_eq!(body["revisionId"], initial_revision + 2);

    // Delete, twice
    let (status, body) = fixture.delete(&format!("/api/admin/caravans/{}", id)).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["deleted"], true);
    assert_eq!(body["revisionId"], initial_revision + 3);

    let (status, body) = fixture.delete(&format!("/api/admin/caravans/{}", id)).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["deleted"], false);
    assert_eq!(body["revisionId"], initial_revision + 3);

    let (status, body) = fixture.get(&format!("/api/caravans/{}", id)).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_validation_errors() {
    let fixture = TestFixture::new().await;
    let initial_revision = fixture.revision().await;

    let (status, body) = fixture
        .post("/api/admin/caravans", json!({ "name": " ", "price": 100 }))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, _) = fixture
        .post("/api/admin/caravans", json!({ "name": "Negative", "price": -5 }))
        .await;
    assert_eq!(status, 400);

    let (status, _) = fixture
        .put("/api/admin/caravans/missing", json!({ "name": "Ghost" }))
        .await;
    assert_eq!(status, 404);

    // Nothing was written
    assert_eq!(fixture.revision().await, initial_revision);
}

#[tokio::test]
async fn test_blog_slugs_and_paged_listing() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post(
            "/api/admin/blogs",
            json!({ "title": "Hello, World! A Trip", "tags": ["Travel"], "popular": true }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["slug"], "hello-world-a-trip");
    assert!(body["data"]["lastUpdated"].is_string());

    let (_, body) = fixture
        .post("/api/admin/blogs", json!({ "title": "Hello World a trip" }))
        .await;
    assert_eq!(body["data"]["slug"], "hello-world-a-trip-2");

    for i in 0..11 {
        let tags = if i % 3 == 0 { json!(["Coffee"]) } else { json!(["tips"]) };
        let (status, _) = fixture
            .post(
                "/api/admin/blogs",
                json!({ "title": format!("Post {}", i), "tags": tags }),
            )
            .await;
        assert_eq!(status, 200);
    }

    // 13 posts in pages of 6
    let (_, body) = fixture.get("/api/blogs").await;
    assert_eq!(body["data"]["totalItems"], 13);
    assert_eq!(body["data"]["totalPages"], 3);
    assert_eq!(body["data"]["pageSize"], 6);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 6);
    assert_eq!(body["data"]["items"][0]["title"], "Post 10");

    let (_, body) = fixture.get("/api/blogs?page=3").await;
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);

    let (_, body) = fixture.get("/api/blogs?page=99").await;
    assert_eq!(body["data"]["page"], 3);
    let (_, body) = fixture.get("/api/blogs?page=0").await;
    assert_eq!(body["data"]["page"], 1);

    // Oldest first puts the first post on top
    let (_, body) = fixture.get("/api/blogs?sort=oldest").await;
    assert_eq!(body["data"]["items"][0]["slug"], "hello-world-a-trip");

    // Category filtering
    let (_, body) = fixture.get("/api/blogs?category=Coffee").await;
    assert_eq!(body["data"]["totalItems"], 4);
    let (_, body) = fixture.get("/api/blogs?category=Travel%20Tips").await;
    assert_eq!(body["data"]["totalItems"], 8);
    let (_, body) = fixture.get("/api/blogs?category=All").await;
    assert_eq!(body["data"]["totalItems"], 13);

    // Slug lookup and popular
    let (status, body) = fixture.get("/api/blogs/hello-world-a-trip-2").await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["title"], "Hello World a trip");

    let (_, body) = fixture.get("/api/blogs/popular").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Articles are a separate feed
    let (_, body) = fixture.get("/api/articles").await;
    assert_eq!(body["data"]["totalItems"], 0);
    assert_eq!(body["data"]["totalPages"], 1);

    let (status, _) = fixture.get("/api/articles/hello-world-a-trip").await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_post_update_and_delete() {
    let fixture = TestFixture::new().await;

    let (_, body) = fixture
        .post("/api/admin/articles", json!({ "title": "Wheel bearings" }))
        .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = fixture
        .put(
            &format!("/api/admin/articles/{}", id),
            json!({ "title": "Wheel bearing care", "slug": "Bearing Care" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["slug"], "bearing-care");

    let (status, _) = fixture.get("/api/articles/bearing-care").await;
    assert_eq!(status, 200);

    let (status, body) = fixture.delete(&format!("/api/admin/articles/{}", id)).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["deleted"], true);
}

#[tokio::test]
async fn test_reviews_and_summary() {
    let fixture = TestFixture::new().await;

    for (rating, date) in [(5, "2024-03-01"), (4, "2024-05-01"), (3, "2023-12-25")] {
        let (status, body) = fixture
            .post(
                "/api/reviews",
                json!({
                    "author": "Pat",
                    "caravanId": "outback-21",
                    "rating": rating,
                    "body": "Great van",
                    "date": date,
                    "verified": true
                }),
            )
            .await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["verified"], false);
    }

    let (status, _) = fixture
        .post(
            "/api/reviews",
            json!({ "author": "Pat", "rating": 9, "body": "Too good" }),
        )
        .await;
    assert_eq!(status, 400);

    let (_, body) = fixture.get("/api/reviews?caravanId=outback-21").await;
    let dates: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["date"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(dates, vec!["2024-05-01", "2024-03-01", "2023-12-25"]);

    let (_, body) = fixture.get("/api/reviews/summary/outback-21").await;
    assert_eq!(body["data"]["count"], 3);
    assert_eq!(body["data"]["averageRating"], 4.0);
}

#[tokio::test]
async fn test_inquiry_workflow() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post(
            "/api/inquiries/quote",
            json!({
                "name": "Jamie",
                "email": "jamie@example.com",
                "subject": "Outback 21",
                "postcode": "4000",
                "dealer": "Brisbane Tow"
            }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "New");
    assert_eq!(body["data"]["kind"], "quote");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    // Unknown kind and missing required field
    let (status, _) = fixture
        .post("/api/inquiries/raffle", json!({ "name": "x", "email": "x@y.z" }))
        .await;
    assert_eq!(status, 404);
    let (status, body) = fixture
        .post(
            "/api/inquiries/warranty",
            json!({ "name": "Jamie", "email": "jamie@example.com" }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    // Status moves, and repeating it changes nothing
    let path = format!("/api/admin/inquiries/quote/{}/status", id);
    let (status, body) = fixture.put(&path, json!({ "status": "Contacted" })).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "Contacted");
    let revision = body["revisionId"].as_i64().unwrap();

    let (status, body) = fixture.put(&path, json!({ "status": "Contacted" })).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "Contacted");
    assert_eq!(body["revisionId"], revision);

    // Not a quote status
    let (status, _) = fixture.put(&path, json!({ "status": "Sent" })).await;
    assert_eq!(status, 400);

    let (_, body) = fixture.get("/api/admin/inquiries/quote?q=brisbane").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    let (_, body) = fixture.get("/api/admin/inquiries/quote?status=New").await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (_, body) = fixture.get("/api/admin/inquiries/quote/stats").await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["statuses"][1]["status"], "Contacted");
    assert_eq!(body["data"]["statuses"][1]["count"], 1);

    let (status, _) = fixture
        .get(&format!("/api/admin/inquiries/quote/{}", id))
        .await;
    assert_eq!(status, 200);
    let (status, _) = fixture
        .get(&format!("/api/admin/inquiries/finance/{}", id))
        .await;
    assert_eq!(status, 404);

    let (_, body) = fixture
        .delete(&format!("/api/admin/inquiries/quote/{}", id))
        .await;
    assert_eq!(body["data"]["deleted"], true);
}

#[tokio::test]
async fn test_bookings() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post(
            "/api/bookings",
            json!({
                "caravanId": "outback-21",
                "name": "Morgan",
                "email": "morgan@example.com",
                "preferredDate": "2024-10-12"
            }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "Pending");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = fixture
        .put(
            &format!("/api/admin/bookings/{}/status", id),
            json!({ "status": "Confirmed" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "Confirmed");

    let (_, body) = fixture.get("/api/admin/bookings?status=confirmed").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_newsletter_subscribe_twice() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post("/api/newsletter", json!({ "email": "Traveller@Example.com" }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["alreadySubscribed"], false);
    assert_eq!(body["data"]["subscriber"]["email"], "traveller@example.com");

    let (_, body) = fixture
        .post("/api/newsletter", json!({ "email": " traveller@example.com" }))
        .await;
    assert_eq!(body["data"]["alreadySubscribed"], true);

    let (status, _) = fixture
        .post("/api/newsletter", json!({ "email": "not-an-email" }))
        .await;
    assert_eq!(status, 400);

    let (_, body) = fixture.get("/api/admin/newsletter").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_dealer_locator() {
    let fixture = TestFixture::new().await;

    for dealer in [
        json!({ "name": "Perth Caravans", "state": "WA", "latitude": -31.95, "longitude": 115.86 }),
        json!({ "name": "Adelaide RV", "state": "SA", "latitude": -34.93, "longitude": 138.60 }),
        json!({ "name": "Geelong Tow", "state": "VIC", "latitude": -38.15, "longitude": 144.36 }),
    ] {
        let (status, _) = fixture.post("/api/admin/dealers", dealer).await;
        assert_eq!(status, 200);
    }

    let (_, body) = fixture.get("/api/dealers?state=vic").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Melbourne
    let (status, body) = fixture
        .get("/api/dealers/nearest?lat=-37.81&lng=144.96&limit=2")
        .await;
    assert_eq!(status, 200);
    let nearest = body["data"].as_array().unwrap();
    assert_eq!(nearest.len(), 2);
    assert_eq!(nearest[0]["name"], "Geelong Tow");
    assert_eq!(nearest[1]["name"], "Adelaide RV");
    assert!(nearest[0]["distanceKm"].as_f64().unwrap() < 100.0);

    let (status, _) = fixture
        .post("/api/admin/dealers", json!({ "name": "Nowhere", "latitude": 120.0 }))
        .await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_media_upload_and_serve() {
    let fixture = TestFixture::new().await;
    let bytes = b"\x89PNG\r\n\x1a\nfake image".to_vec();

    let part = multipart::Part::bytes(bytes.clone())
        .file_name("floorplan.png")
        .mime_str("image/png")
        .unwrap();
    let form = multipart::Form::new().part("file", part);

    let resp = fixture
        .client
        .post(fixture.url("/api/admin/uploads"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let url = body["data"]["url"].as_str().unwrap().to_string();
    assert!(url.starts_with(&fixture.url("/media/")));
    assert!(url.ends_with(".png"));
    assert_eq!(body["data"]["size"], bytes.len());

    let served = fixture.anon.get(&url).send().await.unwrap();
    assert_eq!(served.status(), 200);
    assert_eq!(served.bytes().await.unwrap().to_vec(), bytes);

    // Disallowed type
    let part = multipart::Part::bytes(b"<script>".to_vec()).file_name("x.html");
    let resp = fixture
        .client
        .post(fixture.url("/api/admin/uploads"))
        .multipart(multipart::Form::new().part("file", part))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Missing field
    let resp = fixture
        .client
        .post(fixture.url("/api/admin/uploads"))
        .multipart(multipart::Form::new().text("caption", "no file"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Uploads are admin only
    let part = multipart::Part::bytes(bytes).file_name("a.png");
    let resp = fixture
        .anon
        .post(fixture.url("/api/admin/uploads"))
        .multipart(multipart::Form::new().part("file", part))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_change_events_stream() {
    let fixture = TestFixture::new().await;

    let mut stream = fixture
        .anon
        .get(fixture.url("/api/events"))
        .send()
        .await
        .unwrap();
    assert_eq!(stream.status(), 200);

    let mut received = String::new();
    while !received.contains("event: connected") {
        let chunk = tokio::time::timeout(Duration::from_secs(5), stream.chunk())
            .await
            .expect("timed out waiting for connected event")
            .unwrap()
            .expect("stream ended");
        received.push_str(&String::from_utf8_lossy(&chunk));
    }

    let (_, body) = fixture
        .post("/api/admin/caravans", json!({ "name": "Event Van", "price": 1 }))
        .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    while !received.contains(&id) {
        let chunk = tokio::time::timeout(Duration::from_secs(5), stream.chunk())
            .await
            .expect("timed out waiting for change event")
            .unwrap()
            .expect("stream ended");
        received.push_str(&String::from_utf8_lossy(&chunk));
    }

    assert!(received.contains("event: change"));
    assert!(received.contains("\"collection\":\"caravans\""));
    assert!(received.contains("\"action\":\"created\""));
}

#[tokio::test]
async fn test_revision_increments_on_writes() {
    let fixture = TestFixture::new().await;
    let initial = fixture.revision().await;

    let (_, body) = fixture
        .post("/api/admin/dealers", json!({ "name": "Revision Test" }))
        .await;
    assert_eq!(body["revisionId"], initial + 1);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = fixture
        .put(&format!("/api/admin/dealers/{}", id), json!({ "state": "NT" }))
        .await;
    assert_eq!(body["revisionId"], initial + 2);

    let (_, body) = fixture.delete(&format!("/api/admin/dealers/{}", id)).await;
    assert_eq!(body["revisionId"], initial + 3);

    let (_, body) = fixture.get("/api/revision").await;
    assert_eq!(body["data"]["projectId"], "caravan-test");
    assert_eq!(body["data"]["revisionId"], initial + 3);
}
