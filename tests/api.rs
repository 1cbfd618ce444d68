//! End-to-end tests that drive the router the way a client would, against an
//! in-memory database and a temporary upload directory.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use moodtunes_lib::database::DatabaseManager;
use moodtunes_lib::routes;
use moodtunes_lib::uploads::UploadStore;
use moodtunes_lib::AppState;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    _uploads: TempDir,
}

impl TestApp {
    async fn new() -> Self {
        let db = DatabaseManager::in_memory().await.unwrap();
        let tmp = TempDir::new().unwrap();
        let uploads = UploadStore::open(tmp.path().join("uploads")).await.unwrap();
        let state = AppState::new(db.pool, uploads);

        Self {
            router: routes::router(state, 1024 * 1024),
            _uploads: tmp,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let (status, bytes) = self.send(request).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn register(&self, username: &str, password: &str) -> i64 {
        let email = format!("{}@example.com", username);
        let (status, _) = self
            .call(
                Method::POST,
                "/api/register",
                Some(json!({ "username": username, "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = self
            .call(
                Method::POST,
                "/api/login",
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["user"]["id"].as_i64().unwrap()
    }
}

fn songs(pairs: &[(&str, &str)]) -> Value {
    Value::Array(
        pairs
            .iter()
            .map(|(title, yt)| json!({ "title": title, "artist": "Someone", "youtube_id": yt }))
            .collect(),
    )
}

#[tokio::test]
async fn test_register_twice_is_a_conflict() {
    let app = TestApp::new().await;
    let body = json!({ "username": "mika", "email": "mika@example.com", "password": "pw" });

    let (status, first) = app.call(Method::POST, "/api/register", Some(body.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["message"], "User registered! You can now login.");

    let (status, second) = app.call(Method::POST, "/api/register", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(second["error"], "Username already taken.");
    assert_eq!(second["message"], "Username already taken.");

    let (status, third) = app
        .call(
            Method::POST,
            "/api/register",
            Some(json!({ "username": "other", "email": "mika@example.com", "password": "pw" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(third["error"], "Email already exists.");
}

#[tokio::test]
async fn test_malformed_requests_answer_with_json_errors() {
    let app = TestApp::new().await;

    let (status, body) = app.call(Method::POST, "/api/login", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("email"));

    let (status, body) = app.call(Method::GET, "/api/profile/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = app
        .call(Method::GET, "/api/admin/activity?limit=lots", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = app
        .call(Method::POST, "/api/users/1/upload", Some(json!({ "profile_pic": "x" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_login_shape_and_rejection() {
    let app = TestApp::new().await;
    app.register("mika", "pw").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/login",
            Some(json!({ "email": "mika@example.com", "password": "pw" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "mika");
    assert_eq!(body["user"]["is_admin"], false);
    assert!(body["user"]["profile_pic"].is_null());
    assert!(body["user"].get("password_hash").is_none());

    let (status, body) = app
        .call(
            Method::POST,
            "/api/login",
            Some(json!({ "email": "mika@example.com", "password": "nope" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn test_profile_aggregation_over_http() {
    let app = TestApp::new().await;
    let user = app.register("mika", "pw").await;

    let (status, created) = app
        .call(
            Method::POST,
            "/api/playlists/create",
            Some(json!({
                "userId": user,
                "name": "Sunday",
                "mood": "calm",
                "songs": songs(&[("One", "y1"), ("Two", "y2")]),
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["success"], true);
    let full_id = created["playlistId"].as_i64().unwrap();

    let (status, created) = app
        .call(
            Method::POST,
            "/api/playlists/create",
            Some(json!({ "userId": user, "name": "Empty", "songs": [] })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let empty_id = created["playlistId"].as_i64().unwrap();

    let (status, profile) = app
        .call(Method::GET, &format!("/api/profile/{}", user), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let playlists = profile.as_array().unwrap();
    assert_eq!(playlists.len(), 2);
    assert_eq!(playlists[0]["id"], empty_id);
    assert_eq!(playlists[0]["mood"], "General");
    assert_eq!(playlists[0]["songs"].as_array().unwrap().len(), 0);
    assert_eq!(playlists[1]["id"], full_id);
    assert_eq!(playlists[1]["name"], "Sunday");
    let titles: Vec<&str> = playlists[1]["songs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["One", "Two"]);
    assert_eq!(playlists[1]["songs"][0]["youtube_id"], "y1");
}

#[tokio::test]
async fn test_saving_known_song_reuses_row() {
    let app = TestApp::new().await;
    let user = app.register("mika", "pw").await;

    for name in ["A", "B"] {
        let (status, _) = app
            .call(
                Method::POST,
                "/api/playlists/create",
                Some(json!({ "userId": user, "name": name, "songs": songs(&[("Same", "shared")]) })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, stats) = app.call(Method::GET, "/api/admin/stats", None).await;
    assert_eq!(stats["totalSongs"], 1);
    assert_eq!(stats["totalPlaylists"], 2);
}

#[tokio::test]
async fn test_playlist_for_unknown_user_is_not_found() {
    let app = TestApp::new().await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/playlists/create",
            Some(json!({ "userId": 99, "name": "Ghost", "songs": songs(&[("x", "x")]) })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn test_remove_song_and_delete_playlist() {
    let app = TestApp::new().await;
    let user = app.register("mika", "pw").await;
    let (_, created) = app
        .call(
            Method::POST,
            "/api/playlists/create",
            Some(json!({
                "userId": user,
                "name": "Mix",
                "songs": songs(&[("Keep", "k1"), ("Drop", "d1"), ("Also keep", "k2")]),
            })),
        )
        .await;
    let playlist_id = created["playlistId"].as_i64().unwrap();

    let (_, profile) = app.call(Method::GET, &format!("/api/profile/{}", user), None).await;
    let drop_id = profile[0]["songs"][1]["id"].as_i64().unwrap();

    let (status, body) = app
        .call(
            Method::DELETE,
            &format!("/api/playlists/{}/songs/{}", playlist_id, drop_id),
            Some(json!({ "userId": user })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, profile) = app.call(Method::GET, &format!("/api/profile/{}", user), None).await;
    let titles: Vec<&str> = profile[0]["songs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Keep", "Also keep"]);

    // No body at all is accepted too.
    let (status, _) = app
        .call(Method::DELETE, &format!("/api/playlists/{}", playlist_id), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, profile) = app.call(Method::GET, &format!("/api/profile/{}", user), None).await;
    assert_eq!(profile, json!([]));

    let (_, feed) = app.call(Method::GET, "/api/admin/activity", None).await;
    let actions: Vec<&str> = feed
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action_type"].as_str().unwrap())
        .collect();
    assert!(actions.contains(&"song_removed"));
    assert!(!actions.contains(&"playlist_deleted"));
}

#[tokio::test]
async fn test_mood_generation_empty_is_not_an_error() {
    let app = TestApp::new().await;

    let (status, body) = app
        .call(Method::GET, "/api/mood/generate?mood=euphoric", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["songs"], json!([]));
    assert_eq!(body["message"], "No songs found for this mood.");

    app.call(
        Method::POST,
        "/api/admin/songs",
        Some(json!({ "youtube_id": "e1", "title": "Lift", "artist": "Up", "mood": "euphoric" })),
    )
    .await;

    let (status, body) = app
        .call(Method::GET, "/api/mood/generate?mood=euphoric", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["songs"][0]["title"], "Lift");
    assert!(body.get("message").is_none());
}

#[tokio::test]
async fn test_search_finds_by_title_and_artist() {
    let app = TestApp::new().await;
    for (yt, title, artist) in [("s1", "Hurt", "Johnny Cash"), ("s2", "Ring of Fire", "Johnny Cash"), ("s3", "Creep", "Radiohead")] {
        let (status, _) = app
            .call(
                Method::POST,
                "/api/admin/songs",
                Some(json!({ "youtube_id": yt, "title": title, "artist": artist, "mood": "sad" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = app.call(Method::GET, "/api/search?q=johnny", None).await;
    assert_eq!(body["songs"].as_array().unwrap().len(), 2);

    let (_, body) = app.call(Method::GET, "/api/search?q=Creep", None).await;
    assert_eq!(body["songs"][0]["artist"], "Radiohead");
}

#[tokio::test]
async fn test_delete_account_cascades_over_http() {
    let app = TestApp::new().await;
    let user = app.register("mika", "pw").await;
    app.call(
        Method::POST,
        "/api/playlists/create",
        Some(json!({ "userId": user, "name": "Mine", "songs": songs(&[("S", "s")]) })),
    )
    .await;

    let (status, _) = app
        .call(
            Method::DELETE,
            &format!("/api/users/{}/delete-account", user),
            Some(json!({ "password": "wrong" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .call(
            Method::DELETE,
            &format!("/api/users/{}/delete-account", user),
            Some(json!({ "password": "pw" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, profile) = app.call(Method::GET, &format!("/api/profile/{}", user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile, json!([]));

    let (_, stats) = app.call(Method::GET, "/api/admin/stats", None).await;
    assert_eq!(stats["totalUsers"], 0);
    assert_eq!(stats["totalPlaylists"], 0);
    assert_eq!(stats["totalSongs"], 1);
    // Only the tombstone survives.
    assert_eq!(stats["totalLogs"], 1);

    let (_, feed) = app.call(Method::GET, "/api/admin/activity", None).await;
    assert_eq!(feed[0]["action_type"], "account_deleted");
    assert_eq!(feed[0]["username"], "System");
    assert_eq!(
        feed[0]["details"],
        "User @mika has permanently deleted their account."
    );

    let (status, _) = app
        .call(
            Method::DELETE,
            &format!("/api/users/{}/delete-account", user),
            Some(json!({ "password": "pw" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_profile_settings_routes() {
    let app = TestApp::new().await;
    let user = app.register("mika", "old").await;

    let (status, body) = app
        .call(
            Method::PUT,
            &format!("/api/users/{}/update", user),
            Some(json!({ "username": "mika_k", "profile_pic": null })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile updated");

    let (status, _) = app
        .call(
            Method::PUT,
            &format!("/api/users/{}/change-password", user),
            Some(json!({ "currentPassword": "bad", "newPassword": "new" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .call(
            Method::PUT,
            &format!("/api/users/{}/change-password", user),
            Some(json!({ "currentPassword": "old", "newPassword": "new" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .call(
            Method::POST,
            "/api/login",
            Some(json!({ "email": "mika@example.com", "password": "new" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "mika_k");

    let (status, _) = app
        .call(
            Method::PUT,
            "/api/users/999/change-password",
            Some(json!({ "currentPassword": "old", "newPassword": "new" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_panel_routes() {
    let app = TestApp::new().await;
    let mika = app.register("mika", "pw").await;
    let noor = app.register("noor", "pw").await;
    app.call(
        Method::POST,
        "/api/playlists/create",
        Some(json!({ "userId": noor, "name": "Noor's", "songs": songs(&[("Tune", "t1")]) })),
    )
    .await;

    let (status, _) = app
        .call(
            Method::PUT,
            &format!("/api/admin/users/{}/toggle-admin", mika),
            Some(json!({ "is_admin": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, users) = app.call(Method::GET, "/api/admin/users", None).await;
    assert_eq!(users[0]["username"], "mika");
    assert_eq!(users[0]["is_admin"], true);
    assert_eq!(users[1]["email"], "noor@example.com");

    let (_, playlists) = app.call(Method::GET, "/api/admin/playlists", None).await;
    assert_eq!(playlists[0]["user_id"], noor);

    let (status, body) = app
        .call(
            Method::POST,
            "/api/admin/songs",
            Some(json!({ "youtube_id": "t1", "title": "Dup", "artist": "X" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Song already exists.");

    let (status, body) = app
        .call(Method::DELETE, &format!("/api/admin/users/{}", noor), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted");

    let (_, feed) = app.call(Method::GET, "/api/admin/activity?limit=1", None).await;
    assert_eq!(feed.as_array().unwrap().len(), 1);
    assert_eq!(feed[0]["action_type"], "admin_action");
    assert_eq!(feed[0]["details"], "Admin deleted user: @noor");

    let (_, stats) = app.call(Method::GET, "/api/admin/stats", None).await;
    assert_eq!(stats["totalUsers"], 1);
    assert_eq!(stats["totalPlaylists"], 0);

    let (status, _) = app.call(Method::DELETE, "/api/admin/songs/1", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, stats) = app.call(Method::GET, "/api/admin/stats", None).await;
    assert_eq!(stats["totalSongs"], 0);
}

#[tokio::test]
async fn test_upload_then_serve_profile_picture() {
    let app = TestApp::new().await;
    let user = app.register("mika", "pw").await;

    let boundary = "moodtunes-test-boundary";
    let payload = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"profile_pic\"; filename=\"me.png\"\r\nContent-Type: image/png\r\n\r\nfake png bytes\r\n--{b}--\r\n",
        b = boundary
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/users/{}/upload", user))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(payload))
        .unwrap();

    let (status, bytes) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    let path = body["profile_pic"].as_str().unwrap().to_string();
    assert!(path.starts_with(&format!("/uploads/{}-", user)));
    assert!(path.ends_with(".png"));

    let (status, served) = app
        .send(Request::builder().uri(&path).body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(served, b"fake png bytes");

    let (_, login) = app
        .call(
            Method::POST,
            "/api/login",
            Some(json!({ "email": "mika@example.com", "password": "pw" })),
        )
        .await;
    assert_eq!(login["user"]["profile_pic"], path.as_str());
}

#[tokio::test]
async fn test_upload_without_file_is_rejected() {
    let app = TestApp::new().await;
    let user = app.register("mika", "pw").await;

    let boundary = "moodtunes-test-boundary";
    let payload = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"caption\"\r\n\r\nhello\r\n--{b}--\r\n",
        b = boundary
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/users/{}/upload", user))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(payload))
        .unwrap();

    let (status, bytes) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "No file uploaded");
}
