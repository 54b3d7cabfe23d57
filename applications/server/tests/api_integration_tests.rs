/// API integration tests
/// Tests complete HTTP request/response cycles with real database
mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chorus_core::Role;
use chorus_server::api;
use common::TestApp;
use serde_json::{json, Value};
use tower::util::ServiceExt;

fn router(app: &TestApp) -> Router {
    api::create_router(app.state.clone())
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn create_playlist(router: &Router, token: &str, body: Value) -> Value {
    let (status, playlist) = send(
        router,
        request(Method::POST, "/api/playlists", Some(token), Some(body)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    playlist
}

/// Protected routes reject missing and forged credentials
#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::new().await;
    let router = router(&app);

    let (status, body) = send(&router, request(Method::GET, "/api/playlists", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");

    let (status, _) = send(
        &router,
        request(Method::GET, "/api/me", Some("forged.token.value"), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

/// Health and public listings need no credentials
#[tokio::test]
async fn test_public_routes() {
    let app = TestApp::new().await;
    let owner = app.user("owner").await;
    app.playlist(&owner, "Everyone", true).await;
    app.playlist(&owner, "Just me", false).await;
    let router = router(&app);

    let (status, health) = send(&router, request(Method::GET, "/api/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "ok");

    let (status, public) = send(
        &router,
        request(Method::GET, "/api/playlists/public", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let public = public.as_array().unwrap();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0]["title"], "Everyone");

    let (status, stats) = send(&router, request(Method::GET, "/api/stats", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats, json!({ "connections": 0, "subscriptions": 0 }));
}

/// The token's principal is the caller
#[tokio::test]
async fn test_me_returns_caller() {
    let app = TestApp::new().await;
    let user = app.user("listener").await;
    let token = app.token(&user);

    let (status, me) = send(&router(&app), request(Method::GET, "/api/me", Some(&token), None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], user.id.as_str());
    assert_eq!(me["username"], "listener");
}

/// Creating a playlist returns 201 with defaults applied
#[tokio::test]
async fn test_create_playlist() {
    let app = TestApp::new().await;
    let owner = app.user("owner").await;
    let token = app.token(&owner);
    let router = router(&app);

    let playlist = create_playlist(&router, &token, json!({ "title": "  Morning  " })).await;

    assert_eq!(playlist["title"], "Morning");
    assert_eq!(playlist["description"], "");
    assert_eq!(playlist["isPublic"], true);
    assert_eq!(playlist["ownerId"], owner.id.as_str());

    let (status, mine) = send(
        &router,
        request(Method::GET, "/api/playlists/mine", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);
}

/// Validation failures are 400 with per-field details
#[tokio::test]
async fn test_validation_error_shape() {
    let app = TestApp::new().await;
    let owner = app.user("owner").await;
    let token = app.token(&owner);
    let router = router(&app);

    let (status, body) = send(
        &router,
        request(
            Method::POST,
            "/api/playlists",
            Some(&token),
            Some(json!({ "title": "" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["fields"][0]["field"], "title");

    let (status, body) = send(
        &router,
        request(Method::GET, "/api/playlists/not-a-uuid", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    // Malformed JSON is a validation error too
    let malformed = Request::builder()
        .method(Method::POST)
        .uri("/api/playlists")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let (status, body) = send(&router, malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

/// Song and contributor flow over HTTP, with 403/404/409 on the error paths
#[tokio::test]
async fn test_collaboration_over_http() {
    let app = TestApp::new().await;
    let owner = app.user("owner").await;
    let editor = app.user("editor").await;
    let outsider = app.user("outsider").await;
    let owner_token = app.token(&owner);
    let editor_token = app.token(&editor);
    let outsider_token = app.token(&outsider);
    let router = router(&app);

    let playlist = create_playlist(
        &router,
        &owner_token,
        json!({ "title": "Team", "isPublic": false }),
    )
    .await;
    let playlist_id = playlist["id"].as_str().unwrap().to_string();
    let contributors_uri = format!("/api/playlists/{playlist_id}/contributors");
    let songs_uri = format!("/api/playlists/{playlist_id}/songs");

    let (status, contributor) = send(
        &router,
        request(
            Method::POST,
            &contributors_uri,
            Some(&owner_token),
            Some(json!({ "userId": editor.id.as_str(), "role": "EDITOR" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(contributor["role"], "EDITOR");

    let (status, body) = send(
        &router,
        request(
            Method::POST,
            &contributors_uri,
            Some(&owner_token),
            Some(json!({ "userId": editor.id.as_str(), "role": "VIEWER" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");

    // Song upload goes through the API
    let (status, song) = send(
        &router,
        request(
            Method::POST,
            "/api/songs",
            Some(&editor_token),
            Some(json!({
                "title": "Anthem",
                "artist": "The Band",
                "duration": 240,
                "fileId": "file-anthem",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let song_id = song["id"].as_str().unwrap().to_string();

    let (status, entry) = send(
        &router,
        request(
            Method::POST,
            &songs_uri,
            Some(&editor_token),
            Some(json!({ "songId": song_id })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["order"], 0);
    assert_eq!(entry["addedBy"], editor.id.as_str());

    let (status, body) = send(
        &router,
        request(Method::GET, &songs_uri, Some(&outsider_token), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    let (status, entries) = send(
        &router,
        request(
            Method::PUT,
            &format!("{songs_uri}/order"),
            Some(&editor_token),
            Some(json!({ "songIds": [song_id] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entries[0]["order"], 0);

    let (status, _) = send(
        &router,
        request(
            Method::DELETE,
            &format!("{songs_uri}/{song_id}"),
            Some(&editor_token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &router,
        request(
            Method::DELETE,
            &format!("{songs_uri}/{song_id}"),
            Some(&editor_token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    // Editors cannot delete the playlist
    let (status, _) = send(
        &router,
        request(
            Method::DELETE,
            &format!("/api/playlists/{playlist_id}"),
            Some(&editor_token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

/// Role updates and removal through the contributor routes
#[tokio::test]
async fn test_contributor_routes() {
    let app = TestApp::new().await;
    let owner = app.user("owner").await;
    let member = app.user("member").await;
    let playlist = app.playlist(&owner, "Club", false).await;
    app.grant(&owner, &playlist, &member, Role::Viewer).await;
    let token = app.token(&owner);
    let router = router(&app);

    let member_uri = format!("/api/playlists/{}/contributors/{}", playlist.id, member.id);

    let (status, updated) = send(
        &router,
        request(
            Method::PUT,
            &member_uri,
            Some(&token),
            Some(json!({ "role": "ADMIN" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["role"], "ADMIN");

    let (status, body) = send(
        &router,
        request(
            Method::PUT,
            &member_uri,
            Some(&token),
            Some(json!({ "role": "OWNER" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["fields"][0]["field"], "role");

    let (status, _) = send(&router, request(Method::DELETE, &member_uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, contributors) = send(
        &router,
        request(
            Method::GET,
            &format!("/api/playlists/{}/contributors", playlist.id),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(contributors.as_array().unwrap().is_empty());
}

