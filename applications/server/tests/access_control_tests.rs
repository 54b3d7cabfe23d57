/// Access control integration tests
/// Role resolution against a real SQLite store
mod common;

use chorus_core::requests::RemoveContributorRequest;
use chorus_core::{ErrorCode, PlaylistId, Role};
use chorus_server::services::AccessControl;
use common::TestApp;

fn access(app: &TestApp) -> AccessControl {
    AccessControl::new(app.store.clone())
}

/// Owner resolves to ADMIN without any contributor row
#[tokio::test]
async fn test_owner_is_admin_without_row() {
    let app = TestApp::new().await;
    let owner = app.user("owner").await;
    let playlist = app.playlist(&owner, "Road trip", false).await;

    let grant = access(&app)
        .resolve_access(&playlist.id, &owner.id, Some(Role::Admin))
        .await
        .unwrap();

    assert!(grant.is_owner);
    assert_eq!(grant.role, Role::Admin);
    assert_eq!(grant.playlist.id, playlist.id);
}

/// A role satisfies every requirement at or below it and nothing above
#[tokio::test]
async fn test_roles_are_monotonic() {
    let app = TestApp::new().await;
    let owner = app.user("owner").await;
    let editor = app.user("editor").await;
    let playlist = app.playlist(&owner, "Focus", false).await;
    app.grant(&owner, &playlist, &editor, Role::Editor).await;

    let access = access(&app);
    for required in [None, Some(Role::Viewer), Some(Role::Editor)] {
        let grant = access
            .resolve_access(&playlist.id, &editor.id, required)
            .await
            .unwrap();
        assert!(!grant.is_owner);
        assert_eq!(grant.role, Role::Editor);
    }

    let err = access
        .resolve_access(&playlist.id, &editor.id, Some(Role::Admin))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

/// Users with no contributor row are forbidden, even without a required role
#[tokio::test]
async fn test_stranger_is_forbidden() {
    let app = TestApp::new().await;
    let owner = app.user("owner").await;
    let stranger = app.user("stranger").await;
    let playlist = app.playlist(&owner, "Private", false).await;

    let err = access(&app)
        .resolve_access(&playlist.id, &stranger.id, None)
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::Forbidden);
}

/// A removed grant stops resolving immediately
#[tokio::test]
async fn test_removed_contributor_loses_access() {
    let app = TestApp::new().await;
    let owner = app.user("owner").await;
    let viewer = app.user("viewer").await;
    let playlist = app.playlist(&owner, "Shared", false).await;
    app.grant(&owner, &playlist, &viewer, Role::Viewer).await;

    let access = access(&app);
    access
        .resolve_access(&playlist.id, &viewer.id, Some(Role::Viewer))
        .await
        .unwrap();

    app.state
        .playlists
        .remove_contributor(
            &owner,
            RemoveContributorRequest {
                playlist_id: playlist.id.clone(),
                user_id: viewer.id.clone(),
            },
        )
        .await
        .unwrap();

    let err = access
        .resolve_access(&playlist.id, &viewer.id, Some(Role::Viewer))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

/// Soft-deleted and unknown playlists are NotFound, even for the owner
#[tokio::test]
async fn test_deleted_playlist_is_not_found() {
    let app = TestApp::new().await;
    let owner = app.user("owner").await;
    let playlist = app.playlist(&owner, "Gone soon", true).await;

    app.state
        .playlists
        .delete_playlist(&owner, &playlist.id)
        .await
        .unwrap();

    let access = access(&app);
    let err = access
        .resolve_access(&playlist.id, &owner.id, None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotFound);

    let err = access
        .resolve_read_access(&PlaylistId::generate(), &owner.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotFound);
}

/// Public playlists are readable by anyone, private ones are not
#[tokio::test]
async fn test_public_read_bypass() {
    let app = TestApp::new().await;
    let owner = app.user("owner").await;
    let stranger = app.user("stranger").await;
    let public = app.playlist(&owner, "Open", true).await;
    let private = app.playlist(&owner, "Closed", false).await;

    let access = access(&app);
    let readable = access
        .resolve_read_access(&public.id, &stranger.id)
        .await
        .unwrap();
    assert_eq!(readable.id, public.id);

    // Public visibility does not grant a role
    let err = access
        .resolve_access(&public.id, &stranger.id, Some(Role::Viewer))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::Forbidden);

    let err = access
        .resolve_read_access(&private.id, &stranger.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

/// Only the owner passes the ownership check, even against an ADMIN contributor
#[tokio::test]
async fn test_require_owner() {
    let app = TestApp::new().await;
    let owner = app.user("owner").await;
    let admin = app.user("admin").await;
    let playlist = app.playlist(&owner, "Mine", false).await;
    app.grant(&owner, &playlist, &admin, Role::Admin).await;

    let access = access(&app);
    assert!(access.require_owner(&playlist.id, &owner.id).await.is_ok());

    let err = access
        .require_owner(&playlist.id, &admin.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::Forbidden);
}
