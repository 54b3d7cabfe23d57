//! Integration tests for the contributors slice


use chorus_core::{types::*, ErrorCode};
use chorus_storage::contributors;
use test_helpers::*;

fn grant(playlist_id: &PlaylistId, user_id: &UserId, role: Role, by: &UserId) -> NewContributor {
    NewContributor {
        playlist_id: playlist_id.clone(),
        user_id: user_id.clone(),
        role,
        invited_by: by.clone(),
    }
}

#[tokio::test]
async fn test_insert_and_find_contributor() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let owner = create_test_user(pool, "owner").await;
    let guest = create_test_user(pool, "guest").await;
    let playlist = create_test_playlist(pool, "Shared", &owner).await;

    let created = contributors::insert(pool, grant(&playlist, &guest, Role::Editor, &owner))
        .await
        .unwrap();
    assert_eq!(created.role, Role::Editor);
    assert_eq!(created.invited_by, owner);
    assert!(created.is_active());

    let found = contributors::find(pool, &playlist, &guest)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, created.id);

    let ids = contributors::get_playlist_ids_for_user(pool, &guest)
        .await
        .unwrap();
    assert_eq!(ids, vec![playlist]);
}

#[tokio::test]
async fn test_second_row_for_pair_is_conflict() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let owner = create_test_user(pool, "owner").await;
    let guest = create_test_user(pool, "guest").await;
    let playlist = create_test_playlist(pool, "Shared", &owner).await;

    contributors::insert(pool, grant(&playlist, &guest, Role::Viewer, &owner))
        .await
        .unwrap();
    let err = contributors::insert(pool, grant(&playlist, &guest, Role::Admin, &owner))
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn test_remove_then_revive_reuses_row() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let owner = create_test_user(pool, "owner").await;
    let admin = create_test_user(pool, "admin").await;
    let guest = create_test_user(pool, "guest").await;
    let playlist = create_test_playlist(pool, "Shared", &owner).await;

    let row = contributors::insert(pool, grant(&playlist, &guest, Role::Viewer, &owner))
        .await
        .unwrap();
    contributors::remove(pool, &row.id).await.unwrap();

    assert!(contributors::get_active(pool, &playlist)
        .await
        .unwrap()
        .is_empty());
    assert!(contributors::get_playlist_ids_for_user(pool, &guest)
        .await
        .unwrap()
        .is_empty());

    let revived = contributors::revive(pool, &row.id, Role::Editor, &admin)
        .await
        .unwrap();
    assert_eq!(revived.id, row.id);
    assert_eq!(revived.role, Role::Editor);
    assert_eq!(revived.invited_by, admin);
    assert_eq!(revived.state, EntryState::Active);
}

#[tokio::test]
async fn test_update_role_requires_active_row() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let owner = create_test_user(pool, "owner").await;
    let guest = create_test_user(pool, "guest").await;
    let playlist = create_test_playlist(pool, "Shared", &owner).await;

    let row = contributors::insert(pool, grant(&playlist, &guest, Role::Viewer, &owner))
        .await
        .unwrap();
    let promoted = contributors::update_role(pool, &row.id, Role::Admin)
        .await
        .unwrap();
    assert_eq!(promoted.role, Role::Admin);

    contributors::remove(pool, &row.id).await.unwrap();
    let err = contributors::update_role(pool, &row.id, Role::Viewer)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotFound);
}
