//! Integration tests for the playlist entries slice
//!
//! Covers order assignment on append and revival, removal without
//! renumbering, partial reorders and the one-row-per-pair constraint.


use chorus_core::{types::*, ErrorCode};
use chorus_storage::entries;
use test_helpers::*;

#[tokio::test]
async fn test_append_assigns_increasing_orders() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let owner = create_test_user(pool, "owner").await;
    let playlist = create_test_playlist(pool, "Road Trip", &owner).await;
    let s1 = create_test_song(pool, "one", &owner).await;
    let s2 = create_test_song(pool, "two", &owner).await;

    let e1 = entries::append(pool, &playlist, &s1, &owner).await.unwrap();
    let e2 = entries::append(pool, &playlist, &s2, &owner).await.unwrap();

    assert_eq!(e1.order, 0);
    assert_eq!(e2.order, 1);
    assert_eq!(e1.state, EntryState::Active);
    assert_eq!(active_song_order(pool, &playlist).await, vec![s1, s2]);
}

#[tokio::test]
async fn test_order_is_per_playlist() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let owner = create_test_user(pool, "owner").await;
    let p1 = create_test_playlist(pool, "A", &owner).await;
    let p2 = create_test_playlist(pool, "B", &owner).await;
    let song = create_test_song(pool, "shared", &owner).await;
    let other = create_test_song(pool, "other", &owner).await;

    entries::append(pool, &p1, &other, &owner).await.unwrap();
    entries::append(pool, &p1, &song, &owner).await.unwrap();
    let in_p2 = entries::append(pool, &p2, &song, &owner).await.unwrap();

    assert_eq!(in_p2.order, 0);
}

#[tokio::test]
async fn test_duplicate_pair_is_conflict() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let owner = create_test_user(pool, "owner").await;
    let playlist = create_test_playlist(pool, "Dupes", &owner).await;
    let song = create_test_song(pool, "again", &owner).await;

    entries::append(pool, &playlist, &song, &owner).await.unwrap();
    let err = entries::append(pool, &playlist, &song, &owner)
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn test_remove_keeps_other_orders() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let owner = create_test_user(pool, "owner").await;
    let playlist = create_test_playlist(pool, "Gaps", &owner).await;
    let s1 = create_test_song(pool, "one", &owner).await;
    let s2 = create_test_song(pool, "two", &owner).await;
    let s3 = create_test_song(pool, "three", &owner).await;

    let e1 = entries::append(pool, &playlist, &s1, &owner).await.unwrap();
    let e2 = entries::append(pool, &playlist, &s2, &owner).await.unwrap();
    entries::append(pool, &playlist, &s3, &owner).await.unwrap();

    let removed = entries::remove(pool, &e2.id).await.unwrap();
    assert_eq!(removed.state, EntryState::Removed);

    let active = entries::get_active(pool, &playlist).await.unwrap();
    let orders: Vec<u32> = active.iter().map(|e| e.order).collect();
    assert_eq!(orders, vec![0, 2]);

    // Second removal of the same entry finds nothing active
    let err = entries::remove(pool, &e2.id).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotFound);

    // Untouched entry keeps its id
    assert_eq!(active[0].id, e1.id);
}

#[tokio::test]
async fn test_revive_moves_entry_to_end_and_keeps_id() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let owner = create_test_user(pool, "owner").await;
    let editor = create_test_user(pool, "editor").await;
    let playlist = create_test_playlist(pool, "Revival", &owner).await;
    let a = create_test_song(pool, "a", &owner).await;
    let b = create_test_song(pool, "b", &owner).await;
    let c = create_test_song(pool, "c", &owner).await;

    let ea = entries::append(pool, &playlist, &a, &owner).await.unwrap();
    entries::append(pool, &playlist, &b, &owner).await.unwrap();
    entries::append(pool, &playlist, &c, &owner).await.unwrap();

    entries::remove(pool, &ea.id).await.unwrap();
    let revived = entries::revive(pool, &ea.id, &editor).await.unwrap();

    assert_eq!(revived.id, ea.id);
    assert_eq!(revived.order, 3);
    assert_eq!(revived.added_by, editor);
    assert_eq!(revived.state, EntryState::Active);
    assert_eq!(
        active_song_order(pool, &playlist).await,
        vec![b, c, a.clone()]
    );

    // Exactly one row for the pair
    let found = entries::find(pool, &playlist, &a).await.unwrap().unwrap();
    assert_eq!(found.id, ea.id);
}

#[tokio::test]
async fn test_revive_active_entry_is_conflict() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let owner = create_test_user(pool, "owner").await;
    let playlist = create_test_playlist(pool, "Busy", &owner).await;
    let song = create_test_song(pool, "live", &owner).await;

    let entry = entries::append(pool, &playlist, &song, &owner).await.unwrap();
    let err = entries::revive(pool, &entry.id, &owner).await.unwrap_err();

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn test_set_orders_partial_list() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let owner = create_test_user(pool, "owner").await;
    let playlist = create_test_playlist(pool, "Shuffle", &owner).await;
    let a = create_test_song(pool, "a", &owner).await;
    let b = create_test_song(pool, "b", &owner).await;
    let c = create_test_song(pool, "c", &owner).await;
    let stranger = create_test_song(pool, "not-in-playlist", &owner).await;

    entries::append(pool, &playlist, &a, &owner).await.unwrap();
    entries::append(pool, &playlist, &b, &owner).await.unwrap();
    entries::append(pool, &playlist, &c, &owner).await.unwrap();

    // [c, a] plus a song that is not in the playlist: c -> 0, a -> 1, b keeps 1
    let updated = entries::set_orders(
        pool,
        &playlist,
        &[(c.clone(), 0), (a.clone(), 1), (stranger, 2)],
    )
    .await
    .unwrap();
    assert_eq!(updated, 2);

    let active = entries::get_active(pool, &playlist).await.unwrap();
    let by_song = |id: &SongId| active.iter().find(|e| &e.song_id == id).unwrap().order;
    assert_eq!(by_song(&c), 0);
    assert_eq!(by_song(&a), 1);
    assert_eq!(by_song(&b), 1);
    assert_eq!(active[0].song_id, c);
}
