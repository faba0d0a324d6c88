//! Integration tests for per-user interactions


use cadence_core::types::*;
use cadence_storage::{interactions, songs, LocalStorageContext, StorageError};
use chrono::{Duration, Utc};
use test_helpers::*;

#[tokio::test]
async fn test_record_play_creates_then_increments() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let user = create_test_user(pool, "listener").await;
    let song = create_song_by(pool, "Track", "Alpha").await;

    let first = interactions::record_play(pool, user, &song).await.unwrap();
    assert_eq!(first.play_count, 1);
    assert!(!first.liked);

    let second = interactions::record_play(pool, user, &song).await.unwrap();
    assert_eq!(second.play_count, 2);
    assert_eq!(second.created_at, first.created_at);
}

#[tokio::test]
async fn test_plays_are_counted_per_user() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let alice = create_test_user(pool, "alice").await;
    let bob = create_test_user(pool, "bob").await;
    let song = create_song_by(pool, "Track", "Alpha").await;

    interactions::record_play(pool, alice, &song).await.unwrap();
    interactions::record_play(pool, alice, &song).await.unwrap();
    interactions::record_play(pool, bob, &song).await.unwrap();

    let as_alice = songs::get_by_id(pool, &song, alice).await.unwrap().unwrap();
    let as_bob = songs::get_by_id(pool, &song, bob).await.unwrap().unwrap();
    assert_eq!(as_alice.play_count, 2);
    assert_eq!(as_bob.play_count, 1);
}

#[tokio::test]
async fn test_playing_a_missing_song_fails() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let user = create_test_user(pool, "listener").await;

    let err = interactions::record_play(pool, user, &SongId::generate())
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound { .. }));
}

#[tokio::test]
async fn test_liking_keeps_play_count() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let user = create_test_user(pool, "listener").await;
    let song = create_song_by(pool, "Track", "Alpha").await;

    interactions::record_play(pool, user, &song).await.unwrap();
    let liked = interactions::set_liked(pool, user, &song, true).await.unwrap();
    assert!(liked.liked);
    assert_eq!(liked.play_count, 1);

    let unliked = interactions::set_liked(pool, user, &song, false).await.unwrap();
    assert!(!unliked.liked);
}

#[tokio::test]
async fn test_like_without_plays_is_not_recently_played() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let user = create_test_user(pool, "listener").await;
    let song = create_song_by(pool, "Track", "Alpha").await;

    interactions::set_liked(pool, user, &song, true).await.unwrap();

    assert!(interactions::recently_played(pool, user, None).await.unwrap().is_empty());
    let favorites = interactions::favorites(pool, user).await.unwrap();
    assert_eq!(favorites.len(), 1);
    assert!(favorites[0].liked);
    assert_eq!(favorites[0].play_count, 0);
}

#[tokio::test]
async fn test_recently_played_is_newest_first() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let user = create_test_user(pool, "listener").await;
    let now = Utc::now();

    let oldest = create_song_by(pool, "Oldest", "Alpha").await;
    let newest = create_song_by(pool, "Newest", "Alpha").await;
    let middle = create_song_by(pool, "Middle", "Alpha").await;
    create_test_interaction(pool, user, &oldest, 1, now - Duration::days(3)).await;
    create_test_interaction(pool, user, &newest, 1, now).await;
    create_test_interaction(pool, user, &middle, 4, now - Duration::days(1)).await;

    let ids = interactions::recently_played(pool, user, None).await.unwrap();
    assert_eq!(ids, vec![newest.clone(), middle.clone(), oldest]);

    let limited = interactions::recently_played(pool, user, Some(2)).await.unwrap();
    assert_eq!(limited, vec![newest, middle]);

    let storage = LocalStorageContext::new(pool.clone(), user);
    let songs: Vec<_> = storage
        .recently_played(Some(1))
        .await
        .unwrap()
        .into_iter()
        .map(|song| song.title)
        .collect();
    assert_eq!(songs, vec!["Newest"]);
}
