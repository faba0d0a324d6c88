//! Integration tests for users, artists, albums and songs


use cadence_core::types::*;
use cadence_storage::{albums, artists, songs, users, StorageError};
use test_helpers::*;

async fn seed(pool: &sqlx::SqlitePool) -> (Artist, Album) {
    let artist = artists::create(
        pool,
        CreateArtist {
            name: "Danny O'Brien".to_string(),
        },
    )
    .await
    .unwrap();
    let album = albums::create(
        pool,
        CreateAlbum {
            name: "Live".to_string(),
            artist_id: artist.id,
        },
    )
    .await
    .unwrap();
    (artist, album)
}

fn new_song(title: &str, track: i32, album: &Album) -> CreateSong {
    CreateSong {
        title: title.to_string(),
        length: 200.0,
        track: Some(track),
        disc: 1,
        path: format!("/music/{title}.flac"),
        album_id: album.id,
        artist_id: album.artist_id,
    }
}

#[tokio::test]
async fn test_users_round_trip() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let user = users::create(pool, " alice ").await.unwrap();
    assert_eq!(user.name, "alice");
    assert_eq!(users::get_by_id(pool, user.id).await.unwrap(), Some(user.clone()));
    assert_eq!(users::get_all(pool).await.unwrap(), vec![user]);
    assert!(matches!(
        users::create(pool, "").await,
        Err(StorageError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_artists_and_albums_by_name() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let (artist, album) = seed(pool).await;

    let found = artists::find_by_name(pool, "Danny O'Brien").await.unwrap().unwrap();
    assert_eq!(found.id, artist.id);
    assert!(artists::find_by_name(pool, "Nobody").await.unwrap().is_none());

    let again = artists::find_or_create(pool, "Danny O'Brien").await.unwrap();
    assert_eq!(again.id, artist.id);

    let found = albums::find_by_name(pool, artist.id, "Live").await.unwrap().unwrap();
    assert_eq!(found.id, album.id);
    assert_eq!(found.artist_name.as_deref(), Some("Danny O'Brien"));
    assert_eq!(albums::get_by_artist(pool, artist.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_songs_are_hydrated_with_names() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let user = create_test_user(pool, "listener").await;
    let (_, album) = seed(pool).await;

    let song = songs::create(pool, new_song("Opener", 1, &album)).await.unwrap();
    assert_eq!(song.album_name, "Live");
    assert_eq!(song.artist_name, "Danny O'Brien");
    assert_eq!(song.play_count, 0);

    let fetched = songs::get_by_id(pool, &song.id, user).await.unwrap().unwrap();
    assert_eq!(fetched, song);
}

#[tokio::test]
async fn test_get_many_preserves_order_and_skips_missing() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let user = create_test_user(pool, "listener").await;
    let (_, album) = seed(pool).await;

    let first = songs::create(pool, new_song("First", 1, &album)).await.unwrap();
    let second = songs::create(pool, new_song("Second", 2, &album)).await.unwrap();

    let ids = vec![second.id.clone(), SongId::generate(), first.id.clone()];
    let found: Vec<_> = songs::get_many(pool, &ids, user)
        .await
        .unwrap()
        .into_iter()
        .map(|song| song.title)
        .collect();
    assert_eq!(found, vec!["Second", "First"]);

    let by_album: Vec<_> = songs::get_by_album(pool, album.id, user)
        .await
        .unwrap()
        .into_iter()
        .map(|song| song.title)
        .collect();
    assert_eq!(by_album, vec!["First", "Second"]);
}

#[tokio::test]
async fn test_get_many_handles_more_ids_than_sqlite_binds() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let user = create_test_user(pool, "listener").await;
    let (_, album) = seed(pool).await;

    let first = songs::create(pool, new_song("First", 1, &album)).await.unwrap();
    let second = songs::create(pool, new_song("Second", 2, &album)).await.unwrap();

    // Past the 32766 bound parameters a single SQLite statement allows
    let mut ids: Vec<SongId> = (0..40_000).map(|_| SongId::generate()).collect();
    ids.insert(10, second.id.clone());
    ids.push(first.id.clone());

    let found: Vec<_> = songs::get_many(pool, &ids, user)
        .await
        .unwrap()
        .into_iter()
        .map(|song| song.title)
        .collect();
    assert_eq!(found, vec!["Second", "First"]);
}

#[tokio::test]
async fn test_song_validation_and_delete() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let (_, album) = seed(pool).await;

    let mut bad = new_song("Bad", 1, &album);
    bad.length = -1.0;
    assert!(matches!(
        songs::create(pool, bad).await,
        Err(StorageError::InvalidInput(_))
    ));

    let song = songs::create(pool, new_song("Doomed", 1, &album)).await.unwrap();
    songs::delete(pool, &song.id).await.unwrap();
    assert!(!songs::exists(pool, &song.id).await.unwrap());
    assert!(matches!(
        songs::delete(pool, &song.id).await,
        Err(StorageError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_duplicate_paths_surface_database_errors() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let (_, album) = seed(pool).await;

    songs::create(pool, new_song("Twice", 1, &album)).await.unwrap();
    assert!(matches!(
        songs::create(pool, new_song("Twice", 2, &album)).await,
        Err(StorageError::Database(_))
    ));
}
