mod common;

use axum::http::StatusCode;
use chrono::Datelike;
use common::spawn_app;
use serde_json::json;
use songbook::db::unique_violation;
use songbook::models::song::NewSong;

#[tokio::test]
async fn test_song_crud_round_trip() {
    let app = spawn_app().await;
    let token = app.signup("alice").await;

    let response = app
        .post(
            "/api/songs",
            Some(&token),
            json!({
                "title": "  Bohemian Rhapsody ",
                "artist": "Queen",
                "genre": "Rock",
                "year": 1975,
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let song = &response.body["data"];
    assert_eq!(song["title"], "Bohemian Rhapsody");
    assert_eq!(song["user"], "alice");
    assert_eq!(song["play_count"], 0);
    let id = song["id"].as_i64().unwrap();

    let response = app.get(&format!("/api/songs/{id}"), Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["artist"], "Queen");

    let response = app
        .put(
            &format!("/api/songs/{id}"),
            Some(&token),
            json!({ "genre": "Progressive Rock" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["genre"], "Progressive Rock");
    assert_eq!(response.body["data"]["title"], "Bohemian Rhapsody");
    assert!(response.body["data"]["updated_at"].is_string());

    let response = app.delete(&format!("/api/songs/{id}"), Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["data"]["message"],
        "Song 'Bohemian Rhapsody' by 'Queen' deleted successfully"
    );

    let response = app.get(&format!("/api/songs/{id}"), Some(&token)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "not_found");
}

#[tokio::test]
async fn test_songs_require_authentication() {
    let app = spawn_app().await;

    assert_eq!(
        app.get("/api/songs", None).await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        app.post("/api/songs", None, json!({ "title": "x", "artist": "y" }))
            .await
            .status,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_create_song_validation() {
    let app = spawn_app().await;
    let token = app.signup("alice").await;
    let next_year = chrono::Utc::now().year() + 1;

    for body in [
        json!({ "title": "   ", "artist": "Queen" }),
        json!({ "artist": "Queen" }),
        json!({ "title": "Song", "artist": "Queen", "year": next_year }),
        json!({ "title": "Song", "artist": "Queen", "year": 999 }),
        json!({ "title": "x".repeat(201), "artist": "Queen" }),
    ] {
        let response = app.post("/api/songs", Some(&token), body).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", response.body);
        assert_eq!(response.body["error"], "validation_error");
    }
}

#[tokio::test]
async fn test_duplicate_song_is_scoped_to_owner() {
    let app = spawn_app().await;
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;

    let song = json!({ "title": "Hey Jude", "artist": "The Beatles" });
    app.create_song(&alice, song.clone()).await;

    let response = app.post("/api/songs", Some(&alice), song.clone()).await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(
        response.body["detail"],
        "Song 'Hey Jude' by 'The Beatles' already exists"
    );

    app.create_song(&bob, song).await;
}

#[tokio::test]
async fn test_update_rejects_empty_and_colliding_changes() {
    let app = spawn_app().await;
    let token = app.signup("alice").await;

    let first = app
        .create_song(&token, json!({ "title": "Yesterday", "artist": "The Beatles" }))
        .await;
    app.create_song(&token, json!({ "title": "Help!", "artist": "The Beatles" }))
        .await;

    let response = app
        .put(&format!("/api/songs/{first}"), Some(&token), json!({}))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["detail"], "No updates provided");

    let response = app
        .put(
            &format!("/api/songs/{first}"),
            Some(&token),
            json!({ "title": "Help!" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    // Re-submitting the current title is not a collision with itself.
    let response = app
        .put(
            &format!("/api/songs/{first}"),
            Some(&token),
            json!({ "title": "Yesterday", "year": 1965 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["year"], 1965);
}

#[tokio::test]
async fn test_other_users_songs_are_not_found() {
    let app = spawn_app().await;
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;

    let id = app
        .create_song(&alice, json!({ "title": "Imagine", "artist": "John Lennon" }))
        .await;
    let uri = format!("/api/songs/{id}");

    assert_eq!(app.get(&uri, Some(&bob)).await.status, StatusCode::NOT_FOUND);
    assert_eq!(
        app.put(&uri, Some(&bob), json!({ "title": "Mine now" }))
            .await
            .status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.delete(&uri, Some(&bob)).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.post(&format!("{uri}/play"), Some(&bob), json!({}))
            .await
            .status,
        StatusCode::NOT_FOUND
    );

    let response = app.get(&uri, Some(&alice)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["title"], "Imagine");
}

#[tokio::test]
async fn test_list_songs_with_user_filter() {
    let app = spawn_app().await;
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;

    app.create_song(&alice, json!({ "title": "Imagine", "artist": "John Lennon" }))
        .await;
    app.create_song(&alice, json!({ "title": "Jealous Guy", "artist": "John Lennon" }))
        .await;
    app.create_song(&bob, json!({ "title": "Wonderwall", "artist": "Oasis" }))
        .await;

    let response = app.get("/api/songs", Some(&bob)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["count"], 3);
    // Newest first
    assert_eq!(response.body["data"]["songs"][0]["title"], "Wonderwall");

    let response = app.get("/api/songs?user=alice", Some(&bob)).await;
    assert_eq!(response.body["data"]["count"], 2);
    assert!(
        response.body["data"]["songs"]
            .as_array()
            .unwrap()
            .iter()
            .all(|s| s["user"] == "alice")
    );

    let response = app.get("/api/songs?user=nobody", Some(&bob)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["count"], 0);
}

#[tokio::test]
async fn test_search_songs() {
    let app = spawn_app().await;
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;

    app.create_song(&alice, json!({ "title": "Bohemian Rhapsody", "artist": "Queen" }))
        .await;
    app.create_song(&bob, json!({ "title": "Killer Queen", "artist": "Queen" }))
        .await;
    app.create_song(&bob, json!({ "title": "Wonderwall", "artist": "Oasis" }))
        .await;

    let response = app.get("/api/songs/search?query=QUEEN", Some(&alice)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["count"], 2);
    assert_eq!(
        response.body["data"]["message"],
        "Found 2 song(s) matching 'QUEEN'"
    );

    let response = app
        .get("/api/songs/search?q=queen&user=alice", Some(&alice))
        .await;
    assert_eq!(response.body["data"]["count"], 1);
    assert_eq!(
        response.body["data"]["results"][0]["title"],
        "Bohemian Rhapsody"
    );

    let response = app.get("/api/songs/search?query=wall", Some(&alice)).await;
    assert_eq!(response.body["data"]["count"], 1);

    let response = app.get("/api/songs/search?query=q", Some(&alice)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["detail"],
        "Search query must be at least 2 characters"
    );

    let response = app.get("/api/songs/search", Some(&alice)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["detail"], "Search query cannot be empty");
}

#[tokio::test]
async fn test_malformed_song_ids() {
    let app = spawn_app().await;
    let token = app.signup("alice").await;

    for id in ["abc", "0", "-5", "99999999999"] {
        let response = app.get(&format!("/api/songs/{id}"), Some(&token)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "id {id}");
        assert_eq!(response.body["error"], "validation_error");
    }

    let response = app.get("/api/songs/4242", Some(&token)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_play_song_increments_count() {
    let app = spawn_app().await;
    let token = app.signup("alice").await;

    let id = app
        .create_song(&token, json!({ "title": "Hallelujah", "artist": "Jeff Buckley" }))
        .await;

    app.post(&format!("/api/songs/{id}/play"), Some(&token), json!({}))
        .await;
    let response = app
        .post(&format!("/api/songs/{id}/play"), Some(&token), json!({}))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["data"]["message"],
        "Now playing: 'Hallelujah' by 'Jeff Buckley'"
    );
    assert_eq!(response.body["data"]["song"]["play_count"], 2);
    assert!(response.body["data"]["song"]["last_played_at"].is_string());
}

#[tokio::test]
async fn test_user_stats() {
    let app = spawn_app().await;
    let token = app.signup("alice").await;

    for (title, genre, year) in [
        ("Come Together", Some("Rock"), Some(1969)),
        ("Something", Some("Rock"), Some(1969)),
        ("Blackbird", None, None),
    ] {
        app.create_song(
            &token,
            json!({ "title": title, "artist": "The Beatles", "genre": genre, "year": year }),
        )
        .await;
    }

    let response = app.get("/api/users/alice/stats", Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);

    let stats = &response.body["data"];
    assert_eq!(stats["user"], "alice");
    assert_eq!(stats["total_songs"], 3);
    assert_eq!(stats["genres"][0], json!({ "name": "Rock", "count": 2 }));
    assert_eq!(stats["years"][0], json!({ "name": "1969", "count": 2 }));
    assert_eq!(
        stats["artists"],
        json!([{ "name": "The Beatles", "count": 3 }])
    );

    let response = app.get("/api/users/nobody/stats", Some(&token)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_duplicate_creates_keep_one_song() {
    let app = spawn_app().await;
    let token = app.signup("alice").await;

    for round in 0..5 {
        let song = json!({ "title": format!("Take {round}"), "artist": "The Band" });
        let (first, second) = tokio::join!(
            app.post("/api/songs", Some(&token), song.clone()),
            app.post("/api/songs", Some(&token), song.clone()),
        );

        let mut statuses = [first.status, second.status];
        statuses.sort();
        assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);
    }

    let response = app.get("/api/songs?user=alice", Some(&token)).await;
    assert_eq!(response.body["data"]["count"], 5);
}

#[tokio::test]
async fn test_store_enforces_unique_song_per_owner() {
    let app = spawn_app().await;
    app.signup("alice").await;

    let store = app.state.store();
    let owner = store.get_user_by_username("alice").await.unwrap().unwrap();
    let song = NewSong {
        title: "Hey Jude".to_string(),
        artist: "The Beatles".to_string(),
        ..Default::default()
    };

    store.add_song(owner.id, song.clone()).await.unwrap();
    let err = store.add_song(owner.id, song).await.unwrap_err();
    assert!(unique_violation(&err).is_some());
}

#[tokio::test]
async fn test_malformed_song_body_is_a_validation_error() {
    let app = spawn_app().await;
    let token = app.signup("alice").await;

    let response = app
        .post(
            "/api/songs",
            Some(&token),
            json!({ "title": "X", "artist": "Y", "year": "abc" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["error"], "validation_error");
    assert!(
        response.body["detail"]
            .as_str()
            .unwrap()
            .starts_with("Invalid request body")
    );

    let id = app
        .create_song(&token, json!({ "title": "X", "artist": "Y" }))
        .await;
    let response = app
        .put(
            &format!("/api/songs/{id}"),
            Some(&token),
            json!({ "year": [1999] }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "validation_error");
}

#[tokio::test]
async fn test_blank_genre_clears_it() {
    let app = spawn_app().await;
    let token = app.signup("alice").await;

    let id = app
        .create_song(
            &token,
            json!({ "title": "Dreams", "artist": "Fleetwood Mac", "genre": "Rock" }),
        )
        .await;
    let uri = format!("/api/songs/{id}");

    let response = app.put(&uri, Some(&token), json!({ "year": 1977 })).await;
    assert_eq!(response.body["data"]["genre"], "Rock");

    let response = app.put(&uri, Some(&token), json!({ "genre": "" })).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["data"]["genre"].is_null());
    assert_eq!(response.body["data"]["year"], 1977);

    app.put(&uri, Some(&token), json!({ "genre": "Soft Rock" }))
        .await;
    let response = app.put(&uri, Some(&token), json!({ "genre": null })).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["data"]["genre"].is_null());
}
