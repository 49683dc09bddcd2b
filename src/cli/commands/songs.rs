//! Song command handlers

use anyhow::Context;

use crate::models::song::{NewSong, Song, SongChanges};
use crate::models::user::CurrentUser;
use crate::state::SharedState;

/// Acts as `username`, the way a logged-in API caller would.
async fn as_user(state: &SharedState, username: &str) -> anyhow::Result<CurrentUser> {
    let user = state
        .store
        .get_user_by_username(username)
        .await?
        .with_context(|| format!("User '{username}' not found"))?;

    Ok(CurrentUser {
        id: user.id,
        username: user.username,
    })
}

fn print_song(song: &Song) {
    println!("• [{}] {}", song.id, song);
    println!(
        "  Owner: {} | Plays: {} | Added: {}",
        song.owner, song.play_count, song.created_at
    );
}

fn print_songs(songs: &[Song]) {
    println!("{:-<60}", "");
    for song in songs {
        print_song(song);
    }
}

pub async fn cmd_list_songs(state: &SharedState, user: Option<&str>) -> anyhow::Result<()> {
    let songs = state.song_service.list(user).await?;

    if songs.is_empty() {
        println!("No songs found.");
        println!();
        println!("Add one with: songbook songs add --user <name> \"Title\" \"Artist\"");
        return Ok(());
    }

    println!("Songs ({} total)", songs.len());
    print_songs(&songs);
    Ok(())
}

pub async fn cmd_add_song(
    state: &SharedState,
    username: &str,
    song: NewSong,
) -> anyhow::Result<()> {
    let user = as_user(state, username).await?;
    let song = state.song_service.create(&user, song).await?;

    println!(
        "✓ Song '{}' by '{}' added successfully (ID: {})",
        song.title, song.artist, song.id
    );
    Ok(())
}

pub async fn cmd_search_songs(
    state: &SharedState,
    query: &str,
    user: Option<&str>,
) -> anyhow::Result<()> {
    let songs = state.song_service.search(query, user).await?;

    println!("Found {} song(s) matching '{}'", songs.len(), query.trim());
    if !songs.is_empty() {
        print_songs(&songs);
    }
    Ok(())
}

pub async fn cmd_update_song(
    state: &SharedState,
    username: &str,
    id: i32,
    changes: SongChanges,
) -> anyhow::Result<()> {
    let user = as_user(state, username).await?;
    let song = state.song_service.update(id, &user, changes).await?;

    println!("✓ Song updated successfully");
    print_song(&song);
    Ok(())
}

pub async fn cmd_delete_song(state: &SharedState, username: &str, id: i32) -> anyhow::Result<()> {
    let user = as_user(state, username).await?;
    let song = state.song_service.delete(id, &user).await?;

    println!(
        "✓ Song '{}' by '{}' deleted successfully",
        song.title, song.artist
    );
    Ok(())
}

pub async fn cmd_play_song(state: &SharedState, username: &str, id: i32) -> anyhow::Result<()> {
    let user = as_user(state, username).await?;
    let song = state.song_service.play(id, &user).await?;

    println!("♪ Now playing: '{}' by '{}'", song.title, song.artist);
    println!("  Played {} time(s)", song.play_count);
    Ok(())
}

pub async fn cmd_song_stats(state: &SharedState, username: &str) -> anyhow::Result<()> {
    let stats = state.song_service.stats(username).await?;

    println!("Statistics for {}", stats.user);
    println!("{:-<40}", "");
    println!("Total songs: {}", stats.total_songs);

    for (label, buckets) in [
        ("Genres", &stats.genres),
        ("Years", &stats.years),
        ("Artists", &stats.artists),
    ] {
        if buckets.is_empty() {
            continue;
        }
        println!();
        println!("{label}:");
        for bucket in buckets {
            println!("  {:<30} {}", bucket.name, bucket.count);
        }
    }
    Ok(())
}
