//! CLI module - Command-line interface for songbook
//!
//! Song and user commands go through the same services as the HTTP API.

mod commands;

use clap::{Parser, Subcommand};

/// songbook - a songs catalog with a REST API
#[derive(Parser)]
#[command(name = "songbook")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    #[command(alias = "server")]
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Create default config file with a fresh JWT secret
    #[command(alias = "--init")]
    Init,

    /// Manage songs
    #[command(alias = "s")]
    Songs {
        #[command(subcommand)]
        command: SongCommands,
    },

    /// Manage user accounts
    #[command(alias = "u")]
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
pub enum SongCommands {
    /// List songs, newest first
    #[command(alias = "ls")]
    List {
        /// Only songs owned by this username
        #[arg(long)]
        user: Option<String>,
    },

    /// Add a song
    #[command(alias = "a")]
    Add {
        /// Owner username
        #[arg(long)]
        user: String,
        title: String,
        artist: String,
        #[arg(long)]
        genre: Option<String>,
        #[arg(long)]
        year: Option<i32>,
    },

    /// Search titles and artists
    Search {
        #[arg(required = true)]
        query: Vec<String>,
        /// Only songs owned by this username
        #[arg(long)]
        user: Option<String>,
    },

    /// Update fields of a song
    Update {
        /// Owner username
        #[arg(long)]
        user: String,
        id: i32,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        artist: Option<String>,
        /// New genre; an empty string clears it
        #[arg(long)]
        genre: Option<String>,
        #[arg(long)]
        year: Option<i32>,
    },

    /// Delete a song
    #[command(alias = "rm")]
    Delete {
        /// Owner username
        #[arg(long)]
        user: String,
        id: i32,
    },

    /// Play a song (bumps its play count)
    Play {
        /// Owner username
        #[arg(long)]
        user: String,
        id: i32,
    },

    /// Show genre, year and artist breakdowns for a user
    Stats { username: String },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a user account
    Create {
        username: String,
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },

    /// List all users
    #[command(alias = "ls")]
    List,

    /// Re-enable a disabled account
    Activate { username: String },

    /// Disable an account; its tokens stop working immediately
    Deactivate { username: String },
}

pub use commands::*;
