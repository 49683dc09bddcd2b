pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod db;
pub mod entities;
pub mod models;
pub mod services;
pub mod state;

use std::sync::Arc;
use tokio::signal;

use anyhow::Context;
use cli::{Cli, Commands, SongCommands, UserCommands};
pub use config::Config;
use metrics_exporter_prometheus::PrometheusHandle;
use models::song::{NewSong, SongChanges};
use models::user::NewUser;
use state::SharedState;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    config.validate()?;

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    init_tracing(&config)?;

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Serve { port } => {
            let mut config = config;
            if let Some(port) = port {
                config.server.port = port;
            }
            run_server(config, prometheus_handle).await
        }

        Commands::Init => {
            if Config::create_default_if_missing()? {
                println!("✓ Created config.toml with a new JWT secret");
            } else {
                println!("config.toml already exists, leaving it untouched");
            }
            Ok(())
        }

        Commands::Songs { command } => {
            let state = SharedState::new(config).await?;
            run_song_command(&state, command).await
        }

        Commands::Users { command } => {
            let state = SharedState::new(config).await?;
            run_user_command(&state, command).await
        }
    }
}

fn init_tracing(config: &Config) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let (layer, task) = tracing_loki::builder()
            .label("app", "songbook")?
            .extra_field("env", "production")?
            .build_url(url)?;

        tokio::spawn(task);

        registry.with(layer).init();
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    } else {
        registry.init();
    }

    Ok(())
}

async fn run_song_command(state: &SharedState, command: SongCommands) -> anyhow::Result<()> {
    match command {
        SongCommands::List { user } => cli::cmd_list_songs(state, user.as_deref()).await,
        SongCommands::Add {
            user,
            title,
            artist,
            genre,
            year,
        } => {
            let song = NewSong {
                title,
                artist,
                genre,
                year,
            };
            cli::cmd_add_song(state, &user, song).await
        }
        SongCommands::Search { query, user } => {
            cli::cmd_search_songs(state, &query.join(" "), user.as_deref()).await
        }
        SongCommands::Update {
            user,
            id,
            title,
            artist,
            genre,
            year,
        } => {
            let changes = SongChanges {
                title,
                artist,
                genre: genre.map(Some),
                year,
            };
            cli::cmd_update_song(state, &user, id, changes).await
        }
        SongCommands::Delete { user, id } => cli::cmd_delete_song(state, &user, id).await,
        SongCommands::Play { user, id } => cli::cmd_play_song(state, &user, id).await,
        SongCommands::Stats { username } => cli::cmd_song_stats(state, &username).await,
    }
}

async fn run_user_command(state: &SharedState, command: UserCommands) -> anyhow::Result<()> {
    match command {
        UserCommands::Create {
            username,
            email,
            password,
            first_name,
            last_name,
        } => {
            let new_user = NewUser {
                username,
                email,
                password,
                first_name,
                last_name,
            };
            cli::cmd_create_user(state, new_user).await
        }
        UserCommands::List => cli::cmd_list_users(state).await,
        UserCommands::Activate { username } => {
            cli::cmd_set_user_active(state, &username, true).await
        }
        UserCommands::Deactivate { username } => {
            cli::cmd_set_user_active(state, &username, false).await
        }
    }
}

async fn run_server(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<()> {
    info!("songbook v{} starting...", env!("CARGO_PKG_VERSION"));

    let port = config.server.port;
    let shared = Arc::new(SharedState::new(config).await?);
    let api_state = api::create_app_state(shared, prometheus_handle);

    let app = api::router(api_state);
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("🌐 Web Server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {}", e),
    }
}
