use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, SeaOrmAuthService, SeaOrmSongService, SeaOrmUserService, SongService,
    UserService,
};

/// Services shared by the HTTP server and the CLI.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub song_service: Arc<dyn SongService>,

    pub user_service: Arc<dyn UserService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::from_config(&config.database).await?;
        let tokens = TokenIssuer::from_config(&config.auth)?;

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            tokens,
            config.security.clone(),
        )) as Arc<dyn AuthService + Send + Sync + 'static>;

        let song_service = Arc::new(SeaOrmSongService::new(store.clone()))
            as Arc<dyn SongService + Send + Sync + 'static>;

        let user_service = Arc::new(SeaOrmUserService::new(store.clone()))
            as Arc<dyn UserService + Send + Sync + 'static>;

        Ok(Self {
            config: Arc::new(config),
            store,
            auth_service,
            song_service,
            user_service,
        })
    }
}
