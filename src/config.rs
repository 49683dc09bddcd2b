use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// Placeholder secret used when neither the config file nor the environment
/// provides one. `songbook init` replaces it with a random key.
pub const DEV_SECRET_KEY: &str = "songbook-development-secret-change-me-please";

const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub database: DatabaseConfig,

    pub auth: AuthConfig,

    pub security: SecurityConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Whether to set the Secure flag on token cookies.
    /// Leave off for local development over plain HTTP.
    pub secure_cookies: bool,

    /// Directory with a prebuilt frontend, served for every non-API path.
    pub static_dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            cors_allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            secure_cookies: false,
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection string. For file databases this names the directory that
    /// holds `<name>.db`; `sqlite::memory:` is used as-is.
    pub url: String,

    pub name: String,

    /// Maximum database connections (default: 5)
    pub max_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:data".to_string(),
            name: "songbook".to_string(),
            max_connections: 5,
            min_connections: 1,
        }
    }
}

impl DatabaseConfig {
    #[must_use]
    pub fn connection_url(&self) -> String {
        if self.url.ends_with(":memory:") {
            return self.url.clone();
        }
        format!("{}/{}.db", self.url.trim_end_matches('/'), self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub secret_key: String,

    /// One of HS256, HS384, HS512.
    pub algorithm: String,

    pub access_token_expire_minutes: i64,

    pub refresh_token_expire_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: DEV_SECRET_KEY.to_string(),
            algorithm: "HS256".to_string(),
            access_token_expire_minutes: 30,
            refresh_token_expire_days: 7,
        }
    }
}

impl AuthConfig {
    pub fn jwt_algorithm(&self) -> Result<jsonwebtoken::Algorithm> {
        use jsonwebtoken::Algorithm;

        let algorithm = Algorithm::from_str(&self.algorithm)
            .with_context(|| format!("Unknown JWT algorithm: {}", self.algorithm))?;

        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
            other => anyhow::bail!("JWT algorithm {other:?} is not supported, use HS256/HS384/HS512"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            security: SecurityConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    /// Loads the first config file found, then `.env`, then environment
    /// overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;

        if let Ok(path) = dotenvy::dotenv() {
            info!("Loaded environment from: {}", path.display());
        }

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Applies environment overrides using `lookup` so tests can feed a map
    /// instead of mutating the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(v) = lookup("DATABASE_NAME") {
            self.database.name = v;
        }
        if let Some(v) = lookup("JWT_SECRET_KEY") {
            self.auth.secret_key = v;
        }
        if let Some(v) = lookup("JWT_ALGORITHM") {
            self.auth.algorithm = v;
        }
        if let Some(v) = lookup("JWT_ACCESS_TOKEN_EXPIRE_MINUTES") {
            self.auth.access_token_expire_minutes = v
                .parse()
                .with_context(|| format!("Invalid JWT_ACCESS_TOKEN_EXPIRE_MINUTES: {v}"))?;
        }
        if let Some(v) = lookup("JWT_REFRESH_TOKEN_EXPIRE_DAYS") {
            self.auth.refresh_token_expire_days = v
                .parse()
                .with_context(|| format!("Invalid JWT_REFRESH_TOKEN_EXPIRE_DAYS: {v}"))?;
        }
        if let Some(v) = lookup("SONGBOOK_PORT") {
            self.server.port = v
                .parse()
                .with_context(|| format!("Invalid SONGBOOK_PORT: {v}"))?;
        }
        if let Some(v) = lookup("SONGBOOK_LOG_LEVEL") {
            self.general.log_level = v;
        }
        Ok(())
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("songbook").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".songbook").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    /// Writes a default config with a freshly generated JWT secret.
    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let mut config = Self::default();
            config.auth.secret_key = generate_secret_key();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.auth.jwt_algorithm()?;

        if self.auth.secret_key.trim().is_empty() {
            anyhow::bail!("JWT secret key cannot be empty");
        }

        if self.auth.secret_key.len() < MIN_SECRET_LEN {
            warn!(
                "JWT secret key is shorter than {} characters; tokens are easier to forge",
                MIN_SECRET_LEN
            );
        }

        if self.auth.secret_key == DEV_SECRET_KEY {
            warn!("Using the development JWT secret; set JWT_SECRET_KEY in production");
        }

        if self.auth.access_token_expire_minutes <= 0 || self.auth.refresh_token_expire_days <= 0 {
            anyhow::bail!("Token expiry values must be positive");
        }

        if self.database.max_connections < self.database.min_connections {
            anyhow::bail!("database.max_connections must be >= database.min_connections");
        }

        if self.database.name.trim().is_empty() {
            anyhow::bail!("Database name cannot be empty");
        }

        Ok(())
    }
}

/// Generate a random signing secret (64 character hex string)
#[must_use]
pub fn generate_secret_key() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}
