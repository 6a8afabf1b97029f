use std::env;

use auth::TokenSettings;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
    /// Browser origin allowed to send credentialed requests; permissive CORS when unset.
    #[serde(default)]
    pub cors_origin: Option<String>,
}

/// Secrets and lifetimes of the two token classes.
#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub access_secret: String,
    pub access_expiration_minutes: i64,
    pub refresh_secret: String,
    pub refresh_expiration_minutes: i64,
}

impl JwtConfig {
    pub fn access_settings(&self) -> TokenSettings {
        TokenSettings::new(
            self.access_secret.as_bytes(),
            chrono::Duration::minutes(self.access_expiration_minutes),
        )
    }

    pub fn refresh_settings(&self) -> TokenSettings {
        TokenSettings::new(
            self.refresh_secret.as_bytes(),
            chrono::Duration::minutes(self.refresh_expiration_minutes),
        )
    }
}

fn default_max_connections() -> u32 {
    5
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__ACCESS_SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__REFRESH_SECRET=... overrides jwt.refresh_secret
            .add_source(Environment::default().separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        if config.jwt.access_secret == config.jwt.refresh_secret {
            return Err(ConfigError::Message(
                "jwt.access_secret and jwt.refresh_secret must differ".to_string(),
            ));
        }

        Ok(config)
    }
}
