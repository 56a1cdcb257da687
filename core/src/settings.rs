use config::{Config, ConfigError};
use serde::Deserialize;

pub const DEFAULT_NETWORK_PASSPHRASE: &str = "Test SDF Network ; September 2015";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub rust_log: String,
    /// Network whose id salts adaptor contract ids.
    pub network_passphrase: String,
}

pub fn load_config() -> Result<AppConfig, ConfigError> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    build_config(config::Environment::default())
}

fn build_config(env: config::Environment) -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        .add_source(env)
        .set_default("server_port", 8080)?
        .set_default("rust_log", "info")?
        .set_default("network_passphrase", DEFAULT_NETWORK_PASSPHRASE)?
        .build()?;

    settings.try_deserialize()
}
