use std::env;

use log::{debug, error, info};

use crate::error::Result;

const DEFAULT_DB_PATH: &str = "pinglists.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub db_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        debug!("Loading configuration from environment");
        dotenvy::dotenv().ok();

        let discord_token = env::var("DISCORD_TOKEN").map_err(|e| {
            error!("Failed to load DISCORD_TOKEN from environment: {}", e);
            e
        })?;

        let db_path = env::var("PINGLIST_DB_PATH").unwrap_or_else(|_| {
            debug!("PINGLIST_DB_PATH not set, using {}", DEFAULT_DB_PATH);
            DEFAULT_DB_PATH.to_string()
        });

        info!("Configuration loaded successfully");
        debug!("Discord token length: {} characters", discord_token.len());
        debug!("Pinglist database path: {}", db_path);

        Ok(Self {
            discord_token,
            db_path,
        })
    }
}
