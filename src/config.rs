use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub service_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let host = env::var("FIELDOPS_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("FIELDOPS_PORT")
            .unwrap_or_else(|_| "3010".to_string())
            .parse()?;

        Ok(Self {
            server: ServerConfig { host, port },
            service_name: "fieldops-billing".to_string(),
        })
    }
}
