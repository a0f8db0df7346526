//! Environment-driven configuration, read once at startup.
//!
//! Credentials come from the environment (a `.env` file is honored), never
//! from the command line, so they stay out of shell history and `ps` output.

use crate::error::EtlError;

/// Everything the pipeline needs to reach FRED and PostgreSQL.
#[derive(Debug, Clone)]
pub struct Config {
    pub fred_api_key: String,
    pub db: DbConfig,
}

/// PostgreSQL connection parameters.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
}

impl DbConfig {
    /// Connection string in the keyword/value format the driver accepts.
    pub fn params(&self) -> String {
        format!(
            "host={} port={} dbname={} user={} password={}",
            self.host, self.port, self.name, self.user, self.password
        )
    }
}

impl Config {
    /// Read all configuration from the environment, `.env` included.
    pub fn from_env() -> Result<Self, EtlError> {
        dotenvy::dotenv().ok();

        let fred_api_key = require("FRED_API_KEY")?;
        let db = DbConfig {
            host: require("DB_HOST")?,
            port: require("DB_PORT")?.parse().map_err(|_| {
                EtlError::Config("DB_PORT must be a port number.".to_string())
            })?,
            name: require("DB_NAME")?,
            user: require("DB_USER")?,
            password: require("DB_PASSWORD")?,
        };

        Ok(Self { fred_api_key, db })
    }
}

fn require(key: &str) -> Result<String, EtlError> {
    std::env::var(key).map_err(|_| EtlError::Config(format!("Missing {key} in environment (.env).")))
}
