use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: Option<String>,
    pub db_host: Option<String>,
    pub db_port: u16,
    pub db_user: Option<String>,
    pub db_password: Option<String>,
    pub db_name: Option<String>,
    pub jwt_secret: String,
    pub admin_email: String,
    pub environment: String,
    pub disable_ssl: bool,
    pub mail_gateway_url: Option<String>,
    pub mail_gateway_secret: Option<String>,
    pub public_rps: u32,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let config = Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: env::var("DATABASE_URL").ok(),
            db_host: env::var("DB_HOST").ok(),
            db_port: env::var("DB_PORT")
                .ok()
                .map(|v| {
                    v.parse()
                        .map_err(|e| Error::Config(format!("Invalid value for DB_PORT: {}", e)))
                })
                .transpose()?
                .unwrap_or(5432),
            db_user: env::var("DB_USER").ok(),
            db_password: env::var("DB_PASSWORD").ok(),
            db_name: env::var("DB_NAME").ok(),
            jwt_secret: get_env("JWT_SECRET")?,
            admin_email: get_env("ADMIN_EMAIL")?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            disable_ssl: env::var("DISABLE_SSL")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            mail_gateway_url: env::var("MAIL_GATEWAY_URL").ok(),
            mail_gateway_secret: env::var("MAIL_GATEWAY_SECRET").ok(),
            public_rps: env::var("PUBLIC_RPS")
                .ok()
                .map(|v| {
                    v.parse()
                        .map_err(|e| Error::Config(format!("Invalid value for PUBLIC_RPS: {}", e)))
                })
                .transpose()?
                .unwrap_or(30),
        };

        if config.database_url.is_none() && config.db_host.is_none() {
            return Err(Error::Config(
                "Either DATABASE_URL or DB_HOST must be set".to_string(),
            ));
        }

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment != "production"
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
