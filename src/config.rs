use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub seed_on_start: bool,
    pub chaos_failure_rate: f64,
    pub chaos_latency_min_ms: u64,
    pub chaos_latency_max_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env_or("SERVER_ADDRESS", "127.0.0.1:4000"),
            database_url: get_env_or("DATABASE_URL", "sqlite://talentflow.db"),
            seed_on_start: get_env_parse_or("SEED_ON_START", true)?,
            chaos_failure_rate: get_env_parse_or("CHAOS_FAILURE_RATE", 0.075)?,
            chaos_latency_min_ms: get_env_parse_or("CHAOS_LATENCY_MIN_MS", 200)?,
            chaos_latency_max_ms: get_env_parse_or("CHAOS_LATENCY_MAX_MS", 1200)?,
        })
    }
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}
