//! Configuration, read from the environment
//!
//! A `.env` file is loaded first when present

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;

use crate::generator::DEFAULT_CODE_LENGTH;
use crate::storage;
use crate::sweeper::DEFAULT_SWEEP_INTERVAL;
use crate::utils::env_var;
use crate::utils::env_var_or_else;
use crate::utils::env_var_parse_or;

const DEFAULT_ADDRESS: &str = "0.0.0.0:6000";
const DEFAULT_BASE_URL: &str = "http://localhost:6000";
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);
const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

/// Everything needed to start Shortly
pub struct Config {
    /// Address to listen on
    pub address: SocketAddr,

    /// Public base of every short URL, like `https://sho.rt`
    pub base_url: String,

    /// Where to keep the mappings
    pub storage: storage::Config,

    /// Length of generated short codes
    pub code_length: usize,

    /// Time between two sweeps of expired mappings
    pub sweep_interval: Duration,

    /// How long a resolved mapping may be served from the cache
    pub cache_ttl: Duration,

    /// Maximum number of cached mappings
    pub cache_capacity: u64,
}

impl Config {
    /// Read the configuration from the environment
    ///
    /// # Errors
    ///
    /// Will return `Err` for any set but invalid value
    pub fn from_env() -> Result<Self> {
        let storage = match env_var("DATABASE_URL") {
            Some(database_url) => storage::Config::Postgres(database_url),
            None => storage::Config::Memory,
        };

        let sweep_interval_secs =
            env_var_parse_or("SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL.as_secs())?;
        if sweep_interval_secs == 0 {
            anyhow::bail!("`SWEEP_INTERVAL_SECS` must be at least 1");
        }

        Ok(Self {
            address: setup_address()?,
            base_url: env_var_or_else("BASE_URL", || String::from(DEFAULT_BASE_URL)),
            storage,
            code_length: env_var_parse_or("CODE_LENGTH", DEFAULT_CODE_LENGTH)?,
            sweep_interval: Duration::from_secs(sweep_interval_secs),
            cache_ttl: Duration::from_secs(env_var_parse_or(
                "CACHE_TTL_SECS",
                DEFAULT_CACHE_TTL.as_secs(),
            )?),
            cache_capacity: env_var_parse_or("CACHE_CAPACITY", DEFAULT_CACHE_CAPACITY)?,
        })
    }
}

fn setup_address() -> Result<SocketAddr> {
    let mut address =
        env_var_or_else("ADDRESS", || String::from(DEFAULT_ADDRESS)).parse::<SocketAddr>()?;

    // optional override of just the port
    if let Some(port) = env_var("PORT") {
        let port = port.parse::<u16>()?;

        address.set_port(port);
    }

    Ok(address)
}
