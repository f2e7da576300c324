use crate::error::{Error, Result};
use rand::Rng;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_CAPSULE_INVENTORY: &str = "capsules.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub bind_addr: SocketAddr,
    pub capsule_inventory: PathBuf,
    pub request_timeout: Duration,
    pub timings: Timings,
}

impl Config {
    /// Reads configuration from the environment; callers load `.env` first.
    pub fn from_env() -> Result<Self> {
        let api_url = env::var("API_URL")
            .unwrap_or_else(|_| String::from(DEFAULT_API_URL))
            .trim_end_matches('/')
            .to_string();

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| String::from(DEFAULT_BIND_ADDR))
            .parse::<SocketAddr>()
            .map_err(|e| Error::Config(format!("BIND_ADDR: {e}")))?;

        let capsule_inventory = env::var_os("CAPSULE_INVENTORY")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CAPSULE_INVENTORY));

        let request_timeout = Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", 5)?);

        let mut timings = Timings::default();
        timings.poll_interval = Duration::from_millis(parse_var("POLL_INTERVAL_MS", 2000)?);
        timings.validate()?;

        Ok(Config {
            api_url,
            bind_addr,
            capsule_inventory,
            request_timeout,
            timings,
        })
    }
}

fn parse_var(name: &str, default: u64) -> Result<u64> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| Error::Config(format!("{name}: {e}"))),
        Err(_) => Ok(default),
    }
}

/// Inclusive range a simulated phase lasts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min: Duration,
    pub max: Duration,
}

impl DelayRange {
    pub const fn millis(min: u64, max: u64) -> Self {
        DelayRange {
            min: Duration::from_millis(min),
            max: Duration::from_millis(max),
        }
    }

    pub const fn fixed(millis: u64) -> Self {
        DelayRange::millis(millis, millis)
    }

    /// Picks a duration uniformly at random from the range.
    pub fn sample(&self) -> Duration {
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        if max <= min {
            return self.min;
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

/// How long each part of the simulated brew takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub poll_interval: Duration,
    pub heating_coffee: DelayRange,
    pub dispensing_coffee: DelayRange,
    pub heating_milk: DelayRange,
    pub dispensing_milk: DelayRange,
    pub cooldown: DelayRange,
}

impl Timings {
    /// A zero poll interval cannot drive a ticker.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(Error::Config(String::from(
                "POLL_INTERVAL_MS: must be greater than zero",
            )));
        }
        Ok(())
    }
}

impl Default for Timings {
    fn default() -> Self {
        Timings {
            poll_interval: Duration::from_secs(2),
            heating_coffee: DelayRange::millis(2000, 3000),
            dispensing_coffee: DelayRange::millis(3000, 5000),
            heating_milk: DelayRange::millis(1500, 2500),
            dispensing_milk: DelayRange::millis(3000, 5000),
            cooldown: DelayRange::fixed(8000),
        }
    }
}
