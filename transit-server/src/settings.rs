//! Server settings read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const SCHEDULE_PATH: &str = "TRANSIT_SCHEDULE_PATH";
const BIND_ADDR: &str = "TRANSIT_BIND_ADDR";
const PREDICTION_URL: &str = "TRANSIT_PREDICTION_URL";
const PREDICTION_TIMEOUT_MS: &str = "TRANSIT_PREDICTION_TIMEOUT_MS";
const SCHEDULE_REFRESH_SECS: &str = "TRANSIT_SCHEDULE_REFRESH_SECS";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_PREDICTION_TIMEOUT_MS: u64 = 800;

/// Error reading settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Settings for the server binary.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    /// Schedule snapshot (JSON) to serve
    pub schedule_path: PathBuf,

    /// Address to listen on
    pub bind_addr: SocketAddr,

    /// External prediction service; the local model is used when absent
    pub prediction_url: Option<String>,

    /// Timeout for each prediction call (milliseconds)
    pub prediction_timeout_ms: u64,

    /// Reload the schedule snapshot this often, if set
    pub schedule_refresh: Option<Duration>,
}

impl ServerSettings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through a lookup function. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let schedule_path = get(SCHEDULE_PATH)
            .map(PathBuf::from)
            .ok_or(SettingsError::Missing(SCHEDULE_PATH))?;

        let bind_addr = parse(
            BIND_ADDR,
            get(BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        )?;

        let prediction_timeout_ms = match get(PREDICTION_TIMEOUT_MS) {
            Some(value) => parse(PREDICTION_TIMEOUT_MS, value)?,
            None => DEFAULT_PREDICTION_TIMEOUT_MS,
        };

        let schedule_refresh = match get(SCHEDULE_REFRESH_SECS) {
            Some(value) => match parse::<u64>(SCHEDULE_REFRESH_SECS, value)? {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            None => None,
        };

        Ok(Self {
            schedule_path,
            bind_addr,
            prediction_url: get(PREDICTION_URL).map(|url| url.trim_end_matches('/').to_string()),
            prediction_timeout_ms,
            schedule_refresh,
        })
    }
}

fn parse<T>(name: &'static str, value: String) -> Result<T, SettingsError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| SettingsError::Invalid {
            name,
            reason: e.to_string(),
            value,
        })
}
