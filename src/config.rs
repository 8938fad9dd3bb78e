use crate::vendor::Credentials;
use chrono::{Local, NaiveDate, Utc};
use regex::Regex;
use std::{env, str::FromStr, time::Duration};
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_GARMIN_API_BASE: &str = "https://connectapi.garmin.com";
pub const DEFAULT_GARMIN_TOKEN_URL: &str = "https://connectapi.garmin.com/oauth-service/oauth/token";
pub const DEFAULT_CORS_ORIGIN_REGEX: &str = r"^https://preview-sandbox--.*\.base44\.app$|^https://.*\.base44\.app$|^https://(www\.)?revluna\.com$";
const DEFAULT_GARMIN_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
    #[error("CORS_ALLOW_ORIGIN_REGEX is not a valid regex: {0}")]
    CorsPattern(#[from] regex::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayBoundary {
    #[default]
    Local,
    Utc,
}

impl DayBoundary {
    pub fn today(self) -> NaiveDate {
        match self {
            DayBoundary::Local => Local::now().date_naive(),
            DayBoundary::Utc => Utc::now().date_naive(),
        }
    }
}

impl FromStr for DayBoundary {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(DayBoundary::Local),
            "utc" => Ok(DayBoundary::Utc),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GarminConfig {
    pub api_base: String,
    pub token_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub day_boundary: DayBoundary,
    pub session_ttl: Option<Duration>,
    pub sync_secret: Option<String>,
    pub default_credentials: Option<Credentials>,
    pub garmin: GarminConfig,
    pub cors_origin: Regex,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let port = parse_var::<u16>(&var, "PORT")?.unwrap_or(DEFAULT_PORT);

        let day_boundary = match var("SLEEP_DAY_BOUNDARY") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "SLEEP_DAY_BOUNDARY",
                value,
            })?,
            None => DayBoundary::default(),
        };

        let session_ttl = parse_var::<u64>(&var, "SESSION_TTL_SECS")?.map(Duration::from_secs);
        let timeout = parse_var::<u64>(&var, "GARMIN_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_GARMIN_TIMEOUT_SECS);

        let default_credentials = match (var("GARMIN_EMAIL"), var("GARMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(Credentials::new(email, password)),
            _ => None,
        };

        let cors_origin = Regex::new(
            &var("CORS_ALLOW_ORIGIN_REGEX").unwrap_or_else(|| DEFAULT_CORS_ORIGIN_REGEX.to_string()),
        )?;

        Ok(Self {
            port,
            day_boundary,
            session_ttl,
            sync_secret: var("SYNC_SHARED_SECRET"),
            default_credentials,
            garmin: GarminConfig {
                api_base: var("GARMIN_API_BASE")
                    .unwrap_or_else(|| DEFAULT_GARMIN_API_BASE.to_string()),
                token_url: var("GARMIN_TOKEN_URL")
                    .unwrap_or_else(|| DEFAULT_GARMIN_TOKEN_URL.to_string()),
                timeout: Duration::from_secs(timeout),
            },
            cors_origin,
        })
    }
}

fn parse_var<T: FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    match var(name) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(None),
    }
}
