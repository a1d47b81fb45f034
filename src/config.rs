use crate::error::{Error, Result};
use crate::services::calendar_adapter::CalendarLayout;
use chrono_tz::Tz;
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub api_url: String,
    pub api_token: Option<String>,
    pub api_session_cookie: Option<String>,
    pub request_timeout_secs: u64,
    pub timezone: Tz,
    pub reminder_lead_minutes: i64,
    pub starting_soon_minutes: i64,
    pub dashboard_rps: u32,
    pub calendar_layout: CalendarLayout,
    pub wizard_idle_minutes: u64,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let api_url = env::var("API_URL")
            .or_else(|_| env::var("NEXT_PUBLIC_API_URL"))
            .map_err(|_| {
                Error::Config("Missing environment variable: API_URL (or NEXT_PUBLIC_API_URL)".to_string())
            })?;

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            api_url: normalize_api_url(&api_url)?,
            api_token: get_env_opt("API_TOKEN"),
            api_session_cookie: get_env_opt("API_SESSION_COOKIE"),
            request_timeout_secs: get_env_parse_or("REQUEST_TIMEOUT_SECS", 30)?,
            timezone: crate::utils::time::parse_timezone(
                &env::var("TIMEZONE").unwrap_or_else(|_| "UTC".to_string()),
            )?,
            reminder_lead_minutes: get_env_parse_or("REMINDER_LEAD_MINUTES", 10)?,
            starting_soon_minutes: get_env_parse_or("STARTING_SOON_MINUTES", 15)?,
            dashboard_rps: get_env_parse_or("DASHBOARD_RPS", 50)?,
            calendar_layout: get_env_parse_or("CALENDAR_LAYOUT", CalendarLayout::Composite)?,
            wizard_idle_minutes: get_env_parse_or("WIZARD_IDLE_MINUTES", 24 * 60)?,
        })
    }

    /// Settings for a gateway talking to `api_url`, everything else at its default.
    pub fn for_backend(api_url: &str) -> Result<Self> {
        Ok(Self {
            server_address: "127.0.0.1:0".to_string(),
            api_url: normalize_api_url(api_url)?,
            api_token: None,
            api_session_cookie: None,
            request_timeout_secs: 30,
            timezone: chrono_tz::UTC,
            reminder_lead_minutes: 10,
            starting_soon_minutes: 15,
            dashboard_rps: 50,
            calendar_layout: CalendarLayout::Composite,
            wizard_idle_minutes: 24 * 60,
        })
    }
}

fn normalize_api_url(raw: &str) -> Result<String> {
    let parsed = url::Url::parse(raw.trim())
        .map_err(|e| Error::Config(format!("Invalid value for API_URL: {}", e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "Invalid value for API_URL: unsupported scheme {}",
            parsed.scheme()
        )));
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
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
