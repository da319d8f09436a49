use anyhow::{anyhow, Context};
use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

pub const DEFAULT_COUNTRIES_API_URL: &str =
    "https://restcountries.com/v2/all?fields=name,alpha2Code,capital,region,population,flag,currencies";
pub const DEFAULT_EXCHANGE_RATE_API_URL: &str = "https://open.er-api.com/v6/latest/USD";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub countries_api_url: String,
    pub exchange_rate_api_url: String,
    pub provider_connect_timeout: Duration,
    pub provider_read_timeout: Duration,
    pub summary_image_path: PathBuf,
    pub summary_font_path: Option<PathBuf>,
    pub refresh_batch_size: usize,
    /// `None` disables the background refresh.
    pub refresh_interval: Option<Duration>,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            db_path: "./db/countries.db".to_string(),
            cors_allow: vec!["*".to_string()],
            request_timeout: Duration::from_millis(30_000),
            countries_api_url: DEFAULT_COUNTRIES_API_URL.to_string(),
            exchange_rate_api_url: DEFAULT_EXCHANGE_RATE_API_URL.to_string(),
            provider_connect_timeout: Duration::from_millis(5_000),
            provider_read_timeout: Duration::from_millis(10_000),
            summary_image_path: PathBuf::from("cache/summary.png"),
            summary_font_path: None,
            refresh_batch_size: 50,
            refresh_interval: None,
            log_format: LogFormat::Text,
        }
    }
}

fn var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    var(name)
        .map(|raw| {
            raw.parse::<T>()
                .with_context(|| format!("Invalid {}: {:?}", name, raw))
        })
        .transpose()
}

impl Config {
    /// Reads `CC_*` variables, after loading an optional `.env` file.
    /// Unset variables keep their defaults; unparseable ones are an error.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let cors_allow = match var("CC_CORS_ALLOW_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.cors_allow,
        };

        let log_format = match var("CC_LOG_FORMAT").as_deref() {
            None => defaults.log_format,
            Some(v) if v.eq_ignore_ascii_case("text") => LogFormat::Text,
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(other) => return Err(anyhow!("Invalid CC_LOG_FORMAT: {:?}", other)),
        };

        let refresh_interval = parsed::<u64>("CC_REFRESH_INTERVAL_SECS")?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            listen_addr: parsed("CC_LISTEN_ADDR")?.unwrap_or(defaults.listen_addr),
            db_path: var("CC_DB_PATH").unwrap_or(defaults.db_path),
            cors_allow,
            request_timeout: parsed::<u64>("CC_REQUEST_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_timeout),
            countries_api_url: var("CC_COUNTRIES_API_URL").unwrap_or(defaults.countries_api_url),
            exchange_rate_api_url: var("CC_EXCHANGE_RATE_API_URL")
                .unwrap_or(defaults.exchange_rate_api_url),
            provider_connect_timeout: parsed::<u64>("CC_PROVIDER_CONNECT_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.provider_connect_timeout),
            provider_read_timeout: parsed::<u64>("CC_PROVIDER_READ_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.provider_read_timeout),
            summary_image_path: var("CC_SUMMARY_IMAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.summary_image_path),
            summary_font_path: var("CC_SUMMARY_FONT_PATH").map(PathBuf::from),
            refresh_batch_size: parsed::<usize>("CC_REFRESH_BATCH_SIZE")?
                .unwrap_or(defaults.refresh_batch_size)
                .max(1),
            refresh_interval,
            log_format,
        })
    }
}
