use std::path::PathBuf;
use std::time::Duration;

/// Default API server URL.
/// Override at build time: PORTAL_API_URL=https://example.com cargo build
pub const API_SERVER_URL: &str = match option_env!("PORTAL_API_URL") {
    Some(url) => url,
    None => "http://127.0.0.1:8000",
};

/// How long an image slide stays on screen before the carousel advances.
pub const DEFAULT_IMAGE_INTERVAL: Duration = Duration::from_secs(7);

pub const DEFAULT_LOG_FILTER: &str = "coach_portal=info";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    /// Directory holding the settings database (session tokens).
    pub data_dir: PathBuf,
    pub image_interval: Duration,
    pub log_filter: String,
    /// Environment values that were rejected in favour of a default. Config
    /// is read before the logger exists, so these are reported by
    /// [`Config::log_rejected`] once it does.
    pub rejected: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: API_SERVER_URL.trim().trim_end_matches('/').to_string(),
            data_dir: PathBuf::from(".coach-portal"),
            image_interval: DEFAULT_IMAGE_INTERVAL,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            rejected: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = get("PORTAL_IMAGE_INTERVAL_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.image_interval = Duration::from_millis(ms),
                _ => config.rejected.push(format!(
                    "Invalid PORTAL_IMAGE_INTERVAL_MS value {:?}, using default",
                    raw
                )),
            }
        }

        if let Some(raw) = get("PORTAL_API_URL") {
            match parse_base_url(&raw) {
                Some(url) => config.api_base_url = url,
                None => config
                    .rejected
                    .push(format!("Invalid PORTAL_API_URL value {:?}, using default", raw)),
            }
        }

        if let Some(dir) = get("PORTAL_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(filter) = get("PORTAL_LOG") {
            config.log_filter = filter;
        }
        config
    }

    pub fn log_rejected(&self) {
        for message in &self.rejected {
            log::warn!("{}", message);
        }
    }

    pub fn with_api_base_url(mut self, url: &str) -> Self {
        self.api_base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_image_interval(mut self, interval: Duration) -> Self {
        self.image_interval = interval;
        self
    }
}

/// Accept only absolute http(s) URLs; returns the URL without trailing
/// slashes.
fn parse_base_url(raw: &str) -> Option<String> {
    let url = url::Url::parse(raw.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return None;
    }
    Some(raw.trim().trim_end_matches('/').to_string())
}
