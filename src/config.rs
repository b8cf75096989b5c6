use crate::aggregate::Granularity;
use std::env;
use std::path::PathBuf;

/// Runtime configuration, read from the environment with local-dev defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub cache_path: PathBuf,
    pub customer_id: Option<String>,
    pub date_range_days: u32,
    /// Explicit granularity override; absent means the date range picks it.
    pub granularity: Option<Granularity>,
    pub watch_anomalies: bool,
    pub sample_fallback: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            api_base_url: env::var("ADS_API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            cache_path: env::var("ADS_CACHE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/cache.json")),
            customer_id: env::var("ADS_CUSTOMER_ID").ok(),
            date_range_days: env::var("ADS_DATE_RANGE_DAYS")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(30),
            granularity: env::var("ADS_GRANULARITY")
                .ok()
                .and_then(|value| value.parse().ok()),
            watch_anomalies: flag("ADS_WATCH"),
            sample_fallback: flag("ADS_SAMPLE_DATA"),
        }
    }
}

fn flag(name: &str) -> bool {
    matches!(env::var(name).as_deref(), Ok("1") | Ok("true"))
}
