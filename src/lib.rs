pub mod aggregate;
pub mod cache;
pub mod classify;
pub mod client;
pub mod config;
pub mod errors;
pub mod kpi;
pub mod models;
pub mod sample;

pub use aggregate::{Granularity, GranularitySelection, aggregate, suggested_granularity};
pub use cache::MetricsCache;
pub use classify::{classify, classify_nonzero};
pub use client::{AdsClient, DashboardFetcher, KeywordDataType, spawn_anomaly_monitor};
pub use config::AppConfig;
pub use errors::ApiError;
pub use kpi::{change_quality, compute_kpis, format_kpi_value};
