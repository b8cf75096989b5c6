use crate::cache::MetricsCache;
use crate::errors::ApiError;
use crate::models::{
    Account, AdGroupRow, AnomalyFeed, ApiEnvelope, CampaignsData, DailyMetricRow, KeywordsData,
    KpiComparison, MetricTotals,
};
use futures::future::join_all;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::warn;

/// Freshness the cached fetch wrappers ask for. The cache itself takes the
/// max age per read, so callers with other tolerances can share entries.
pub const DEFAULT_TTL_MINUTES: i64 = 15;

/// Default anomaly refresh period.
pub const ANOMALY_REFRESH: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordDataType {
    Keywords,
    SearchTerms,
    Both,
}

impl KeywordDataType {
    pub fn as_str(self) -> &'static str {
        match self {
            KeywordDataType::Keywords => "keywords",
            KeywordDataType::SearchTerms => "search_terms",
            KeywordDataType::Both => "both",
        }
    }
}

/// Thin adapter over the dashboard backend's JSON API.
///
/// Every endpoint wraps its payload in `{success, data, message}` except
/// `/api/anomalies`, which returns `{anomalies, summary}` bare. That
/// inconsistency belongs to the backend contract; it is matched here, not
/// repaired.
#[derive(Clone)]
pub struct AdsClient {
    http: Client,
    base_url: String,
}

impl AdsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
        }
    }

    pub async fn accounts(&self) -> Result<Vec<Account>, ApiError> {
        self.get_enveloped("/api/accounts", &[]).await
    }

    pub async fn campaigns(&self, customer_id: &str, days: u32) -> Result<CampaignsData, ApiError> {
        self.get_enveloped(
            "/api/campaigns",
            &[
                ("customerId", customer_id.to_string()),
                ("dateRange", days.to_string()),
            ],
        )
        .await
    }

    pub async fn historical_data(
        &self,
        customer_id: &str,
        days: u32,
    ) -> Result<Vec<DailyMetricRow>, ApiError> {
        self.get_enveloped(
            "/api/historical-data",
            &[
                ("customerId", customer_id.to_string()),
                ("dateRange", days.to_string()),
            ],
        )
        .await
    }

    pub async fn ad_groups(
        &self,
        customer_id: &str,
        days: u32,
    ) -> Result<Vec<AdGroupRow>, ApiError> {
        self.get_enveloped(
            "/api/ad-groups",
            &[
                ("customerId", customer_id.to_string()),
                ("dateRange", days.to_string()),
                ("groupType", "all".to_string()),
            ],
        )
        .await
    }

    pub async fn keywords(
        &self,
        customer_id: &str,
        days: u32,
        data_type: KeywordDataType,
    ) -> Result<KeywordsData, ApiError> {
        self.get_enveloped(
            "/api/keywords",
            &[
                ("customerId", customer_id.to_string()),
                ("dateRange", days.to_string()),
                ("dataType", data_type.as_str().to_string()),
            ],
        )
        .await
    }

    pub async fn kpi_comparison(
        &self,
        customer_id: &str,
        days: u32,
    ) -> Result<KpiComparison, ApiError> {
        self.get_enveloped(
            "/api/kpi-comparison",
            &[
                ("customerId", customer_id.to_string()),
                ("dateRange", days.to_string()),
            ],
        )
        .await
    }

    /// The one endpoint without the `success` envelope.
    pub async fn anomalies(&self) -> Result<AnomalyFeed, ApiError> {
        let response = self
            .http
            .get(format!("{}/api/anomalies", self.base_url))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }
        Ok(response.json().await?)
    }

    async fn get_enveloped<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .query(query)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }
        let envelope: ApiEnvelope<T> = response.json().await?;
        if !envelope.success {
            return Err(ApiError::Api(
                envelope
                    .message
                    .unwrap_or_else(|| "backend reported failure".to_string()),
            ));
        }
        envelope
            .data
            .ok_or_else(|| ApiError::Api("success response without data".to_string()))
    }
}

/// Cache-first fetch wrappers with fail-safe defaults.
///
/// Each wrapper builds a logical key encoding every dimension that affects
/// the payload (account id, window length, data-type discriminator), serves
/// a fresh cache hit without touching the network, and converts any fetch
/// failure into a logged empty/zeroed default so one failed sub-fetch never
/// aborts an aggregate operation.
#[derive(Clone)]
pub struct DashboardFetcher {
    client: AdsClient,
    cache: Arc<Mutex<MetricsCache>>,
    ttl_minutes: i64,
}

impl DashboardFetcher {
    pub fn new(client: AdsClient, cache: MetricsCache) -> Self {
        Self {
            client,
            cache: Arc::new(Mutex::new(cache)),
            ttl_minutes: DEFAULT_TTL_MINUTES,
        }
    }

    pub fn with_ttl_minutes(mut self, ttl_minutes: i64) -> Self {
        self.ttl_minutes = ttl_minutes;
        self
    }

    pub async fn fetch_accounts(&self) -> Vec<Account> {
        let client = self.client.clone();
        self.cached("accounts".to_string(), || async move {
            client.accounts().await
        })
        .await
    }

    pub async fn fetch_campaigns(&self, customer_id: &str, days: u32) -> CampaignsData {
        let client = self.client.clone();
        let customer_id = customer_id.to_string();
        self.cached(format!("campaigns_{customer_id}_{days}days"), || async move {
            client.campaigns(&customer_id, days).await
        })
        .await
    }

    pub async fn fetch_historical(&self, customer_id: &str, days: u32) -> Vec<DailyMetricRow> {
        let client = self.client.clone();
        let customer_id = customer_id.to_string();
        self.cached(
            format!("historical_{customer_id}_{days}days"),
            || async move { client.historical_data(&customer_id, days).await },
        )
        .await
    }

    pub async fn fetch_ad_groups(&self, customer_id: &str, days: u32) -> Vec<AdGroupRow> {
        let client = self.client.clone();
        let customer_id = customer_id.to_string();
        self.cached(format!("adgroups_{customer_id}_{days}days"), || async move {
            client.ad_groups(&customer_id, days).await
        })
        .await
    }

    pub async fn fetch_keywords(
        &self,
        customer_id: &str,
        days: u32,
        data_type: KeywordDataType,
    ) -> KeywordsData {
        let client = self.client.clone();
        let customer_id = customer_id.to_string();
        let key = format!("keywords_{customer_id}_{days}days_{}", data_type.as_str());
        self.cached(key, || async move {
            client.keywords(&customer_id, days, data_type).await
        })
        .await
    }

    pub async fn fetch_kpi_comparison(&self, customer_id: &str, days: u32) -> KpiComparison {
        let client = self.client.clone();
        let customer_id = customer_id.to_string();
        self.cached(
            format!("kpi_comparison_{customer_id}_{days}days"),
            || async move { client.kpi_comparison(&customer_id, days).await },
        )
        .await
    }

    /// Combined totals for a one-day window across every account. The
    /// per-account fetches run in parallel with no ordering guarantee; an
    /// account whose fetch fails counts as zero.
    pub async fn today_click_totals(&self, accounts: &[Account]) -> MetricTotals {
        let fetches = accounts
            .iter()
            .map(|account| self.fetch_campaigns(&account.id, 1));
        let mut combined = MetricTotals::default();
        for data in join_all(fetches).await {
            combined.impressions = combined.impressions.saturating_add(data.totals.impressions);
            combined.clicks = combined.clicks.saturating_add(data.totals.clicks);
            combined.cost += data.totals.cost;
            combined.conversions += data.totals.conversions;
            combined.conversions_value += data.totals.conversions_value;
        }
        combined
    }

    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear_all();
    }

    async fn cached<T, F, Fut>(&self, key: String, fetch: F) -> T
    where
        T: Serialize + DeserializeOwned + Default,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        if let Some(hit) = self.cache.lock().await.read(&key, self.ttl_minutes) {
            return hit;
        }
        match fetch().await {
            Ok(value) => {
                self.cache.lock().await.write(&key, &value);
                value
            }
            Err(err) => {
                warn!("fetch for {key} failed, using empty default: {err}");
                T::default()
            }
        }
    }
}

/// Spawns a periodic anomaly refresh into the returned shared feed.
///
/// Each tick spawns its own request. There is no in-flight guard and no
/// cancellation: a slow refresh can overlap the next tick, and a stale
/// response can land after a newer one. See DESIGN.md before tightening
/// this.
pub fn spawn_anomaly_monitor(client: AdsClient, period: Duration) -> Arc<Mutex<AnomalyFeed>> {
    let feed = Arc::new(Mutex::new(AnomalyFeed::default()));
    let shared = Arc::clone(&feed);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let client = client.clone();
            let shared = Arc::clone(&shared);
            tokio::spawn(async move {
                match client.anomalies().await {
                    Ok(latest) => *shared.lock().await = latest,
                    Err(err) => warn!("anomaly refresh failed: {err}"),
                }
            });
        }
    });
    feed
}
