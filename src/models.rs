use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One calendar day of performance for a scope (account, campaign, keyword).
/// The backend omits fields that are zero, so every counter defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyMetricRow {
    pub date: NaiveDate,
    #[serde(default)]
    pub impressions: u64,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub conversions: f64,
    #[serde(default)]
    pub conversions_value: f64,
}

/// Additive period totals. Ratios are never stored here; they are recomputed
/// from these fields wherever they are needed.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricTotals {
    #[serde(default)]
    pub impressions: u64,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub conversions: f64,
    #[serde(default)]
    pub conversions_value: f64,
}

impl MetricTotals {
    pub fn add_row(&mut self, row: &DailyMetricRow) {
        self.impressions = self.impressions.saturating_add(row.impressions);
        self.clicks = self.clicks.saturating_add(row.clicks);
        self.cost += row.cost;
        self.conversions += row.conversions;
        self.conversions_value += row.conversions_value;
    }
}

/// One weekly or monthly bucket (or a single day at daily granularity).
/// Additive fields are sums over the member rows; every ratio is recomputed
/// from those sums, never averaged across days.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricBucket {
    pub date: NaiveDate,
    pub bucket_key: String,
    pub label: String,
    pub impressions: u64,
    pub clicks: u64,
    pub cost: f64,
    pub conversions: f64,
    pub conversions_value: f64,
    pub ctr: f64,
    pub avg_cpc: f64,
    pub conversion_rate: f64,
    pub cpa: f64,
    pub roas: f64,
    pub poas: f64,
}

/// Relative performance of one entity for one metric, within a peer set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceTier {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(flatten)]
    pub totals: MetricTotals,
}

/// `/api/campaigns` payload: the campaign list plus account-level totals for
/// the requested window.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CampaignsData {
    #[serde(default)]
    pub campaigns: Vec<Campaign>,
    #[serde(default)]
    pub totals: MetricTotals,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AdGroupRow {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub campaign_name: String,
    #[serde(default)]
    pub group_type: String,
    #[serde(flatten)]
    pub totals: MetricTotals,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct KeywordRow {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub match_type: String,
    #[serde(default)]
    pub campaign_name: String,
    #[serde(flatten)]
    pub totals: MetricTotals,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct KeywordSummary {
    #[serde(default)]
    pub total_keywords: u64,
    #[serde(default)]
    pub total_search_terms: u64,
}

/// `/api/keywords` payload. `search_terms` is empty unless the caller asked
/// for `search_terms` or `both`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct KeywordsData {
    #[serde(default)]
    pub keywords: Vec<KeywordRow>,
    #[serde(default)]
    pub search_terms: Vec<KeywordRow>,
    #[serde(default)]
    pub summary: KeywordSummary,
}

/// Period-over-period percentage delta per KPI id, as returned by
/// `/api/kpi-comparison`.
pub type KpiComparison = BTreeMap<String, f64>;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    #[serde(default)]
    pub metric: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub customer_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnomalySummary {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub high: u64,
    #[serde(default)]
    pub medium: u64,
    #[serde(default)]
    pub low: u64,
}

/// The anomalies endpoint does not use the `{success, data}` envelope; it
/// returns this shape directly. The asymmetry is part of the backend contract
/// and is decoded as-is in the client.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyFeed {
    #[serde(default)]
    pub anomalies: Vec<Anomaly>,
    #[serde(default)]
    pub summary: AnomalySummary,
}

/// Standard response wrapper for every endpoint except `/api/anomalies`.
/// The `Option` fields deserialize to `None` when absent without a `default`
/// attribute; spelling `default` out would add a spurious `T: Default` bound
/// to the derived `Deserialize` impl.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignKind {
    Search,
    PerformanceMax,
    Shopping,
    Display,
    Video,
    Other,
}

/// Infers the campaign type from its display name. The backend does not
/// expose a type field, so this substring heuristic is the only signal;
/// keeping it in one place lets a real field replace it without touching
/// call sites.
pub fn campaign_kind(name: &str) -> CampaignKind {
    let name = name.to_lowercase();
    if name.contains("performance max") || name.contains("pmax") {
        CampaignKind::PerformanceMax
    } else if name.contains("shopping") {
        CampaignKind::Shopping
    } else if name.contains("display") {
        CampaignKind::Display
    } else if name.contains("video") || name.contains("youtube") {
        CampaignKind::Video
    } else if name.contains("search") {
        CampaignKind::Search
    } else {
        CampaignKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn campaign_kind_matches_substrings() {
        assert_eq!(
            campaign_kind("NL | Performance Max | Carpets"),
            CampaignKind::PerformanceMax
        );
        assert_eq!(campaign_kind("DE pMax feed"), CampaignKind::PerformanceMax);
        assert_eq!(campaign_kind("Brand Search BE"), CampaignKind::Search);
        assert_eq!(campaign_kind("Smart Shopping SE"), CampaignKind::Shopping);
        assert_eq!(campaign_kind("YouTube awareness"), CampaignKind::Video);
        assert_eq!(campaign_kind("Spring promo"), CampaignKind::Other);
    }

    #[test]
    fn daily_row_defaults_missing_counters_to_zero() {
        let row: DailyMetricRow =
            serde_json::from_str(r#"{"date":"2026-03-02","clicks":4}"#).unwrap();
        assert_eq!(row.clicks, 4);
        assert_eq!(row.impressions, 0);
        assert_eq!(row.cost, 0.0);
        assert_eq!(row.conversions, 0.0);
    }

    #[test]
    fn envelope_decodes_without_data() {
        let env: ApiEnvelope<CampaignsData> =
            serde_json::from_str(r#"{"success":false,"message":"no access"}"#).unwrap();
        assert!(!env.success);
        assert!(env.data.is_none());
        assert_eq!(env.message.as_deref(), Some("no access"));
    }

    // The client decodes envelopes behind a bare `DeserializeOwned` bound,
    // so the envelope must not require `T: Default` to deserialize.
    fn decode_enveloped<T: serde::de::DeserializeOwned>(body: &str) -> ApiEnvelope<T> {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn envelope_needs_only_deserialize_from_its_payload() {
        let env: ApiEnvelope<Vec<Account>> =
            decode_enveloped(r#"{"success":true,"data":[{"id":"1","name":"NL"}]}"#);
        assert!(env.success);
        assert_eq!(env.data.unwrap()[0].id, "1");

        let empty: ApiEnvelope<Vec<Account>> = decode_enveloped(r#"{"success":true}"#);
        assert!(empty.data.is_none());
        assert!(empty.message.is_none());
    }
}
