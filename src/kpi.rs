use crate::classify::lower_is_better;
use crate::models::MetricTotals;
use serde::Serialize;

/// The six ratio KPIs, always recomputed from additive totals. Dividing by a
/// zero denominator yields `0.0`, matching the backend's conventions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DerivedRatios {
    pub ctr: f64,
    pub avg_cpc: f64,
    pub conversion_rate: f64,
    pub cpa: f64,
    pub roas: f64,
    pub poas: f64,
}

impl DerivedRatios {
    pub fn from_totals(totals: &MetricTotals) -> Self {
        let impressions = totals.impressions as f64;
        let clicks = totals.clicks as f64;
        Self {
            ctr: ratio(clicks, impressions) * 100.0,
            avg_cpc: ratio(totals.cost, clicks),
            conversion_rate: ratio(totals.conversions, clicks) * 100.0,
            cpa: ratio(totals.cost, totals.conversions),
            roas: ratio(totals.conversions_value, totals.cost),
            poas: ratio(totals.conversions_value, totals.cost) * 100.0,
        }
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Full KPI set for one period: the five additive totals plus the derived
/// ratios.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiReport {
    #[serde(flatten)]
    pub totals: MetricTotals,
    #[serde(flatten)]
    pub ratios: DerivedRatios,
}

pub fn compute_kpis(totals: &MetricTotals) -> KpiReport {
    KpiReport {
        ratios: DerivedRatios::from_totals(totals),
        totals: totals.clone(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KpiFormat {
    Count,
    Currency,
    Percent,
    Number,
}

// Exhaustive over the known KPI ids; `conversions` and `roas` stay plain
// numbers (conversions are fractional under attribution, rounded only here
// at the display boundary).
const KPI_FORMATS: &[(&str, KpiFormat)] = &[
    ("impressions", KpiFormat::Count),
    ("clicks", KpiFormat::Count),
    ("cost", KpiFormat::Currency),
    ("conversions", KpiFormat::Number),
    ("conversionsValue", KpiFormat::Currency),
    ("ctr", KpiFormat::Percent),
    ("avgCpc", KpiFormat::Currency),
    ("conversionRate", KpiFormat::Percent),
    ("cpa", KpiFormat::Currency),
    ("roas", KpiFormat::Number),
    ("poas", KpiFormat::Percent),
];

/// Formats a KPI value for display. Unknown ids fall back to a plain
/// numeric string.
pub fn format_kpi_value(kpi_id: &str, value: f64) -> String {
    let format = KPI_FORMATS
        .iter()
        .find(|(id, _)| *id == kpi_id)
        .map(|(_, format)| *format);
    match format {
        Some(KpiFormat::Count) => group_thousands(value.round() as i64),
        Some(KpiFormat::Currency) => format!("€{value:.2}"),
        Some(KpiFormat::Percent) => format!("{value:.2}%"),
        Some(KpiFormat::Number) => format!("{value:.2}"),
        None => value.to_string(),
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Buckets a period-over-period percentage delta into a qualitative label.
/// Whether the change is favorable depends on the delta's sign and on
/// whether lower is better for the KPI.
pub fn change_quality(delta_pct: f64, kpi_id: &str) -> &'static str {
    let favorable = if lower_is_better(kpi_id) {
        delta_pct < 0.0
    } else {
        delta_pct > 0.0
    };
    let magnitude = delta_pct.abs();
    if magnitude >= 20.0 {
        if favorable { "Excellent" } else { "Needs Attention" }
    } else if magnitude >= 10.0 {
        if favorable { "Good" } else { "Declining" }
    } else if magnitude >= 5.0 {
        "Stable"
    } else {
        "Minimal Change"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals() -> MetricTotals {
        MetricTotals {
            impressions: 700,
            clicks: 70,
            cost: 350.0,
            conversions: 7.0,
            conversions_value: 140.0,
        }
    }

    #[test]
    fn ratios_follow_the_invariants() {
        let ratios = DerivedRatios::from_totals(&totals());
        assert_eq!(ratios.ctr, 10.0);
        assert_eq!(ratios.avg_cpc, 5.0);
        assert_eq!(ratios.conversion_rate, 10.0);
        assert_eq!(ratios.cpa, 50.0);
        assert_eq!(ratios.roas, 0.4);
        assert_eq!(ratios.poas, 40.0);
    }

    #[test]
    fn zero_denominators_yield_zero() {
        let ratios = DerivedRatios::from_totals(&MetricTotals::default());
        assert_eq!(ratios.ctr, 0.0);
        assert_eq!(ratios.avg_cpc, 0.0);
        assert_eq!(ratios.conversion_rate, 0.0);
        assert_eq!(ratios.cpa, 0.0);
        assert_eq!(ratios.roas, 0.0);
        assert_eq!(ratios.poas, 0.0);
    }

    #[test]
    fn formatter_routes_by_kpi_id() {
        assert_eq!(format_kpi_value("impressions", 1_234_567.0), "1,234,567");
        assert_eq!(format_kpi_value("clicks", 980.0), "980");
        assert_eq!(format_kpi_value("cost", 350.5), "€350.50");
        assert_eq!(format_kpi_value("avgCpc", 5.0), "€5.00");
        assert_eq!(format_kpi_value("ctr", 10.0), "10.00%");
        assert_eq!(format_kpi_value("poas", 40.0), "40.00%");
        assert_eq!(format_kpi_value("conversions", 7.25), "7.25");
        assert_eq!(format_kpi_value("roas", 0.4), "0.40");
    }

    #[test]
    fn unknown_kpi_falls_back_to_plain_number() {
        assert_eq!(format_kpi_value("qualityScore", 8.5), "8.5");
    }

    #[test]
    fn change_quality_polarity_inverts_for_cost_kpis() {
        assert_eq!(change_quality(-25.0, "cost"), "Excellent");
        assert_eq!(change_quality(25.0, "cost"), "Needs Attention");
        assert_eq!(change_quality(25.0, "clicks"), "Excellent");
        assert_eq!(change_quality(-25.0, "clicks"), "Needs Attention");
    }

    #[test]
    fn change_quality_magnitude_buckets() {
        assert_eq!(change_quality(12.0, "clicks"), "Good");
        assert_eq!(change_quality(-12.0, "clicks"), "Declining");
        assert_eq!(change_quality(7.0, "clicks"), "Stable");
        assert_eq!(change_quality(-7.0, "clicks"), "Stable");
        assert_eq!(change_quality(2.0, "clicks"), "Minimal Change");
        assert_eq!(change_quality(0.0, "clicks"), "Minimal Change");
    }
}
