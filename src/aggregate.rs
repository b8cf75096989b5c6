use crate::kpi::DerivedRatios;
use crate::models::{DailyMetricRow, MetricBucket, MetricTotals};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
        }
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "daily" => Ok(Granularity::Daily),
            "weekly" => Ok(Granularity::Weekly),
            "monthly" => Ok(Granularity::Monthly),
            other => Err(format!("unknown granularity '{other}'")),
        }
    }
}

/// Granularity suggested for an `N`-day window. Advisory only; see
/// [`GranularitySelection`] for the caller override.
pub fn suggested_granularity(days: u32) -> Granularity {
    if days <= 30 {
        Granularity::Daily
    } else if days <= 90 {
        Granularity::Weekly
    } else {
        Granularity::Monthly
    }
}

/// Tracks an explicit caller override on top of the suggestion. Once set,
/// the override is sticky across date-range changes until cleared.
#[derive(Debug, Clone, Copy, Default)]
pub struct GranularitySelection {
    override_granularity: Option<Granularity>,
}

impl GranularitySelection {
    pub fn resolve(&self, days: u32) -> Granularity {
        self.override_granularity
            .unwrap_or_else(|| suggested_granularity(days))
    }

    pub fn set_override(&mut self, granularity: Granularity) {
        self.override_granularity = Some(granularity);
    }

    pub fn clear_override(&mut self) {
        self.override_granularity = None;
    }

    pub fn is_overridden(&self) -> bool {
        self.override_granularity.is_some()
    }
}

/// Re-buckets a daily series into the requested granularity.
///
/// The five additive fields are summed per bucket and every ratio is
/// recomputed from the bucket totals; per-day ratios are never averaged.
/// Output is ascending by bucket date regardless of input order. Empty input
/// yields empty output.
pub fn aggregate(rows: &[DailyMetricRow], granularity: Granularity) -> Vec<MetricBucket> {
    let mut buckets: BTreeMap<NaiveDate, MetricTotals> = BTreeMap::new();
    for row in rows {
        let bucket_date = match granularity {
            Granularity::Daily => row.date,
            Granularity::Weekly => week_start(row.date),
            Granularity::Monthly => month_start(row.date),
        };
        buckets.entry(bucket_date).or_default().add_row(row);
    }

    buckets
        .into_iter()
        .map(|(date, totals)| build_bucket(date, totals, granularity))
        .collect()
}

fn build_bucket(date: NaiveDate, totals: MetricTotals, granularity: Granularity) -> MetricBucket {
    let (bucket_key, label) = match granularity {
        Granularity::Daily => (date.to_string(), date.to_string()),
        Granularity::Weekly => (date.to_string(), week_label(date)),
        Granularity::Monthly => (
            date.format("%Y-%m").to_string(),
            date.format("%b %Y").to_string(),
        ),
    };
    let ratios = DerivedRatios::from_totals(&totals);
    MetricBucket {
        date,
        bucket_key,
        label,
        impressions: totals.impressions,
        clicks: totals.clicks,
        cost: totals.cost,
        conversions: totals.conversions,
        conversions_value: totals.conversions_value,
        ctr: ratios.ctr,
        avg_cpc: ratios.avg_cpc,
        conversion_rate: ratios.conversion_rate,
        cpa: ratios.cpa,
        roas: ratios.roas,
        poas: ratios.poas,
    }
}

/// Monday starting the ISO week of `date`. A Sunday maps to the previous
/// Monday, six days back.
fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn week_label(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}
