use crate::models::DailyMetricRow;
use chrono::{Duration, NaiveDate};
use rand::Rng;

/// Source of placeholder metric rows for demos and empty backends.
///
/// Implementations are explicitly fake. Output must stay clearly labeled and
/// must never be mixed into real computed metrics.
pub trait SampleDataProvider {
    /// Plausible daily rows for the `days`-day window ending at `end`,
    /// ascending by date.
    fn daily_rows(&self, end: NaiveDate, days: u32) -> Vec<DailyMetricRow>;
}

/// Random but internally consistent sample rows.
pub struct RandomSamples;

impl SampleDataProvider for RandomSamples {
    fn daily_rows(&self, end: NaiveDate, days: u32) -> Vec<DailyMetricRow> {
        let mut rng = rand::thread_rng();
        (0..days)
            .rev()
            .map(|offset| {
                let impressions = rng.gen_range(400..4_000);
                let clicks = rng.gen_range(impressions / 100..impressions / 10);
                let conversions = clicks as f64 * rng.gen_range(0.02..0.10);
                DailyMetricRow {
                    date: end - Duration::days(offset as i64),
                    impressions,
                    clicks,
                    cost: clicks as f64 * rng.gen_range(0.20..2.50),
                    conversions,
                    conversions_value: conversions * rng.gen_range(20.0..80.0),
                }
            })
            .collect()
    }
}

/// Production stand-in: no fallback data at all.
pub struct NoSamples;

impl SampleDataProvider for NoSamples {
    fn daily_rows(&self, _end: NaiveDate, _days: u32) -> Vec<DailyMetricRow> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_rows_cover_the_window_ascending() {
        let end: NaiveDate = "2026-03-08".parse().unwrap();
        let rows = RandomSamples.daily_rows(end, 14);
        assert_eq!(rows.len(), 14);
        assert_eq!(rows.first().unwrap().date, "2026-02-23".parse().unwrap());
        assert_eq!(rows.last().unwrap().date, end);
        for pair in rows.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
        for row in &rows {
            assert!(row.clicks <= row.impressions);
            assert!(row.cost > 0.0);
        }
    }

    #[test]
    fn disabled_provider_yields_nothing() {
        let end: NaiveDate = "2026-03-08".parse().unwrap();
        assert!(NoSamples.daily_rows(end, 30).is_empty());
    }
}
