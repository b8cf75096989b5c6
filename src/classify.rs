use crate::models::PerformanceTier;
use std::cmp::Ordering;

/// Metrics where a lower value is the better one. Shared with the KPI
/// change-quality labeling.
pub fn lower_is_better(metric: &str) -> bool {
    matches!(metric, "cost" | "avgCpc" | "cpc" | "cpa")
}

/// Ranks one entity's metric value against its peer set.
///
/// Thresholds are percentile cutoffs over the peers sorted best-first: the
/// value at index `floor(n * 0.33)` bounds the high tier, the value at
/// `floor(n * 0.67)` bounds the medium tier. For higher-is-better metrics
/// both bounds are strict, so an entity tied with every peer never ranks
/// high and the worst peer always lands low; for lower-is-better metrics the
/// high bound is inclusive, keeping the cheapest peer in the high tier.
/// Fewer than 3 peers is not enough signal and always yields medium.
///
/// The result is scope-dependent on purpose: the same absolute value can be
/// high in one filtered view and low in another, because the peer set
/// changes. There is no absolute threshold anywhere.
pub fn classify(value: f64, peers: &[f64], metric: &str) -> PerformanceTier {
    if peers.len() < 3 {
        return PerformanceTier::Medium;
    }

    let lower_wins = lower_is_better(metric);
    let mut sorted = peers.to_vec();
    sorted.sort_by(|a, b| {
        let order = a.partial_cmp(b).unwrap_or(Ordering::Equal);
        if lower_wins { order } else { order.reverse() }
    });

    let high_cutoff = sorted[(sorted.len() as f64 * 0.33).floor() as usize];
    let medium_cutoff = sorted[(sorted.len() as f64 * 0.67).floor() as usize];

    if lower_wins {
        if value <= high_cutoff {
            PerformanceTier::High
        } else if value < medium_cutoff {
            PerformanceTier::Medium
        } else {
            PerformanceTier::Low
        }
    } else if value > high_cutoff {
        PerformanceTier::High
    } else if value > medium_cutoff {
        PerformanceTier::Medium
    } else {
        PerformanceTier::Low
    }
}

/// Zero-filtering variant: structural zeros (entities with no spend or
/// activity) are dropped before computing thresholds, so legitimate low
/// non-zero performers are not all bucketed medium by a zero-skewed cutoff.
/// An empty or too-small non-zero set yields medium.
pub fn classify_nonzero(value: f64, peers: &[f64], metric: &str) -> PerformanceTier {
    let nonzero: Vec<f64> = peers.iter().copied().filter(|peer| *peer != 0.0).collect();
    classify(value, &nonzero, metric)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PerformanceTier::{High, Low, Medium};

    #[test]
    fn classification_is_peer_relative() {
        let modest_peers = [10.0, 10.0, 10.0, 100.0];
        assert_eq!(classify(100.0, &modest_peers, "clicks"), High);

        let strong_peers = [100.0, 200.0, 300.0, 400.0];
        assert_eq!(classify(100.0, &strong_peers, "clicks"), Low);
    }

    #[test]
    fn direction_inverts_for_cost_metrics() {
        let peers = [5.0, 50.0, 500.0];
        assert_eq!(classify(5.0, &peers, "cost"), High);
        assert_eq!(classify(50.0, &peers, "cost"), Medium);
        assert_eq!(classify(500.0, &peers, "cost"), Low);

        // Same numeric spread, higher-is-better: the best cost value is now
        // the worst, and nothing exceeds the top-third cutoff.
        assert_eq!(classify(5.0, &peers, "clicks"), Low);
        assert_eq!(classify(50.0, &peers, "clicks"), Medium);
        assert_eq!(classify(500.0, &peers, "clicks"), Medium);
    }

    #[test]
    fn higher_is_better_tiers_with_a_wider_peer_set() {
        let peers = [10.0, 20.0, 30.0, 40.0];
        assert_eq!(classify(40.0, &peers, "clicks"), High);
        assert_eq!(classify(30.0, &peers, "clicks"), Medium);
        assert_eq!(classify(20.0, &peers, "clicks"), Low);
        assert_eq!(classify(10.0, &peers, "clicks"), Low);
    }

    #[test]
    fn entity_tied_with_every_peer_never_ranks_high() {
        let peers = [100.0, 100.0, 100.0, 100.0];
        assert_eq!(classify(100.0, &peers, "clicks"), Low);
    }

    #[test]
    fn cpc_aliases_are_lower_is_better() {
        assert!(lower_is_better("cost"));
        assert!(lower_is_better("avgCpc"));
        assert!(lower_is_better("cpc"));
        assert!(lower_is_better("cpa"));
        assert!(!lower_is_better("roas"));
        assert!(!lower_is_better("clicks"));
    }

    #[test]
    fn fewer_than_three_peers_is_always_medium() {
        assert_eq!(classify(1_000_000.0, &[], "clicks"), Medium);
        assert_eq!(classify(1_000_000.0, &[1.0], "clicks"), Medium);
        assert_eq!(classify(0.0, &[1.0, 2.0], "cost"), Medium);
    }

    #[test]
    fn zero_filtering_unskews_thresholds() {
        // Many inactive campaigns drag the cutoffs toward zero; a small but
        // real performer should not rank high against them.
        let peers = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 2.0, 40.0, 60.0, 80.0];
        assert_eq!(classify(2.0, &peers, "clicks"), Medium);
        assert_eq!(classify_nonzero(2.0, &peers, "clicks"), Low);
        assert_eq!(classify_nonzero(80.0, &peers, "clicks"), High);
    }

    #[test]
    fn zero_filtering_with_no_nonzero_peers_is_medium() {
        let peers = [0.0, 0.0, 0.0, 0.0];
        assert_eq!(classify_nonzero(0.0, &peers, "clicks"), Medium);
        assert_eq!(classify_nonzero(5.0, &peers, "clicks"), Medium);
    }
}
