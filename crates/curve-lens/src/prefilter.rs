//! Pre-Filter Scorer
//!
//! Cheap composite heuristic that reduces the fetched candidate universe
//! to the batch sent to the model. The model does the final, qualitative
//! ranking; this pass only has to keep the interesting tokens in play.

use crate::model::{OnChainMetrics, TokenData};

/// Maximum number of candidates forwarded to the prompt builder
pub const MAX_CANDIDATES: usize = 20;

/// Unweighted sum of four dimensions: trade count, holder count, volume
/// momentum, and inverse top-10 concentration.
///
/// Deliberately unnormalized: trade count is in the hundreds while the
/// concentration term lives in [0, 1], so high-activity tokens dominate.
/// Kept bit-for-bit compatible with the original ranking; rebalancing the
/// weights is a product decision, not a cleanup.
pub fn pre_filter_score(metrics: &OnChainMetrics) -> f64 {
    metrics.trade_count as f64
        + metrics.holder_count as f64
        + metrics.volume_momentum
        + (1.0 - metrics.top10_concentration)
}

/// Rank candidates by composite score, descending, and keep the top
/// `min(MAX_CANDIDATES, n)`.
pub fn select_candidates(mut candidates: Vec<TokenData>) -> Vec<TokenData> {
    candidates.sort_by(|a, b| {
        pre_filter_score(&b.on_chain).total_cmp(&pre_filter_score(&a.on_chain))
    });
    candidates.truncate(MAX_CANDIDATES);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Curve, TechnicalMetrics, TrendDirection};
    use rust_decimal_macros::dec;

    fn token(id: &str, trade_count: usize, holders: usize, concentration: f64) -> TokenData {
        TokenData {
            curve: Curve {
                id: id.into(),
                name: id.into(),
                symbol: "TST".into(),
                total_volume_eth: dec!(1),
                last_price_usd: dec!(0.0001),
                trade_count: trade_count as u64,
                graduated: false,
                creator: "0xc".into(),
            },
            on_chain: OnChainMetrics {
                age_hours: 1.0,
                holder_count: holders,
                top10_concentration: concentration,
                buy_sell_ratio: 1.0,
                volume_momentum: 1.0,
                creator_sold_fraction: 0.0,
                bonding_curve_progress: 0.1,
                trade_count,
            },
            technical: TechnicalMetrics {
                price_change_1h: 0.0,
                price_change_24h: 0.0,
                trade_velocity: 0.0,
                trend_direction: TrendDirection::Flat,
            },
        }
    }

    #[test]
    fn test_returns_min_of_cap_and_population() {
        let few: Vec<TokenData> = (0..7).map(|i| token(&format!("c{i}"), i, i, 0.5)).collect();
        assert_eq!(select_candidates(few).len(), 7);

        let many: Vec<TokenData> =
            (0..35).map(|i| token(&format!("c{i}"), i, i, 0.5)).collect();
        assert_eq!(select_candidates(many).len(), MAX_CANDIDATES);
    }

    #[test]
    fn test_sorted_descending_without_duplicates() {
        let candidates: Vec<TokenData> =
            (0..30).map(|i| token(&format!("c{i}"), i * 3, i, 0.2)).collect();
        let selected = select_candidates(candidates);

        let scores: Vec<f64> = selected.iter().map(|t| pre_filter_score(&t.on_chain)).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));

        let mut ids: Vec<&str> = selected.iter().map(|t| t.curve.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), selected.len());
    }

    #[test]
    fn test_trade_count_dominates_unnormalized_sum() {
        // 300 trades beat perfect distribution; pins the known weighting
        let whale_magnet = token("active", 300, 5, 0.95);
        let distributed = token("fair", 10, 60, 0.10);

        let selected = select_candidates(vec![distributed, whale_magnet]);
        assert_eq!(selected[0].curve.id, "active");
    }
}
