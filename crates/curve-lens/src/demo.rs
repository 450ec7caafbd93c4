//! Demonstration Dataset
//!
//! Fixed fallback response used when a live run fails anywhere past
//! configuration validation. Keeps the product responsive when the
//! indexer or the model is down; the orchestrator flags it so callers can
//! label it.

use crate::model::DataSource;
use crate::schema::{
    RecommendationResponse, RiskLevel, SourceReasoning, SuggestedAction, TokenRecommendation,
};

/// The fixed demo response
pub fn demo_recommendation() -> RecommendationResponse {
    RecommendationResponse {
        market_summary: "The RobinPump market shows moderate activity with a mix of new \
                         launches and established tokens. Most tokens have high concentration \
                         risk. A few stand out with healthier holder distributions and \
                         sustained trading momentum."
            .into(),
        recommendations: vec![
            TokenRecommendation {
                curve_id: "demo-1".into(),
                name: "BaseBuilder".into(),
                symbol: "BBLDR".into(),
                robin_score: 71.0,
                explanation: "Strong holder diversification with 52 unique holders and low \
                              top-10 concentration at 48%. Volume momentum is 2.1x average, \
                              indicating growing interest. Curve is at 42% progress with \
                              steady accumulation."
                    .into(),
                contributing_sources: vec![DataSource::OnChain, DataSource::Technical],
                suggested_action: SuggestedAction::Buy,
                risk_level: RiskLevel::Medium,
                reasoning: SourceReasoning {
                    on_chain: Some(
                        "52 holders, 48% top-10 concentration, creator retained position. \
                         Healthy buy/sell ratio of 2.8."
                            .into(),
                    ),
                    technical: Some(
                        "Price up 12% in the last hour with accelerating trade velocity at 2.1x."
                            .into(),
                    ),
                },
            },
            TokenRecommendation {
                curve_id: "demo-2".into(),
                name: "DeFi Scout".into(),
                symbol: "SCOUT".into(),
                robin_score: 64.0,
                explanation: "Clear utility concept targeting DeFi portfolio tracking. 38 \
                              holders with moderate concentration. Trading activity is \
                              consistent though not explosive."
                    .into(),
                contributing_sources: vec![DataSource::OnChain],
                suggested_action: SuggestedAction::Hold,
                risk_level: RiskLevel::Medium,
                reasoning: SourceReasoning {
                    on_chain: Some(
                        "38 holders, 58% top-10 concentration. Creator has not sold. Curve \
                         at 28% progress."
                            .into(),
                    ),
                    technical: None,
                },
            },
            TokenRecommendation {
                curve_id: "demo-3".into(),
                name: "MemeVault".into(),
                symbol: "MVLT".into(),
                robin_score: 45.0,
                explanation: "High trading volume but concerning holder concentration at \
                              72%. Buy/sell ratio is dropping, suggesting early buyers are \
                              taking profit."
                    .into(),
                contributing_sources: vec![DataSource::OnChain, DataSource::Technical],
                suggested_action: SuggestedAction::Avoid,
                risk_level: RiskLevel::High,
                reasoning: SourceReasoning {
                    on_chain: Some(
                        "28 holders, 72% top-10 concentration. Creator sold 15% of position."
                            .into(),
                    ),
                    technical: Some(
                        "Price down 8% in last hour. Trend direction is down with declining \
                         velocity."
                            .into(),
                    ),
                },
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_set_is_ranked_and_within_bounds() {
        let demo = demo_recommendation();
        assert_eq!(demo.recommendations.len(), 3);
        assert!(!demo.market_summary.is_empty());

        let scores: Vec<f64> = demo.recommendations.iter().map(|r| r.robin_score).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        assert!(scores.iter().all(|s| (0.0..=100.0).contains(s)));
    }
}
