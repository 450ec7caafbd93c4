//! Candidate Data Sources
//!
//! Abstraction over the launchpad indexer that supplies curve, trade, and
//! position snapshots. The transport itself (subgraph, REST gateway) lives
//! behind this trait and is assumed to return well-formed domain records
//! with trades ordered newest-first.

mod mock;

pub use mock::MockCurveSource;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Curve, Position, Trade};

/// Ranking key for the candidate-universe query
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CurveSortKey {
    /// Cumulative ETH volume, descending
    TotalVolumeEth,
    /// Trade count, descending
    TradeCount,
    /// Creation time, newest first
    CreatedAt,
}

impl CurveSortKey {
    /// Indexer-side field name
    pub fn as_str(self) -> &'static str {
        match self {
            CurveSortKey::TotalVolumeEth => "totalVolumeEth",
            CurveSortKey::TradeCount => "tradeCount",
            CurveSortKey::CreatedAt => "createdAt",
        }
    }
}

/// Data source trait (Strategy pattern)
///
/// Implement this for each indexer backend.
#[async_trait]
pub trait CurveDataSource: Send + Sync {
    /// Fetch the candidate universe, ranked by `sort`, at most `limit` entries
    async fn fetch_curves(&self, sort: CurveSortKey, limit: usize) -> Result<Vec<Curve>>;

    /// Fetch a curve's recent trades, newest-first, at most `limit`
    async fn fetch_trades(&self, curve_id: &str, limit: usize) -> Result<Vec<Trade>>;

    /// Fetch a curve's current holder positions, at most `limit`
    async fn fetch_positions(&self, curve_id: &str, limit: usize) -> Result<Vec<Position>>;

    /// Source name (for logs)
    fn name(&self) -> &str;
}
