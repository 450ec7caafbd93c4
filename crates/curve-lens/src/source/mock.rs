//! Mock Curve Data Source
//!
//! For testing and demo purposes. Returns deterministic, realistic-looking
//! launchpad snapshots without touching the network.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{CurveDataSource, CurveSortKey};
use crate::error::Result;
use crate::model::{Curve, Position, Trade, TradeSide};

/// Mock data source with a small canned universe
pub struct MockCurveSource;

impl Default for MockCurveSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCurveSource {
    pub fn new() -> Self {
        Self
    }

    /// (id, name, symbol, volume_eth, price_usd, trades, graduated)
    fn universe() -> Vec<(&'static str, &'static str, &'static str, Decimal, Decimal, u64, bool)> {
        vec![
            ("curve-builder", "BaseBuilder", "BBLDR", dec!(3.4), dec!(0.00042), 240, false),
            ("curve-scout", "DeFi Scout", "SCOUT", dec!(1.9), dec!(0.00021), 130, false),
            ("curve-vault", "MemeVault", "MVLT", dec!(5.1), dec!(0.00088), 410, false),
            ("curve-pixel", "PixelPets", "PXP", dec!(0.6), dec!(0.00005), 45, false),
            ("curve-grad", "Graduated One", "GRAD", dec!(9.2), dec!(0.00310), 900, true),
            ("curve-quiet", "QuietCoin", "QUIET", dec!(0.1), dec!(0.00001), 6, false),
        ]
    }

    /// Deterministic per-curve seed so generated histories are stable
    fn seed(curve_id: &str) -> u64 {
        curve_id.bytes().fold(7u64, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(b)))
    }
}

#[async_trait]
impl CurveDataSource for MockCurveSource {
    async fn fetch_curves(&self, sort: CurveSortKey, limit: usize) -> Result<Vec<Curve>> {
        let mut curves: Vec<Curve> = Self::universe()
            .into_iter()
            .map(|(id, name, symbol, volume, price, trades, graduated)| Curve {
                id: id.into(),
                name: name.into(),
                symbol: symbol.into(),
                total_volume_eth: volume,
                last_price_usd: price,
                trade_count: trades,
                graduated,
                creator: format!("0xc0ffee{:08x}", Self::seed(id) & 0xffff_ffff),
            })
            .collect();

        match sort {
            CurveSortKey::TotalVolumeEth => {
                curves.sort_by(|a, b| b.total_volume_eth.cmp(&a.total_volume_eth));
            }
            CurveSortKey::TradeCount => curves.sort_by(|a, b| b.trade_count.cmp(&a.trade_count)),
            CurveSortKey::CreatedAt => {}
        }

        curves.truncate(limit);
        Ok(curves)
    }

    async fn fetch_trades(&self, curve_id: &str, limit: usize) -> Result<Vec<Trade>> {
        let seed = Self::seed(curve_id);
        let now = Utc::now().timestamp();
        let count = ((seed % 40) + 8).min(limit as u64);
        let base_price = Decimal::new(10 + (seed % 90) as i64, 6); // 1e-5 .. 1e-4 ETH

        // Newest-first, ~4 minutes apart, gently drifting price
        let trades = (0..count)
            .map(|i| {
                let drift = Decimal::new((count - i) as i64, 2); // older = lower
                Trade {
                    side: if (seed + i) % 3 == 0 { TradeSide::Sell } else { TradeSide::Buy },
                    price_eth: base_price * (Decimal::ONE + drift / Decimal::from(100)),
                    timestamp: now - (i as i64) * 240,
                    trader: format!("0x{:040x}", seed.wrapping_mul(i + 1)),
                }
            })
            .collect();

        Ok(trades)
    }

    async fn fetch_positions(&self, curve_id: &str, limit: usize) -> Result<Vec<Position>> {
        let seed = Self::seed(curve_id);
        let count = ((seed % 30) + 5).min(limit as u64);

        // Decaying holder sizes so top-10 concentration is meaningful
        let positions = (0..count)
            .map(|i| Position {
                holder: format!("0x{:040x}", seed.wrapping_add(i * 17)),
                amount: Decimal::from(1_000_000u64 / (i + 1)),
                realized_pnl: None,
                unrealized_pnl: None,
            })
            .collect();

        Ok(positions)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_universe_is_sorted_and_limited() {
        let source = MockCurveSource::new();
        let curves = source.fetch_curves(CurveSortKey::TotalVolumeEth, 3).await.unwrap();
        assert_eq!(curves.len(), 3);
        assert!(curves[0].total_volume_eth >= curves[1].total_volume_eth);
        assert!(curves[1].total_volume_eth >= curves[2].total_volume_eth);
    }

    #[tokio::test]
    async fn test_trades_are_newest_first() {
        let source = MockCurveSource::new();
        let trades = source.fetch_trades("curve-builder", 100).await.unwrap();
        assert!(!trades.is_empty());
        assert!(trades.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[tokio::test]
    async fn test_positions_decay() {
        let source = MockCurveSource::new();
        let positions = source.fetch_positions("curve-vault", 50).await.unwrap();
        assert!(positions.len() >= 5);
        assert!(positions.windows(2).all(|w| w[0].amount >= w[1].amount));
    }
}
