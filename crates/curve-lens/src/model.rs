//! Domain Models
//!
//! Read-only snapshots of launchpad state plus the metric structs derived
//! from them. Uses `rust_decimal` for all monetary values - never use f64
//! for money! Derived ratio metrics are f64 with explicit guards against
//! NaN and infinity at the point of computation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A tradable bonding-curve token instance.
///
/// Immutable snapshot per fetch; never mutated in process.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Curve {
    /// Curve identifier (contract-derived)
    pub id: String,

    /// Token name
    pub name: String,

    /// Ticker symbol
    pub symbol: String,

    /// Cumulative traded volume in ETH
    pub total_volume_eth: Decimal,

    /// Last trade price in USD
    pub last_price_usd: Decimal,

    /// Total number of executed trades
    pub trade_count: u64,

    /// Whether the token has exited the bonding curve
    pub graduated: bool,

    /// Creator address
    pub creator: String,
}

/// Side of an executed trade
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// One executed buy or sell against a curve.
///
/// Trade lists are newest-first by upstream convention; code that needs a
/// different order must re-sort rather than assume.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Trade {
    /// Buy or sell
    pub side: TradeSide,

    /// Execution price in ETH
    pub price_eth: Decimal,

    /// Execution time, epoch seconds
    pub timestamp: i64,

    /// Trader address
    pub trader: String,
}

/// A holder's current stake in a curve
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Position {
    /// Holder address
    pub holder: String,

    /// Held amount (token units)
    pub amount: Decimal,

    /// Realized PnL in ETH, where the indexer provides it
    pub realized_pnl: Option<Decimal>,

    /// Unrealized PnL in ETH, where the indexer provides it
    pub unrealized_pnl: Option<Decimal>,
}

/// Derived on-chain metrics for one curve.
///
/// All fraction fields are clamped to [0, 1]; ratio fields default to
/// neutral values (1.0) when there is no signal, never NaN.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OnChainMetrics {
    /// Hours since the first recorded trade (0 when no trades)
    pub age_hours: f64,

    /// Number of holders with a non-zero position
    pub holder_count: usize,

    /// Fraction of held supply controlled by the 10 largest holders
    pub top10_concentration: f64,

    /// Buy count over sell count (1.0 when no trades)
    pub buy_sell_ratio: f64,

    /// Recent-window volume vs. lifetime per-window average
    /// (1.0 when the token is younger than one window)
    pub volume_momentum: f64,

    /// Fraction of the creator's acquired stake already sold back
    pub creator_sold_fraction: f64,

    /// Progress toward graduation, 0..=1
    pub bonding_curve_progress: f64,

    /// Total trades observed in the fetched window
    pub trade_count: usize,
}

/// Short-term trend classification over the most recent trades
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendDirection::Up => write!(f, "up"),
            TrendDirection::Down => write!(f, "down"),
            TrendDirection::Flat => write!(f, "flat"),
        }
    }
}

/// Derived technical-analysis metrics for one curve
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TechnicalMetrics {
    /// Signed price change over the last hour (fraction, not percent)
    pub price_change_1h: f64,

    /// Signed price change over the last 24 hours
    pub price_change_24h: f64,

    /// Trades in the last hour vs. lifetime average hourly rate
    /// (0.0 when the lifetime average is zero)
    pub trade_velocity: f64,

    /// Trend over the most recent 10 trades
    pub trend_direction: TrendDirection,
}

/// A quantitative evidence source reported to the model
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    OnChain,
    Technical,
}

impl DataSource {
    /// Stable string key, as used in prompts and model replies
    pub fn as_key(self) -> &'static str {
        match self {
            DataSource::OnChain => "on_chain",
            DataSource::Technical => "technical",
        }
    }

    /// Match a model-supplied key; unknown keys yield `None` so callers
    /// can drop them instead of rejecting the record.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "on_chain" => Some(DataSource::OnChain),
            "technical" => Some(DataSource::Technical),
            _ => None,
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_key())
    }
}

/// One candidate assembled for the prompt builder: identity plus both
/// derived metric sets.
#[derive(Clone, Debug)]
pub struct TokenData {
    pub curve: Curve,
    pub on_chain: OnChainMetrics,
    pub technical: TechnicalMetrics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_side_serde_uppercase() {
        let json = serde_json::to_string(&TradeSide::Buy).unwrap();
        assert_eq!(json, "\"BUY\"");
        let side: TradeSide = serde_json::from_str("\"SELL\"").unwrap();
        assert_eq!(side, TradeSide::Sell);
    }

    #[test]
    fn test_data_source_keys() {
        assert_eq!(DataSource::OnChain.as_key(), "on_chain");
        assert_eq!(DataSource::from_key("technical"), Some(DataSource::Technical));
        assert_eq!(DataSource::from_key("news"), None);
    }

    #[test]
    fn test_trend_display() {
        assert_eq!(TrendDirection::Up.to_string(), "up");
        assert_eq!(TrendDirection::Flat.to_string(), "flat");
    }
}
