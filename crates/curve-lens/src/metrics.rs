//! On-Chain Metrics Engine
//!
//! Pure derivation of holder, momentum, and curve-progress features from a
//! curve snapshot plus its trade/position history. Total over all inputs:
//! empty histories produce documented neutral defaults, never NaN or a
//! division error.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::model::{Curve, OnChainMetrics, Position, Trade, TradeSide};

/// Width of the momentum window, in seconds
const MOMENTUM_WINDOW_SECS: i64 = 3600;

/// Cumulative ETH volume at which a curve graduates. Progress is reported
/// against this target; graduated curves pin to 1.0 regardless.
const GRADUATION_VOLUME_ETH: f64 = 8.0;

/// Clamp a fraction into [0, 1], mapping NaN/infinity to the floor.
fn clamp01(value: f64) -> f64 {
    if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 }
}

/// Replace a non-finite ratio with its neutral default.
fn finite_or(value: f64, neutral: f64) -> f64 {
    if value.is_finite() { value } else { neutral }
}

/// Derive on-chain metrics for one curve.
///
/// `now` is epoch seconds; passing it in keeps the function pure and the
/// tests deterministic.
pub fn compute_on_chain_metrics(
    curve: &Curve,
    trades: &[Trade],
    positions: &[Position],
    now: i64,
) -> OnChainMetrics {
    let age_hours = trades
        .iter()
        .map(|t| t.timestamp)
        .min()
        .map_or(0.0, |first| ((now - first).max(0) as f64) / 3600.0);

    let holder_count = positions.iter().filter(|p| p.amount > Decimal::ZERO).count();

    OnChainMetrics {
        age_hours,
        holder_count,
        top10_concentration: top10_concentration(positions),
        buy_sell_ratio: buy_sell_ratio(trades),
        volume_momentum: volume_momentum(trades, age_hours, now),
        creator_sold_fraction: creator_sold_fraction(trades, &curve.creator),
        bonding_curve_progress: bonding_curve_progress(curve),
        trade_count: trades.len(),
    }
}

/// Fraction of held supply owned by the 10 largest holders. Unknown or
/// zero total supply reports 0.
fn top10_concentration(positions: &[Position]) -> f64 {
    let total: Decimal = positions.iter().map(|p| p.amount).sum();
    if total <= Decimal::ZERO {
        return 0.0;
    }

    let mut amounts: Vec<Decimal> = positions.iter().map(|p| p.amount).collect();
    amounts.sort_unstable_by(|a, b| b.cmp(a));

    let top: Decimal = amounts.iter().take(10).copied().sum();
    clamp01((top / total).to_f64().unwrap_or(0.0))
}

/// Buys over sells. No trades at all is neutral 1.0; a sell-free tape
/// divides by one instead of zero.
fn buy_sell_ratio(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 1.0;
    }
    let buys = trades.iter().filter(|t| t.side == TradeSide::Buy).count();
    let sells = trades.iter().filter(|t| t.side == TradeSide::Sell).count();
    finite_or(buys as f64 / sells.max(1) as f64, 1.0)
}

/// Traded value in the most recent window vs. the mean per equivalent
/// window over the token's whole age. Tokens younger than one window
/// report neutral 1.0 rather than an inflated ratio.
fn volume_momentum(trades: &[Trade], age_hours: f64, now: i64) -> f64 {
    let window_hours = MOMENTUM_WINDOW_SECS as f64 / 3600.0;
    if trades.is_empty() || age_hours < window_hours {
        return 1.0;
    }

    let cutoff = now - MOMENTUM_WINDOW_SECS;
    let recent: f64 = trades
        .iter()
        .filter(|t| t.timestamp > cutoff)
        .map(|t| t.price_eth.to_f64().unwrap_or(0.0))
        .sum();
    let total: f64 = trades.iter().map(|t| t.price_eth.to_f64().unwrap_or(0.0)).sum();

    let windows = age_hours / window_hours;
    let per_window = total / windows;
    if per_window <= 0.0 {
        return 1.0;
    }
    finite_or(recent / per_window, 1.0)
}

/// Fraction of the creator's acquired stake already sold back, from the
/// creator's own trades. Without a recorded creator buy, any creator sell
/// counts as a full exit.
fn creator_sold_fraction(trades: &[Trade], creator: &str) -> f64 {
    let buys = trades
        .iter()
        .filter(|t| t.trader == creator && t.side == TradeSide::Buy)
        .count();
    let sells = trades
        .iter()
        .filter(|t| t.trader == creator && t.side == TradeSide::Sell)
        .count();

    if buys == 0 {
        return if sells > 0 { 1.0 } else { 0.0 };
    }
    clamp01(sells as f64 / buys as f64)
}

/// Progress toward graduation, 0..=1, measured by cumulative volume.
fn bonding_curve_progress(curve: &Curve) -> f64 {
    if curve.graduated {
        return 1.0;
    }
    clamp01(curve.total_volume_eth.to_f64().unwrap_or(0.0) / GRADUATION_VOLUME_ETH)
}
