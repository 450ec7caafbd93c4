//! Technical Metrics Engine
//!
//! Price-change and trend features derived purely from a trade time
//! series. Assumes the newest-first ordering the data source guarantees
//! and degrades to zeros/Flat on thin or empty tapes.

use rust_decimal::prelude::ToPrimitive;

use crate::model::{TechnicalMetrics, Trade, TrendDirection};

/// Number of most-recent trades inspected for trend direction
const TREND_WINDOW: usize = 10;

/// Flat band: oldest-vs-newest moves within ±5% count as no trend
const TREND_BAND: f64 = 0.05;

/// Derive technical metrics from a newest-first trade list.
///
/// `age_hours` comes from the on-chain metrics pass; `now` is epoch
/// seconds, passed in for determinism.
pub fn compute_technical_metrics(trades: &[Trade], age_hours: f64, now: i64) -> TechnicalMetrics {
    let current_price = trades.first().map_or(0.0, |t| price_of(t));

    let one_hour_ago = now - 3600;
    let one_day_ago = now - 86_400;

    let price_at_1h = find_price_at(trades, one_hour_ago).unwrap_or(current_price);
    let price_at_24h = find_price_at(trades, one_day_ago).unwrap_or(current_price);

    let price_change_1h = signed_change(current_price, price_at_1h);
    let price_change_24h = signed_change(current_price, price_at_24h);

    // Trade velocity: trades in the last hour vs. lifetime hourly average
    let last_hour_trades = trades.iter().filter(|t| t.timestamp > one_hour_ago).count();
    let avg_hourly = if age_hours > 0.0 { trades.len() as f64 / age_hours } else { 0.0 };
    let trade_velocity = if avg_hourly > 0.0 {
        let v = last_hour_trades as f64 / avg_hourly;
        if v.is_finite() { v } else { 0.0 }
    } else {
        0.0
    };

    let window = &trades[..trades.len().min(TREND_WINDOW)];

    TechnicalMetrics {
        price_change_1h,
        price_change_24h,
        trade_velocity,
        trend_direction: detect_trend(window),
    }
}

fn price_of(trade: &Trade) -> f64 {
    trade.price_eth.to_f64().unwrap_or(0.0)
}

fn signed_change(current: f64, reference: f64) -> f64 {
    if reference > 0.0 {
        let change = (current - reference) / reference;
        if change.is_finite() { change } else { 0.0 }
    } else {
        0.0
    }
}

/// Price of the first trade at or before `target`, scanning newest-first.
/// When every trade is newer than the target, falls back to the oldest
/// available price; `None` only for an empty list.
fn find_price_at(trades: &[Trade], target: i64) -> Option<f64> {
    trades
        .iter()
        .find(|t| t.timestamp <= target)
        .or_else(|| trades.last())
        .map(price_of)
}

/// Newest-vs-oldest move across the recent window. Fewer than 3 trades
/// forces Flat.
fn detect_trend(window: &[Trade]) -> TrendDirection {
    if window.len() < 3 {
        return TrendDirection::Flat;
    }

    let newest = price_of(&window[0]);
    let oldest = price_of(&window[window.len() - 1]);
    if oldest == 0.0 {
        return TrendDirection::Flat;
    }

    let change = (newest - oldest) / oldest;
    if change > TREND_BAND {
        TrendDirection::Up
    } else if change < -TREND_BAND {
        TrendDirection::Down
    } else {
        TrendDirection::Flat
    }
}
