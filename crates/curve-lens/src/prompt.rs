//! Prompt Builder
//!
//! Deterministic rendering of the filtered candidate batch into the
//! system/user prompt pair. The system prompt's scoring rubric and JSON
//! shape are part of the external contract: the response validator relies
//! on the model honoring them.

use std::fmt::Write as _;

use crate::model::{DataSource, TokenData};

/// System prompt: persona, scoring rubric, risk definitions, and the exact
/// reply shape the validator expects.
pub fn build_system_prompt(enabled_sources: &[DataSource]) -> String {
    let mut source_descriptions = Vec::new();
    if enabled_sources.contains(&DataSource::OnChain) {
        source_descriptions.push(
            "on-chain metrics (holder distribution, trade volume, bonding curve progress, creator behavior)",
        );
    }
    if enabled_sources.contains(&DataSource::Technical) {
        source_descriptions
            .push("technical indicators (price momentum, trade velocity, trend direction)");
    }

    let source_keys = enabled_sources
        .iter()
        .map(|s| format!("\"{s}\""))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"You are a skeptical DeFi analyst ranking RobinPump bonding curve tokens on Base. Your job is to identify the best current opportunities from a batch of tokens, using {sources}.

Scoring calibration:
- 0-20: Obvious scam or dead token
- 21-40: Low quality, poor metrics
- 41-60: Average, some positive signals but nothing compelling
- 61-80: Above average, multiple strong signals, worth watching
- 81-100: Exceptional -- only if metrics are genuinely outstanding across dimensions

Be skeptical by default. Most bonding curve tokens are low quality. Your output must be valid JSON matching the exact schema requested.

For each recommended token, explain:
1. WHY you ranked it (specific data points, not generic statements)
2. Which data sources contributed most to your assessment
3. A clear suggested action and risk level

Risk levels:
- low: Strong metrics, no red flags
- medium: Mixed signals, some concerns
- high: Significant risks but potential upside
- critical: Major red flags, proceed with extreme caution

Respond with a JSON object containing:
- "recommendations": array of up to 10 tokens, ranked by robinScore descending
- "marketSummary": one paragraph summarizing the overall state of tokens you analyzed

Each recommendation must have:
- "curveId": the token's curve ID
- "name": token name
- "symbol": token symbol
- "robinScore": 0-100
- "explanation": 2-3 sentences on why this token stands out
- "contributingSources": array of source keys that were most relevant ({keys})
- "suggestedAction": "strong_buy" | "buy" | "hold" | "avoid"
- "riskLevel": "low" | "medium" | "high" | "critical"
- "reasoning": object with optional keys "onChain" and "technical", each a brief analysis from that perspective"#,
        sources = source_descriptions.join(" and "),
        keys = source_keys,
    )
}

/// User prompt: one block per candidate, with a metric section per
/// enabled source. A disabled source's section is omitted entirely so the
/// model cannot cite unreported evidence.
pub fn build_user_prompt(tokens: &[TokenData], enabled_sources: &[DataSource]) -> String {
    let blocks: Vec<String> = tokens
        .iter()
        .enumerate()
        .map(|(i, t)| render_token_block(i, t, enabled_sources))
        .collect();

    format!(
        "Analyze these {} RobinPump tokens and recommend the top 10 (or fewer if most are low quality). Rank them by overall quality.\n\n{}",
        tokens.len(),
        blocks.join("\n\n---\n\n"),
    )
}

fn render_token_block(index: usize, token: &TokenData, enabled_sources: &[DataSource]) -> String {
    let mut block = String::new();
    let _ = writeln!(
        block,
        "Token #{}: {} (${})",
        index + 1,
        token.curve.name,
        token.curve.symbol
    );
    let _ = writeln!(block, "Curve ID: {}", token.curve.id);
    let _ = writeln!(block, "Age: {:.1} hours", token.on_chain.age_hours);
    let _ = write!(
        block,
        "Graduated: {}",
        if token.curve.graduated { "Yes" } else { "No" }
    );

    if enabled_sources.contains(&DataSource::OnChain) {
        let m = &token.on_chain;
        let _ = write!(
            block,
            "\n\nOn-chain metrics:\n\
             - Holders: {}\n\
             - Top 10 concentration: {:.1}%\n\
             - Buy/sell ratio: {:.2}\n\
             - Volume momentum: {:.2}x\n\
             - Creator sold: {:.1}%\n\
             - Curve progress: {:.1}%\n\
             - Total trades: {}",
            m.holder_count,
            m.top10_concentration * 100.0,
            m.buy_sell_ratio,
            m.volume_momentum,
            m.creator_sold_fraction * 100.0,
            m.bonding_curve_progress * 100.0,
            m.trade_count,
        );
    }

    if enabled_sources.contains(&DataSource::Technical) {
        let m = &token.technical;
        let _ = write!(
            block,
            "\n\nTechnical indicators:\n\
             - Price change (1h): {:.2}%\n\
             - Price change (24h): {:.2}%\n\
             - Trade velocity: {:.2}x\n\
             - Trend: {}",
            m.price_change_1h * 100.0,
            m.price_change_24h * 100.0,
            m.trade_velocity,
            m.trend_direction,
        );
    }

    block
}
