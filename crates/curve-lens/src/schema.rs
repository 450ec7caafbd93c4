//! Recommendation Schema & Validation
//!
//! Typed shape of the model's reply plus the validation boundary that maps
//! untrusted JSON onto it. Policy is normalization-over-rejection: field
//! level deviations are coerced to documented defaults and recorded, and
//! only a structurally unusable reply is rejected outright. The outcome is
//! tagged so callers can tell a clean parse from a repaired one.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::DataSource;

/// Hard cap on entries in one response; rank is list position
pub const MAX_RECOMMENDATIONS: usize = 10;

/// Suggested trading action
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    StrongBuy,
    Buy,
    Hold,
    Avoid,
}

impl SuggestedAction {
    /// Canonical wire key
    pub fn as_key(self) -> &'static str {
        match self {
            SuggestedAction::StrongBuy => "strong_buy",
            SuggestedAction::Buy => "buy",
            SuggestedAction::Hold => "hold",
            SuggestedAction::Avoid => "avoid",
        }
    }

    /// Match a model-supplied value, tolerating case and whitespace
    /// ("Strong Buy" -> StrongBuy). `None` for anything unrecognized.
    fn from_loose(raw: &str) -> Option<Self> {
        let normalized = raw
            .trim()
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_");
        match normalized.as_str() {
            "strong_buy" => Some(SuggestedAction::StrongBuy),
            "buy" => Some(SuggestedAction::Buy),
            "hold" => Some(SuggestedAction::Hold),
            "avoid" => Some(SuggestedAction::Avoid),
            _ => None,
        }
    }
}

/// Risk classification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_key(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }

    fn from_loose(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "low" => Some(RiskLevel::Low),
            "medium" => Some(RiskLevel::Medium),
            "high" => Some(RiskLevel::High),
            "critical" => Some(RiskLevel::Critical),
            _ => None,
        }
    }
}

/// Optional per-source reasoning paragraphs
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceReasoning {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_chain: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical: Option<String>,
}

/// One ranked token in the model's reply
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecommendation {
    pub curve_id: String,
    pub name: String,
    pub symbol: String,

    /// Quality score, 0-100
    pub robin_score: f64,

    /// 2-3 sentence free-text justification
    pub explanation: String,

    /// Evidence sources that drove the assessment
    pub contributing_sources: Vec<DataSource>,

    pub suggested_action: SuggestedAction,
    pub risk_level: RiskLevel,

    #[serde(default)]
    pub reasoning: SourceReasoning,
}

/// The full reply: at most [`MAX_RECOMMENDATIONS`] entries, expected (not
/// enforced here) to arrive sorted by descending score, plus one market
/// summary paragraph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    pub recommendations: Vec<TokenRecommendation>,
    pub market_summary: String,
}

/// Tagged result of validating a raw model reply
#[derive(Debug)]
pub enum ValidationOutcome {
    /// Every field matched the schema exactly
    Valid(RecommendationResponse),
    /// Usable after coercions; `fixes` records each repair applied
    Normalized {
        response: RecommendationResponse,
        fixes: Vec<String>,
    },
    /// Structurally unusable (not JSON, or not an object)
    Rejected(String),
}

impl ValidationOutcome {
    /// The response, if the reply was usable at all
    pub fn into_response(self) -> Option<RecommendationResponse> {
        match self {
            ValidationOutcome::Valid(r) | ValidationOutcome::Normalized { response: r, .. } => {
                Some(r)
            }
            ValidationOutcome::Rejected(_) => None,
        }
    }
}

/// Validate a raw model reply against the recommendation schema.
///
/// Emptiness is the caller's concern (an empty reply is a hard error, not
/// a normalization); everything else lands in one of the three outcomes.
pub fn validate_reply(raw: &str) -> ValidationOutcome {
    let value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => return ValidationOutcome::Rejected(format!("reply is not JSON: {e}")),
    };
    let Some(root) = value.as_object() else {
        return ValidationOutcome::Rejected("reply is not a JSON object".into());
    };

    let mut normalizer = Normalizer::default();

    let recommendations = match root.get("recommendations") {
        Some(Value::Array(items)) => {
            let mut out = Vec::new();
            for (i, item) in items.iter().enumerate() {
                if out.len() == MAX_RECOMMENDATIONS {
                    normalizer.fix(format!(
                        "recommendations truncated to {MAX_RECOMMENDATIONS} entries"
                    ));
                    break;
                }
                match item.as_object() {
                    Some(obj) => out.push(normalizer.recommendation(obj, i)),
                    None => normalizer.fix(format!("recommendations[{i}] is not an object; dropped")),
                }
            }
            out
        }
        _ => {
            normalizer.fix("recommendations missing or not an array; defaulted to empty");
            Vec::new()
        }
    };

    let market_summary = match root.get("marketSummary") {
        Some(Value::String(s)) => s.clone(),
        _ => {
            normalizer.fix("marketSummary missing or not a string; defaulted to empty");
            String::new()
        }
    };

    let response = RecommendationResponse {
        recommendations,
        market_summary,
    };

    if normalizer.fixes.is_empty() {
        ValidationOutcome::Valid(response)
    } else {
        ValidationOutcome::Normalized {
            response,
            fixes: normalizer.fixes,
        }
    }
}

/// Field-level coercion helpers; every repair is recorded in `fixes`.
#[derive(Default)]
struct Normalizer {
    fixes: Vec<String>,
}

impl Normalizer {
    fn fix(&mut self, note: impl Into<String>) {
        self.fixes.push(note.into());
    }

    fn recommendation(
        &mut self,
        obj: &serde_json::Map<String, Value>,
        index: usize,
    ) -> TokenRecommendation {
        let score = self.number(obj.get("robinScore"), 0.0, index, "robinScore");
        let clamped = score.clamp(0.0, 100.0);
        if clamped != score {
            self.fix(format!("[{index}].robinScore {score} clamped to 0-100"));
        }

        TokenRecommendation {
            curve_id: self.string(obj.get("curveId"), index, "curveId"),
            name: self.string(obj.get("name"), index, "name"),
            symbol: self.string(obj.get("symbol"), index, "symbol"),
            robin_score: clamped,
            explanation: self.string(obj.get("explanation"), index, "explanation"),
            contributing_sources: self.sources(obj.get("contributingSources"), index),
            suggested_action: self.action(obj.get("suggestedAction"), index),
            risk_level: self.risk(obj.get("riskLevel"), index),
            reasoning: self.reasoning(obj.get("reasoning"), index),
        }
    }

    /// The single fallible-to-default conversion routine for external
    /// numeric fields: accepts a JSON number or a numeric string, anything
    /// else becomes `default`.
    fn number(&mut self, value: Option<&Value>, default: f64, index: usize, field: &str) -> f64 {
        match value {
            Some(Value::Number(n)) => match n.as_f64() {
                Some(v) if v.is_finite() => v,
                _ => {
                    self.fix(format!("[{index}].{field} not a finite number; defaulted"));
                    default
                }
            },
            Some(Value::String(s)) => match s.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => {
                    self.fix(format!("[{index}].{field} parsed from string"));
                    v
                }
                _ => {
                    self.fix(format!("[{index}].{field} unparsable string; defaulted"));
                    default
                }
            },
            _ => {
                self.fix(format!("[{index}].{field} missing; defaulted"));
                default
            }
        }
    }

    fn string(&mut self, value: Option<&Value>, index: usize, field: &str) -> String {
        match value {
            Some(Value::String(s)) => s.clone(),
            _ => {
                self.fix(format!("[{index}].{field} missing or not a string; defaulted"));
                String::new()
            }
        }
    }

    /// Unknown source keys are dropped, not fatal
    fn sources(&mut self, value: Option<&Value>, index: usize) -> Vec<DataSource> {
        match value {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| {
                    let key = v.as_str().unwrap_or_default();
                    let parsed = DataSource::from_key(key);
                    if parsed.is_none() {
                        self.fix(format!(
                            "[{index}].contributingSources entry {key:?} unrecognized; dropped"
                        ));
                    }
                    parsed
                })
                .collect(),
            _ => {
                self.fix(format!(
                    "[{index}].contributingSources missing or not an array; defaulted to empty"
                ));
                Vec::new()
            }
        }
    }

    fn action(&mut self, value: Option<&Value>, index: usize) -> SuggestedAction {
        let raw = value.and_then(Value::as_str).unwrap_or_default();
        match SuggestedAction::from_loose(raw) {
            Some(action) => {
                if raw != action.as_key() {
                    self.fix(format!(
                        "[{index}].suggestedAction {raw:?} normalized to {}",
                        action.as_key()
                    ));
                }
                action
            }
            None => {
                self.fix(format!(
                    "[{index}].suggestedAction {raw:?} unrecognized; coerced to hold"
                ));
                SuggestedAction::Hold
            }
        }
    }

    fn risk(&mut self, value: Option<&Value>, index: usize) -> RiskLevel {
        let raw = value.and_then(Value::as_str).unwrap_or_default();
        match RiskLevel::from_loose(raw) {
            Some(risk) => {
                if raw != risk.as_key() {
                    self.fix(format!(
                        "[{index}].riskLevel {raw:?} normalized to {}",
                        risk.as_key()
                    ));
                }
                risk
            }
            None => {
                self.fix(format!(
                    "[{index}].riskLevel {raw:?} unrecognized; coerced to medium"
                ));
                RiskLevel::Medium
            }
        }
    }

    fn reasoning(&mut self, value: Option<&Value>, index: usize) -> SourceReasoning {
        match value {
            Some(Value::Object(obj)) => SourceReasoning {
                on_chain: obj.get("onChain").and_then(Value::as_str).map(String::from),
                technical: obj.get("technical").and_then(Value::as_str).map(String::from),
            },
            None | Some(Value::Null) => SourceReasoning::default(),
            Some(_) => {
                self.fix(format!("[{index}].reasoning not an object; defaulted"));
                SourceReasoning::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry() -> Value {
        json!({
            "curveId": "curve-1",
            "name": "BaseBuilder",
            "symbol": "BBLDR",
            "robinScore": 71,
            "explanation": "Strong holder diversification.",
            "contributingSources": ["on_chain", "technical"],
            "suggestedAction": "buy",
            "riskLevel": "medium",
            "reasoning": {"onChain": "52 holders.", "technical": "Up 12% in the last hour."}
        })
    }

    fn reply(entries: Vec<Value>) -> String {
        json!({"recommendations": entries, "marketSummary": "Mixed market."}).to_string()
    }

    #[test]
    fn test_clean_reply_is_valid() {
        let outcome = validate_reply(&reply(vec![entry()]));
        let ValidationOutcome::Valid(response) = outcome else {
            panic!("expected Valid, got {outcome:?}");
        };
        assert_eq!(response.recommendations.len(), 1);
        let rec = &response.recommendations[0];
        assert_eq!(rec.curve_id, "curve-1");
        assert_eq!(rec.robin_score, 71.0);
        assert_eq!(rec.suggested_action, SuggestedAction::Buy);
        assert_eq!(rec.contributing_sources, vec![DataSource::OnChain, DataSource::Technical]);
        assert_eq!(rec.reasoning.on_chain.as_deref(), Some("52 holders."));
        assert_eq!(response.market_summary, "Mixed market.");
    }

    #[test]
    fn test_mixed_case_action_normalizes_to_strong_buy() {
        let mut e = entry();
        e["suggestedAction"] = json!("Strong Buy");
        let ValidationOutcome::Normalized { response, fixes } = validate_reply(&reply(vec![e]))
        else {
            panic!("expected Normalized");
        };
        assert_eq!(response.recommendations[0].suggested_action, SuggestedAction::StrongBuy);
        assert_eq!(fixes.len(), 1);
    }

    #[test]
    fn test_unknown_action_and_risk_coerce_to_defaults() {
        let mut e = entry();
        e["suggestedAction"] = json!("yolo");
        e["riskLevel"] = json!("unknown");
        let response = validate_reply(&reply(vec![e])).into_response().unwrap();
        assert_eq!(response.recommendations[0].suggested_action, SuggestedAction::Hold);
        assert_eq!(response.recommendations[0].risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_missing_market_summary_defaults_to_empty() {
        let raw = json!({"recommendations": [entry()]}).to_string();
        let response = validate_reply(&raw).into_response().unwrap();
        assert_eq!(response.market_summary, "");
    }

    #[test]
    fn test_missing_recommendations_defaults_to_empty_list() {
        let raw = json!({"marketSummary": "Quiet."}).to_string();
        let response = validate_reply(&raw).into_response().unwrap();
        assert!(response.recommendations.is_empty());
    }

    #[test]
    fn test_unknown_source_keys_are_dropped_not_fatal() {
        let mut e = entry();
        e["contributingSources"] = json!(["on_chain", "news", "vibes"]);
        let response = validate_reply(&reply(vec![e])).into_response().unwrap();
        assert_eq!(response.recommendations[0].contributing_sources, vec![DataSource::OnChain]);
    }

    #[test]
    fn test_list_truncated_to_ten() {
        let entries: Vec<Value> = (0..14).map(|_| entry()).collect();
        let response = validate_reply(&reply(entries)).into_response().unwrap();
        assert_eq!(response.recommendations.len(), MAX_RECOMMENDATIONS);
    }

    #[test]
    fn test_score_from_string_and_out_of_range() {
        let mut a = entry();
        a["robinScore"] = json!("72.5");
        let mut b = entry();
        b["robinScore"] = json!(140);
        let response = validate_reply(&reply(vec![a, b])).into_response().unwrap();
        assert_eq!(response.recommendations[0].robin_score, 72.5);
        assert_eq!(response.recommendations[1].robin_score, 100.0);
    }

    #[test]
    fn test_non_json_reply_is_rejected() {
        assert!(matches!(validate_reply("I cannot help"), ValidationOutcome::Rejected(_)));
        assert!(matches!(validate_reply("[1, 2, 3]"), ValidationOutcome::Rejected(_)));
    }

    #[test]
    fn test_wire_keys_round_trip_camel_case() {
        let response = validate_reply(&reply(vec![entry()])).into_response().unwrap();
        let value = serde_json::to_value(&response).unwrap();
        assert!(value["recommendations"][0].get("curveId").is_some());
        assert!(value["recommendations"][0].get("robinScore").is_some());
        assert!(value.get("marketSummary").is_some());

        let back: RecommendationResponse = serde_json::from_value(value).unwrap();
        assert_eq!(back, response);
    }
}
