//! Recommendation Orchestrator
//!
//! Sequences the whole analysis run: config validation, candidate fetch
//! with bounded fan-out, metric derivation, pre-filtering, prompting, the
//! model call, schema validation, demo fallback, cache persistence, and
//! cooldown arming. One logical flow of control per run; the only
//! parallelism is the per-batch detail fetch.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use chrono::Utc;
use futures::future::try_join_all;
use lens_core::{GenerationOptions, LlmProvider, Message};
use serde::Serialize;
use uuid::Uuid;

use crate::cache::{CachedResult, CooldownState, RecommendationCache};
use crate::demo::demo_recommendation;
use crate::error::{LensError, Result};
use crate::metrics::compute_on_chain_metrics;
use crate::model::{Curve, DataSource, TokenData};
use crate::prefilter::select_candidates;
use crate::prompt::{build_system_prompt, build_user_prompt};
use crate::schema::{RecommendationResponse, ValidationOutcome, validate_reply};
use crate::source::{CurveDataSource, CurveSortKey};
use crate::technical::compute_technical_metrics;

/// How many candidates the universe query asks for
pub const CANDIDATE_UNIVERSE_LIMIT: usize = 50;

/// Concurrent detail fetches in flight at once; batches run sequentially
const DETAIL_BATCH_SIZE: usize = 5;

const TRADES_PER_CURVE: usize = 100;
const POSITIONS_PER_CURVE: usize = 50;

/// Ordered, non-skippable phases of one analysis run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStep {
    FetchingTokens,
    ComputingMetrics,
    RunningAi,
    Done,
}

impl std::fmt::Display for AnalysisStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisStep::FetchingTokens => write!(f, "fetching_tokens"),
            AnalysisStep::ComputingMetrics => write!(f, "computing_metrics"),
            AnalysisStep::RunningAi => write!(f, "running_ai"),
            AnalysisStep::Done => write!(f, "done"),
        }
    }
}

/// Per-run configuration
#[derive(Clone, Debug)]
pub struct RecommendationConfig {
    /// Evidence sources reported to the model; must be non-empty
    pub enabled_sources: Vec<DataSource>,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self { enabled_sources: vec![DataSource::OnChain, DataSource::Technical] }
    }
}

/// Result of one `analyze` invocation
#[derive(Clone, Debug, Serialize)]
pub struct AnalysisOutcome {
    pub response: RecommendationResponse,

    /// True when the live run failed and the demo dataset was substituted
    pub fallback: bool,

    /// When the result was produced, epoch milliseconds
    pub cached_at: i64,
}

/// The user-facing recommendation pipeline
pub struct Recommender {
    source: Arc<dyn CurveDataSource>,
    provider: Arc<dyn LlmProvider>,
    options: GenerationOptions,
    cache: RecommendationCache,
    cooldown: StdMutex<CooldownState>,
    run_guard: tokio::sync::Mutex<()>,
}

impl Recommender {
    pub fn new(
        source: Arc<dyn CurveDataSource>,
        provider: Arc<dyn LlmProvider>,
        options: GenerationOptions,
        cache: RecommendationCache,
    ) -> Self {
        Self {
            source,
            provider,
            options,
            cache,
            cooldown: StdMutex::new(CooldownState::new()),
            run_guard: tokio::sync::Mutex::new(()),
        }
    }

    /// Replace the cooldown state (shorter windows in tests)
    pub fn with_cooldown(mut self, cooldown: CooldownState) -> Self {
        self.cooldown = StdMutex::new(cooldown);
        self
    }

    /// Last persisted result, if still fresh
    pub fn cached(&self) -> Option<CachedResult> {
        self.cache.load()
    }

    /// Time until the next run is permitted; zero when idle
    pub fn cooldown_remaining(&self) -> Duration {
        self.cooldown.lock().unwrap().remaining()
    }

    /// Run the live pipeline end to end. Phase callbacks fire strictly in
    /// order, each exactly once per successful run. No fallback here:
    /// every failure propagates to the caller.
    pub async fn get_recommendations(
        &self,
        config: &RecommendationConfig,
        mut on_progress: impl FnMut(AnalysisStep),
    ) -> Result<RecommendationResponse> {
        if config.enabled_sources.is_empty() {
            return Err(LensError::Config("at least one data source must be enabled".into()));
        }

        on_progress(AnalysisStep::FetchingTokens);
        let curves = self
            .source
            .fetch_curves(CurveSortKey::TotalVolumeEth, CANDIDATE_UNIVERSE_LIMIT)
            .await?;
        let active: Vec<Curve> = curves.into_iter().filter(|c| !c.graduated).collect();
        tracing::debug!(candidates = active.len(), source = self.source.name(), "fetched candidate universe");

        on_progress(AnalysisStep::ComputingMetrics);
        let token_data = self.fetch_token_data(active).await?;
        let shortlist = select_candidates(token_data);

        on_progress(AnalysisStep::RunningAi);
        let messages = vec![
            Message::system(build_system_prompt(&config.enabled_sources)),
            Message::user(build_user_prompt(&shortlist, &config.enabled_sources)),
        ];
        let completion = self.provider.complete(&messages, &self.options).await?;
        if completion.content.trim().is_empty() {
            return Err(LensError::EmptyResponse);
        }

        let response = match validate_reply(&completion.content) {
            ValidationOutcome::Valid(response) => response,
            ValidationOutcome::Normalized { response, fixes } => {
                tracing::warn!(fixes = fixes.len(), "model reply needed normalization");
                for fix in &fixes {
                    tracing::debug!(%fix);
                }
                response
            }
            ValidationOutcome::Rejected(reason) => return Err(LensError::Schema(reason)),
        };

        on_progress(AnalysisStep::Done);
        Ok(response)
    }

    /// Per-candidate detail fetch and metric derivation, in batches of
    /// [`DETAIL_BATCH_SIZE`]: batches sequential, requests within a batch
    /// concurrent. One failed fetch aborts the run; no partial candidate
    /// is synthesized.
    async fn fetch_token_data(&self, curves: Vec<Curve>) -> Result<Vec<TokenData>> {
        let now = Utc::now().timestamp();
        let mut results = Vec::with_capacity(curves.len());

        for batch in curves.chunks(DETAIL_BATCH_SIZE) {
            let fetched = try_join_all(batch.iter().map(|curve| async move {
                let (trades, positions) = futures::try_join!(
                    self.source.fetch_trades(&curve.id, TRADES_PER_CURVE),
                    self.source.fetch_positions(&curve.id, POSITIONS_PER_CURVE),
                )?;

                let on_chain = compute_on_chain_metrics(curve, &trades, &positions, now);
                let technical = compute_technical_metrics(&trades, on_chain.age_hours, now);
                Ok::<_, LensError>(TokenData { curve: curve.clone(), on_chain, technical })
            }))
            .await?;
            results.extend(fetched);
        }

        Ok(results)
    }

    /// The user-facing analyze operation. Configuration errors surface
    /// verbatim; any other failure substitutes the demo dataset (logged,
    /// flagged). The result, live or demo, is persisted and arms the
    /// cooldown. A second invocation while one is in flight is rejected
    /// with [`LensError::AlreadyRunning`].
    pub async fn analyze(
        &self,
        config: &RecommendationConfig,
        on_progress: impl FnMut(AnalysisStep),
    ) -> Result<AnalysisOutcome> {
        let Ok(_guard) = self.run_guard.try_lock() else {
            return Err(LensError::AlreadyRunning);
        };

        let run_id = Uuid::new_v4();
        tracing::info!(%run_id, sources = ?config.enabled_sources, "starting analysis run");

        let (response, fallback) = match self.get_recommendations(config, on_progress).await {
            Ok(response) => (response, false),
            Err(e @ LensError::Config(_)) => return Err(e),
            Err(e) => {
                tracing::error!(%run_id, error = %e, "analysis failed; serving demo dataset");
                (demo_recommendation(), true)
            }
        };

        self.cache.save(&response)?;
        self.cooldown.lock().unwrap().start();

        tracing::info!(
            %run_id,
            fallback,
            entries = response.recommendations.len(),
            "analysis run complete"
        );

        Ok(AnalysisOutcome { response, fallback, cached_at: Utc::now().timestamp_millis() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Position, Trade, TradeSide};
    use async_trait::async_trait;
    use lens_core::provider::Completion;
    use rust_decimal_macros::dec;
    use serde_json::json;

    /// Scriptable data source for orchestrator tests
    struct StubSource {
        fail_details: bool,
    }

    #[async_trait]
    impl CurveDataSource for StubSource {
        async fn fetch_curves(&self, _sort: CurveSortKey, _limit: usize) -> Result<Vec<Curve>> {
            let curve = |id: &str, graduated| Curve {
                id: id.into(),
                name: id.into(),
                symbol: "TST".into(),
                total_volume_eth: dec!(2),
                last_price_usd: dec!(0.0001),
                trade_count: 5,
                graduated,
                creator: "0xc".into(),
            };
            Ok(vec![curve("alpha", false), curve("beta", false), curve("grad", true)])
        }

        async fn fetch_trades(&self, curve_id: &str, _limit: usize) -> Result<Vec<Trade>> {
            if self.fail_details {
                return Err(LensError::Fetch("indexer timeout".into()));
            }
            let now = Utc::now().timestamp();
            Ok((0..5)
                .map(|i| Trade {
                    side: TradeSide::Buy,
                    price_eth: dec!(0.001),
                    timestamp: now - i * 60,
                    trader: format!("0x{curve_id}{i}"),
                })
                .collect())
        }

        async fn fetch_positions(&self, _curve_id: &str, _limit: usize) -> Result<Vec<Position>> {
            Ok(vec![Position {
                holder: "0xh".into(),
                amount: dec!(100),
                realized_pnl: None,
                unrealized_pnl: None,
            }])
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    /// Provider returning a fixed reply, with optional latency
    struct StubProvider {
        reply: String,
        delay: Duration,
    }

    #[async_trait]
    impl LlmProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        async fn health_check(&self) -> lens_core::Result<bool> {
            Ok(true)
        }

        async fn complete(
            &self,
            _messages: &[Message],
            options: &GenerationOptions,
        ) -> lens_core::Result<Completion> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            Ok(Completion {
                content: self.reply.clone(),
                model: options.model.clone(),
                usage: None,
                finish_reason: None,
            })
        }
    }

    fn good_reply() -> String {
        json!({
            "recommendations": [{
                "curveId": "alpha",
                "name": "alpha",
                "symbol": "TST",
                "robinScore": 66,
                "explanation": "Steady accumulation.",
                "contributingSources": ["on_chain"],
                "suggestedAction": "buy",
                "riskLevel": "medium",
                "reasoning": {"onChain": "Healthy tape."}
            }],
            "marketSummary": "One standout."
        })
        .to_string()
    }

    fn recommender(source: StubSource, provider: StubProvider, dir: &tempfile::TempDir) -> Recommender {
        Recommender::new(
            Arc::new(source),
            Arc::new(provider),
            GenerationOptions::analysis("test-model"),
            RecommendationCache::new(dir.path().join("cache.json")),
        )
    }

    fn live(dir: &tempfile::TempDir) -> Recommender {
        recommender(
            StubSource { fail_details: false },
            StubProvider { reply: good_reply(), delay: Duration::ZERO },
            dir,
        )
    }

    #[tokio::test]
    async fn test_phases_fire_in_order_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let rec = live(&dir);

        let mut steps = Vec::new();
        let response = rec
            .get_recommendations(&RecommendationConfig::default(), |s| steps.push(s))
            .await
            .unwrap();

        assert_eq!(
            steps,
            vec![
                AnalysisStep::FetchingTokens,
                AnalysisStep::ComputingMetrics,
                AnalysisStep::RunningAi,
                AnalysisStep::Done,
            ]
        );
        assert_eq!(response.recommendations[0].curve_id, "alpha");
    }

    #[tokio::test]
    async fn test_no_sources_is_config_error_without_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let rec = live(&dir);
        let config = RecommendationConfig { enabled_sources: vec![] };

        let err = rec.analyze(&config, |_| {}).await.unwrap_err();
        assert!(matches!(err, LensError::Config(_)));
        assert!(rec.cached().is_none(), "config errors must not persist a result");
    }

    #[tokio::test]
    async fn test_detail_fetch_failure_degrades_to_demo() {
        let dir = tempfile::tempdir().unwrap();
        let rec = recommender(
            StubSource { fail_details: true },
            StubProvider { reply: good_reply(), delay: Duration::ZERO },
            &dir,
        );

        let outcome = rec.analyze(&RecommendationConfig::default(), |_| {}).await.unwrap();
        assert!(outcome.fallback);
        assert_eq!(outcome.response.recommendations[0].curve_id, "demo-1");

        // Fallback still persists and arms the cooldown
        assert!(rec.cached().is_some());
        assert!(rec.cooldown_remaining() > Duration::ZERO);
    }

    #[tokio::test]
    async fn test_empty_reply_is_hard_error_then_demo() {
        let dir = tempfile::tempdir().unwrap();
        let rec = recommender(
            StubSource { fail_details: false },
            StubProvider { reply: "   \n".into(), delay: Duration::ZERO },
            &dir,
        );

        let err = rec
            .get_recommendations(&RecommendationConfig::default(), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, LensError::EmptyResponse));

        let outcome = rec.analyze(&RecommendationConfig::default(), |_| {}).await.unwrap();
        assert!(outcome.fallback);
    }

    #[tokio::test]
    async fn test_unusable_reply_is_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let rec = recommender(
            StubSource { fail_details: false },
            StubProvider { reply: "sorry, no can do".into(), delay: Duration::ZERO },
            &dir,
        );

        let err = rec
            .get_recommendations(&RecommendationConfig::default(), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, LensError::Schema(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_analyze_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let rec = Arc::new(recommender(
            StubSource { fail_details: false },
            StubProvider { reply: good_reply(), delay: Duration::from_millis(200) },
            &dir,
        ));

        let first = {
            let rec = Arc::clone(&rec);
            tokio::spawn(async move { rec.analyze(&RecommendationConfig::default(), |_| {}).await })
        };

        // Let the first run take the guard before contending
        tokio::time::sleep(Duration::from_millis(50)).await;
        let err = rec.analyze(&RecommendationConfig::default(), |_| {}).await.unwrap_err();
        assert!(matches!(err, LensError::AlreadyRunning));

        let outcome = first.await.unwrap().unwrap();
        assert!(!outcome.fallback);
    }

    #[tokio::test]
    async fn test_successful_run_round_trips_through_cache() {
        let dir = tempfile::tempdir().unwrap();
        let rec = live(&dir);

        let outcome = rec.analyze(&RecommendationConfig::default(), |_| {}).await.unwrap();
        assert!(!outcome.fallback);

        let cached = rec.cached().expect("fresh result should be cached");
        assert_eq!(cached.data, outcome.response);
        assert!(rec.cooldown_remaining() <= Duration::from_secs(60));
        assert!(rec.cooldown_remaining() > Duration::from_secs(55));
    }
}
