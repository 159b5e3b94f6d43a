//! 갱신 파이프라인 통합 테스트.
//!
//! 실제 제공자 대신 trait 스텁과 인메모리 캐시 백엔드로 오케스트레이터
//! 전체 흐름을 검증합니다.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use dash_collector::modules::keys;
use dash_collector::runner::{run_all, run_domain, Domain, RunAllOptions};
use dash_collector::{CollectorConfig, CollectorContext};
use dash_core::{
    Asset, CacheMeta, Candle, CoinMarket, DailyPriceSource, DashError, DashResult, FearGreedPoint,
    GlobalMarket, HistoricalDailySource, IndicatorFrame, MarketDataSource, NewsItem, NewsSource,
    PricePoint, RsiPoint, SentimentSource, TickerStats, TrendingCoin, VsCurrency,
};
use dash_data::MemoryCache;

// ==================== 스텁 소스 ====================

/// 고정된 합성 시리즈를 돌려주는 일별 가격 소스.
struct StubDailySource {
    points: Vec<PricePoint>,
}

#[async_trait]
impl DailyPriceSource for StubDailySource {
    fn name(&self) -> &'static str {
        "stub-daily"
    }

    fn max_days_back(&self) -> u32 {
        365
    }

    async fn fetch_daily_prices(
        &self,
        _asset: &Asset,
        _vs: VsCurrency,
        days_back: u32,
    ) -> DashResult<Vec<PricePoint>> {
        let take = (days_back as usize).min(self.points.len());
        Ok(self.points[self.points.len() - take..].to_vec())
    }
}

/// 항상 실패하는 일별 가격 소스.
struct FailingDailySource;

#[async_trait]
impl DailyPriceSource for FailingDailySource {
    fn name(&self) -> &'static str {
        "failing-daily"
    }

    fn max_days_back(&self) -> u32 {
        365
    }

    async fn fetch_daily_prices(
        &self,
        _asset: &Asset,
        _vs: VsCurrency,
        _days_back: u32,
    ) -> DashResult<Vec<PricePoint>> {
        Err(DashError::Network("connection refused".to_string()))
    }
}

/// 전체 백필용 깊은 이력 스텁.
struct StubHistorySource {
    points: Vec<PricePoint>,
}

#[async_trait]
impl HistoricalDailySource for StubHistorySource {
    fn name(&self) -> &'static str {
        "stub-history"
    }

    async fn fetch_historical_daily(
        &self,
        _asset: &Asset,
        _vs: VsCurrency,
        limit: u32,
    ) -> DashResult<Vec<PricePoint>> {
        let take = (limit as usize).min(self.points.len());
        Ok(self.points[self.points.len() - take..].to_vec())
    }
}

/// 항상 실패하는 깊은 이력 스텁.
struct FailingHistorySource;

#[async_trait]
impl HistoricalDailySource for FailingHistorySource {
    fn name(&self) -> &'static str {
        "failing-history"
    }

    async fn fetch_historical_daily(
        &self,
        _asset: &Asset,
        _vs: VsCurrency,
        _limit: u32,
    ) -> DashResult<Vec<PricePoint>> {
        Err(DashError::RateLimit {
            provider: "failing-history".to_string(),
            message: "quota exhausted".to_string(),
        })
    }
}

/// 상위 코인 테이블만 동작하는 시장 데이터 스텁.
struct StubMarketSource {
    coins: Vec<CoinMarket>,
}

#[async_trait]
impl MarketDataSource for StubMarketSource {
    fn name(&self) -> &'static str {
        "stub-market"
    }

    async fn fetch_global(&self) -> DashResult<GlobalMarket> {
        Err(DashError::Network("global unavailable".to_string()))
    }

    async fn fetch_top_coins(&self, _vs: VsCurrency, _limit: u32) -> DashResult<Vec<CoinMarket>> {
        Ok(self.coins.clone())
    }

    async fn fetch_trending(&self) -> DashResult<Vec<TrendingCoin>> {
        Err(DashError::Network("trending unavailable".to_string()))
    }

    async fn fetch_simple_prices(
        &self,
        _assets: &[Asset],
        _vs: VsCurrency,
    ) -> DashResult<HashMap<String, Decimal>> {
        Err(DashError::Network("prices unavailable".to_string()))
    }

    async fn fetch_ohlc(
        &self,
        _asset: &Asset,
        _vs: VsCurrency,
        _days: u32,
    ) -> DashResult<Vec<Candle>> {
        Err(DashError::Network("ohlc unavailable".to_string()))
    }

    async fn fetch_ticker(&self, _asset: &Asset, _vs: VsCurrency) -> DashResult<TickerStats> {
        Err(DashError::Network("ticker unavailable".to_string()))
    }
}

/// 모든 호출이 실패하는 시장 데이터 스텁.
struct FailingMarketSource;

#[async_trait]
impl MarketDataSource for FailingMarketSource {
    fn name(&self) -> &'static str {
        "failing-market"
    }

    async fn fetch_global(&self) -> DashResult<GlobalMarket> {
        Err(DashError::Network("down".to_string()))
    }

    async fn fetch_top_coins(&self, _vs: VsCurrency, _limit: u32) -> DashResult<Vec<CoinMarket>> {
        Err(DashError::Network("down".to_string()))
    }

    async fn fetch_trending(&self) -> DashResult<Vec<TrendingCoin>> {
        Err(DashError::Network("down".to_string()))
    }

    async fn fetch_simple_prices(
        &self,
        _assets: &[Asset],
        _vs: VsCurrency,
    ) -> DashResult<HashMap<String, Decimal>> {
        Err(DashError::Network("down".to_string()))
    }

    async fn fetch_ohlc(
        &self,
        _asset: &Asset,
        _vs: VsCurrency,
        _days: u32,
    ) -> DashResult<Vec<Candle>> {
        Err(DashError::Network("down".to_string()))
    }

    async fn fetch_ticker(&self, _asset: &Asset, _vs: VsCurrency) -> DashResult<TickerStats> {
        Err(DashError::Network("down".to_string()))
    }
}

struct StubSentimentSource;

#[async_trait]
impl SentimentSource for StubSentimentSource {
    fn name(&self) -> &'static str {
        "stub-sentiment"
    }

    async fn fetch_fear_greed(&self, limit: u32) -> DashResult<Vec<FearGreedPoint>> {
        Ok((0..limit.min(5))
            .map(|i| FearGreedPoint {
                timestamp: 1_704_067_200 - (i as i64) * 86_400,
                value: 40 + i as u8,
                classification: "Fear".to_string(),
            })
            .collect())
    }
}

struct FailingSentimentSource;

#[async_trait]
impl SentimentSource for FailingSentimentSource {
    fn name(&self) -> &'static str {
        "failing-sentiment"
    }

    async fn fetch_fear_greed(&self, _limit: u32) -> DashResult<Vec<FearGreedPoint>> {
        Err(DashError::Network("down".to_string()))
    }
}

struct FailingNewsSource;

#[async_trait]
impl NewsSource for FailingNewsSource {
    fn name(&self) -> &'static str {
        "failing-news"
    }

    async fn fetch_crypto_news(&self, _limit: u32) -> DashResult<Vec<NewsItem>> {
        Err(DashError::Network("down".to_string()))
    }
}

// ==================== 헬퍼 ====================

/// 선형 증가하는 합성 일별 시리즈.
fn synthetic_series(len: usize) -> Vec<PricePoint> {
    let base = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    (0..len)
        .map(|i| {
            PricePoint::new(
                base + chrono::Duration::days(i as i64),
                Decimal::from(10_000 + (i as i64) * 25),
            )
        })
        .collect()
}

fn top_coins() -> Vec<CoinMarket> {
    let coin = |id: &str, change_90d: Decimal| CoinMarket {
        id: id.to_string(),
        symbol: id.to_uppercase(),
        name: id.to_string(),
        market_cap_rank: None,
        current_price: None,
        market_cap: None,
        change_pct_24h: None,
        change_pct_7d: None,
        change_pct_30d: None,
        change_pct_90d: Some(change_90d),
    };
    vec![
        coin("bitcoin", Decimal::from(10)),
        coin("ethereum", Decimal::from(20)),
        coin("solana", Decimal::from(5)),
    ]
}

fn test_config() -> CollectorConfig {
    let mut config = CollectorConfig::default();
    config.tracked_assets = vec![Asset::bitcoin()];
    config.refresh.request_delay_ms = 0;
    config
}

/// 지표 도메인에 필요한 스텁만 채운 컨텍스트.
fn indicator_context(series_len: usize) -> CollectorContext {
    CollectorContext::new(
        test_config(),
        Arc::new(MemoryCache::new()),
        vec![Arc::new(StubDailySource {
            points: synthetic_series(series_len),
        })],
        Arc::new(StubHistorySource {
            points: synthetic_series(series_len),
        }),
        Arc::new(StubMarketSource { coins: top_coins() }),
        Arc::new(StubSentimentSource),
        vec![],
        None,
    )
}

fn failing_context() -> CollectorContext {
    CollectorContext::new(
        test_config(),
        Arc::new(MemoryCache::new()),
        vec![Arc::new(FailingDailySource)],
        Arc::new(StubHistorySource { points: Vec::new() }),
        Arc::new(FailingMarketSource),
        Arc::new(FailingSentimentSource),
        vec![Arc::new(FailingNewsSource)],
        None,
    )
}

// ==================== 테스트 ====================

/// 빈 시리즈 저장소 + 400일 합성 시리즈 스텁으로 지표 도메인을 한 번
/// 돌린 뒤의 상태를 검증한다.
#[tokio::test]
async fn test_indicator_refresh_end_to_end() {
    let ctx = indicator_context(400);

    let report = run_domain(&ctx, Domain::Indicators, false).await;

    assert!(report.succeeded(), "report: {:?}", report);

    // 시리즈 저장소에 400점이 쌓여야 한다
    let series = ctx.series.get("btc_usd").await.unwrap().unwrap();
    assert_eq!(series.len(), 400);

    // Pi Cycle 프레임: 111일 SMA는 index 110부터 값이 있다
    let frames: Vec<IndicatorFrame> = ctx
        .cache
        .get(&keys::pi_cycle("btc_usd"))
        .await
        .unwrap()
        .expect("pi cycle frames must be cached");
    assert_eq!(frames.len(), 400);
    assert!(frames[109].moving_averages["sma_111"].is_none());
    assert!(frames[110].moving_averages["sma_111"].is_some());
    // 350일 윈도우도 채워진다 (400 > 350)
    assert!(frames[399].moving_averages["sma_350x2"].is_some());

    // `_meta` 동반 항목에 timestamp와 소스가 남아야 한다
    let meta: CacheMeta = ctx
        .cache
        .get(&dash_data::FreshnessCache::meta_key(&keys::pi_cycle(
            "btc_usd",
        )))
        .await
        .unwrap()
        .expect("meta companion must exist");
    assert_eq!(meta.source, "stub-history");

    // RSI 시리즈도 기록된다
    let rsi: Vec<RsiPoint> = ctx
        .cache
        .get(&keys::rsi("btc_usd", 14))
        .await
        .unwrap()
        .expect("rsi series must be cached");
    assert_eq!(rsi.len(), 400);
    assert!(rsi[13].rsi.is_none());
    assert!(rsi[14].rsi.is_some());

    // 알트코인 시즌 지수 (비트코인 10% vs 20%/5% → 50)
    let season: dash_core::AltcoinSeasonSnapshot = ctx
        .cache
        .get(keys::ALTCOIN_SEASON)
        .await
        .unwrap()
        .expect("altcoin season must be cached");
    assert_eq!(season.index, Decimal::from(50));
}

/// 갱신을 다시 돌려도 시리즈가 늘어나지 않는다 (멱등성).
#[tokio::test]
async fn test_indicator_refresh_is_idempotent() {
    let ctx = indicator_context(400);

    run_domain(&ctx, Domain::Indicators, false).await;
    let first = ctx.series.get("btc_usd").await.unwrap().unwrap();

    run_domain(&ctx, Domain::Indicators, false).await;
    let second = ctx.series.get("btc_usd").await.unwrap().unwrap();

    assert_eq!(first.len(), second.len());
}

/// 하위 작업 일부가 실패해도 도메인은 성공이고 실패는 기록된다.
#[tokio::test]
async fn test_partial_failure_recorded_but_domain_succeeds() {
    // 시장 데이터 소스가 죽어도 (알트코인 시즌 실패)
    // 시리즈 기반 하위 작업은 계속 돌아야 한다
    let ctx = CollectorContext::new(
        test_config(),
        Arc::new(MemoryCache::new()),
        vec![Arc::new(StubDailySource {
            points: synthetic_series(400),
        })],
        Arc::new(StubHistorySource {
            points: synthetic_series(400),
        }),
        Arc::new(FailingMarketSource),
        Arc::new(StubSentimentSource),
        vec![],
        None,
    );

    let report = run_domain(&ctx, Domain::Indicators, false).await;

    assert!(report.succeeded());
    assert_eq!(report.failure_count(), 1);
    let failed = report.results.iter().find(|r| !r.success).unwrap();
    assert_eq!(failed.name, "Altcoin Season");
    assert!(failed.error.is_some());
}

/// 전부 실패한 도메인은 실패로 집계되고 종료 코드는 1이다.
#[tokio::test]
async fn test_run_all_reports_total_failure() {
    let ctx = failing_context();

    let report = run_all(&ctx, &RunAllOptions::default()).await;

    assert_eq!(report.reports.len(), 6);
    // 지표 도메인은 모든 하위 작업이 실패해야 한다
    let indicators = report
        .reports
        .iter()
        .find(|r| r.domain == "indicators")
        .unwrap();
    assert!(!indicators.succeeded());
    assert_eq!(report.exit_code(), 1);
}

/// --skip은 해당 도메인을 건너뛰고, 나머지가 성공하면 종료 코드는 0이다.
#[tokio::test]
async fn test_run_all_with_skip_list() {
    let ctx = indicator_context(400);

    let options = RunAllOptions {
        skip: vec![
            Domain::Market,
            Domain::Wallet,
            Domain::MarketData,
            Domain::News,
        ],
        force: false,
    };
    let report = run_all(&ctx, &options).await;

    assert_eq!(report.reports.len(), 2);
    assert_eq!(report.exit_code(), 0);
}

/// 일시적 제공자 장애는 저장된 시리즈를 지우지 않는다.
#[tokio::test]
async fn test_provider_outage_preserves_series() {
    // 1차 실행: 정상 소스로 시리즈 적재
    let backend = Arc::new(MemoryCache::new());
    let ctx = CollectorContext::new(
        test_config(),
        backend.clone(),
        vec![Arc::new(StubDailySource {
            points: synthetic_series(400),
        })],
        Arc::new(StubHistorySource {
            points: synthetic_series(400),
        }),
        Arc::new(StubMarketSource { coins: top_coins() }),
        Arc::new(StubSentimentSource),
        vec![],
        None,
    );
    run_domain(&ctx, Domain::Indicators, false).await;
    assert_eq!(ctx.series.get("btc_usd").await.unwrap().unwrap().len(), 400);

    // 2차 실행: 모든 가격 소스가 죽은 상태
    let ctx = CollectorContext::new(
        test_config(),
        backend,
        vec![Arc::new(FailingDailySource)],
        Arc::new(FailingHistorySource),
        Arc::new(StubMarketSource { coins: top_coins() }),
        Arc::new(StubSentimentSource),
        vec![],
        None,
    );
    let report = run_domain(&ctx, Domain::Indicators, false).await;

    // 저장된 시리즈로 버텨서 Pi Cycle은 여전히 성공해야 한다
    assert!(report.succeeded());
    assert_eq!(ctx.series.get("btc_usd").await.unwrap().unwrap().len(), 400);
}

/// 시장 도메인은 성공한 부분만으로 스냅샷을 기록한다.
#[tokio::test]
async fn test_market_snapshot_written_partially() {
    // 상위 코인 테이블만 살아 있는 소스
    let ctx = indicator_context(50);

    let report = run_domain(&ctx, Domain::Market, false).await;

    // global/트렌딩은 실패, 테이블과 저장은 성공
    assert!(report.succeeded());
    assert_eq!(report.failure_count(), 2);

    let snapshot: dash_core::MarketSnapshot = ctx
        .cache
        .get(keys::MARKET_SNAPSHOT)
        .await
        .unwrap()
        .expect("market snapshot must be cached");
    assert!(snapshot.global.is_none());
    assert_eq!(snapshot.top_coins.len(), 3);
    assert!(snapshot.updated_at.is_some());
}

/// 심리 도메인은 never-stale 키에 스냅샷과 meta를 남긴다.
#[tokio::test]
async fn test_sentiment_snapshot_written_never_stale() {
    let ctx = indicator_context(50);

    let report = run_domain(&ctx, Domain::Sentiment, false).await;

    assert!(report.succeeded());
    let snapshot: dash_core::SentimentSnapshot = ctx
        .cache
        .get(keys::SENTIMENT_SNAPSHOT)
        .await
        .unwrap()
        .expect("sentiment snapshot must be cached");
    assert_eq!(snapshot.current.value, 40);

    let meta: CacheMeta = ctx
        .cache
        .get(&dash_data::FreshnessCache::meta_key(
            keys::SENTIMENT_SNAPSHOT,
        ))
        .await
        .unwrap()
        .expect("meta companion must exist");
    assert_eq!(meta.source, "stub-sentiment");
}
