//! 도메인별 갱신 모듈.
//!
//! 각 모듈은 하나의 도메인(시장, 지갑, 시장 데이터, 뉴스/캘린더,
//! 지표, 심리)을 순차 하위 작업으로 갱신하고 [`RunReport`]를
//! 반환합니다. 하위 작업 하나가 실패해도 나머지는 계속 실행됩니다.
//!
//! 실행 안에서 재시도는 하지 않습니다 — 다음 스케줄 주기가 재시도
//! 수단입니다.

pub mod indicator_sync;
pub mod market_data_sync;
pub mod market_sync;
pub mod news_sync;
pub mod sentiment_sync;
pub mod wallet_sync;

pub use indicator_sync::sync_indicators;
pub use market_data_sync::sync_market_data;
pub use market_sync::sync_market;
pub use news_sync::sync_news;
pub use sentiment_sync::sync_sentiment;
pub use wallet_sync::sync_wallet;

use chrono::Utc;
use dash_core::{Asset, DashError, DashResult, PricePoint, PriceSeries};
use dash_data::cache::incremental_gap;
use tracing::warn;

use crate::context::CollectorContext;
use crate::report::RunReport;

/// 갱신 옵션
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// 신선도를 무시하고 강제 재계산.
    ///
    /// 시리즈는 증분 갭 대신 전체 백필을 수행하고, never-stale 키는
    /// 다시 쓰기 전에 비웁니다.
    pub force: bool,
}

/// 다운스트림이 읽는 캐시 키.
pub mod keys {
    /// 시장 도메인 스냅샷
    pub const MARKET_SNAPSHOT: &str = "market_snapshot";
    /// 지갑 도메인 스냅샷
    pub const WALLET_SNAPSHOT: &str = "wallet_snapshot";
    /// 심리 도메인 스냅샷
    pub const SENTIMENT_SNAPSHOT: &str = "sentiment_snapshot";
    /// 최신 뉴스 헤드라인
    pub const NEWS_LATEST: &str = "news_latest";
    /// 알트코인 시즌 지수
    pub const ALTCOIN_SEASON: &str = "altcoin_season";

    /// FRED 시리즈 (예: "economic_fedfunds")
    pub fn economic(series_id: &str) -> String {
        format!("economic_{}", series_id.to_lowercase())
    }

    /// UI용 일별 차트 (예: "market_chart_btc_usd")
    pub fn market_chart(asset_key: &str) -> String {
        format!("market_chart_{}", asset_key)
    }

    /// OHLC 캔들
    pub fn ohlc(asset_key: &str) -> String {
        format!("ohlc_{}", asset_key)
    }

    /// 24시간 시세 요약
    pub fn ticker(asset_key: &str) -> String {
        format!("ticker_{}", asset_key)
    }

    /// Pi Cycle 프레임
    pub fn pi_cycle(asset_key: &str) -> String {
        format!("pi_cycle_{}", asset_key)
    }

    /// 레인보우 밴드
    pub fn rainbow(asset_key: &str) -> String {
        format!("rainbow_{}", asset_key)
    }

    /// RSI 시리즈 (예: "rsi_btc_usd_14")
    pub fn rsi(asset_key: &str, period: usize) -> String {
        format!("rsi_{}_{}", asset_key, period)
    }
}

/// 시리즈 갱신 결과.
pub(crate) struct SeriesRefresh {
    /// 병합 후 시리즈
    pub series: PriceSeries,
    /// 새 데이터를 제공한 소스 이름 (장애 시 "cache")
    pub source: String,
    /// 이번에 새로 가져온 점 수
    pub fetched: usize,
}

/// 자산의 일별 가격 시리즈를 증분 갱신합니다.
///
/// 저장된 시리즈가 있으면 마지막 날짜 이후 갭(+안전 버퍼)만 가져오고,
/// 없거나 `force`면 깊은 이력 소스로 전체 백필합니다. 모든 소스가
/// 실패해도 저장된 시리즈가 있으면 그대로 반환합니다 — 일시적 제공자
/// 장애가 이력을 지우는 일은 없습니다.
pub(crate) async fn refresh_series(
    ctx: &CollectorContext,
    asset: &Asset,
    force: bool,
) -> DashResult<SeriesRefresh> {
    let asset_key = ctx.config.asset_key(asset);
    let today = Utc::now().date_naive();
    let last = ctx.series.last_date(&asset_key).await?;

    let gap = if force {
        None
    } else {
        incremental_gap(last, today)
    };

    let fetch_result = match gap {
        // 체인의 어떤 소스도 갭을 못 덮으면 백필로 전환
        Some(days) if covered_by_chain(ctx, days) => {
            fetch_daily_with_fallback(ctx, asset, days).await
        }
        _ => fetch_backfill(ctx, asset).await,
    };

    match fetch_result {
        Ok((source, points)) => {
            let fetched = points.len();
            let series = ctx.series.merge(&asset_key, points).await?;
            Ok(SeriesRefresh {
                series,
                source,
                fetched,
            })
        }
        Err(e) => {
            // 저장된 시리즈가 있으면 이번 주기는 그걸로 버틴다
            if let Some(series) = ctx.series.get(&asset_key).await? {
                warn!(
                    asset = %asset.ticker,
                    error = %e,
                    stored = series.len(),
                    "시리즈 갱신 실패, 저장된 시리즈 사용"
                );
                return Ok(SeriesRefresh {
                    series,
                    source: "cache".to_string(),
                    fetched: 0,
                });
            }
            Err(e)
        }
    }
}

fn covered_by_chain(ctx: &CollectorContext, days: u32) -> bool {
    ctx.price_sources
        .iter()
        .any(|source| source.max_days_back() >= days)
}

/// fallback 체인을 따라 일별 가격을 조회합니다.
///
/// 플랜 한도가 모자란 소스는 건너뛰고, fallback 가치가 있는 실패
/// (네트워크, 한도, 제공자 오류)는 다음 소스로 넘어갑니다. 성공 시
/// 소스 이름을 함께 반환합니다.
async fn fetch_daily_with_fallback(
    ctx: &CollectorContext,
    asset: &Asset,
    days: u32,
) -> DashResult<(String, Vec<PricePoint>)> {
    let vs = ctx.config.vs_currency;
    let mut last_error: Option<DashError> = None;

    for source in &ctx.price_sources {
        if source.max_days_back() < days {
            continue;
        }
        match source.fetch_daily_prices(asset, vs, days).await {
            Ok(points) => return Ok((source.name().to_string(), points)),
            Err(e) if e.is_fallback_worthy() => {
                warn!(
                    asset = %asset.ticker,
                    source = source.name(),
                    error = %e,
                    "소스 실패, 다음 소스로 전환"
                );
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_error.unwrap_or_else(|| {
        DashError::Config(format!(
            "{}일 갭을 덮는 가격 소스가 없습니다",
            days
        ))
    }))
}

/// 깊은 이력 소스로 전체 백필을 수행합니다.
///
/// 깊은 이력 소스가 실패하면 일별 소스들이 각자의 최대 한도만큼
/// 채워주는 best-effort fallback을 시도합니다.
async fn fetch_backfill(
    ctx: &CollectorContext,
    asset: &Asset,
) -> DashResult<(String, Vec<PricePoint>)> {
    let vs = ctx.config.vs_currency;
    let limit = ctx.config.refresh.backfill_limit;

    match ctx
        .history_source
        .fetch_historical_daily(asset, vs, limit)
        .await
    {
        Ok(points) => return Ok((ctx.history_source.name().to_string(), points)),
        Err(e) if e.is_fallback_worthy() => {
            warn!(
                asset = %asset.ticker,
                source = ctx.history_source.name(),
                error = %e,
                "백필 소스 실패, 일별 소스로 전환"
            );
        }
        Err(e) => return Err(e),
    }

    let mut last_error: Option<DashError> = None;
    for source in &ctx.price_sources {
        let days = source.max_days_back().min(limit);
        match source.fetch_daily_prices(asset, vs, days).await {
            Ok(points) => return Ok((source.name().to_string(), points)),
            Err(e) if e.is_fallback_worthy() => last_error = Some(e),
            Err(e) => return Err(e),
        }
    }

    Err(last_error
        .unwrap_or_else(|| DashError::EmptyData(format!("{} 백필 실패", asset.ticker))))
}

/// 하위 작업 사이의 공유 제공자 rate-limit 딜레이.
pub(crate) async fn pace(ctx: &CollectorContext) {
    let delay = ctx.config.refresh.request_delay();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// 리포트 마무리 공통 처리.
pub(crate) fn finish(mut report: RunReport, start: std::time::Instant) -> RunReport {
    report.elapsed = start.elapsed();
    report
}
