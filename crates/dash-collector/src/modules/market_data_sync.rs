//! 시장 데이터 도메인 갱신 모듈 (자산별 3종 세트).
//!
//! 추적 대상 자산마다 세 가지 데이터셋을 갱신합니다:
//! 1. 일별 차트 — 시리즈 증분 갱신 후 최근 구간을 UI용으로 기록
//! 2. OHLC 캔들
//! 3. 24시간 시세 요약
//!
//! 자산과 데이터셋 단위로 하위 작업이 독립적이라, 한 자산의 장애가
//! 다른 자산의 갱신을 막지 않습니다.

use dash_core::PricePoint;
use std::time::Instant;

use super::{finish, keys, pace, refresh_series, SyncOptions};
use crate::context::CollectorContext;
use crate::report::{run_subtask, RunReport};

/// 시장 데이터 도메인 갱신 실행.
pub async fn sync_market_data(ctx: &CollectorContext, options: &SyncOptions) -> RunReport {
    let start = Instant::now();
    let mut report = RunReport::new("market-data");

    tracing::info!(
        assets = ctx.config.tracked_assets.len(),
        "시장 데이터 도메인 갱신 시작"
    );

    let ttl = ctx.config.refresh.snapshot_ttl_secs;
    let chart_days = ctx.config.refresh.chart_days;
    let vs = ctx.config.vs_currency;

    for asset in &ctx.config.tracked_assets {
        let asset_key = ctx.config.asset_key(asset);

        let result = run_subtask(&format!("{} 일별 차트", asset.ticker), || async {
            let refresh = refresh_series(ctx, asset, options.force).await?;
            let tail: Vec<PricePoint> = refresh
                .series
                .points
                .iter()
                .rev()
                .take(chart_days)
                .rev()
                .cloned()
                .collect();
            ctx.cache
                .put_forever_with_meta(&keys::market_chart(&asset_key), &tail, &refresh.source)
                .await?;
            Ok(format!(
                "시리즈 {}점 (신규 {}), 차트 {}점 ({})",
                refresh.series.len(),
                refresh.fetched,
                tail.len(),
                refresh.source
            ))
        })
        .await;
        report.push(result);
        pace(ctx).await;

        let result = run_subtask(&format!("{} OHLC 캔들", asset.ticker), || async {
            let candles = ctx
                .market_source
                .fetch_ohlc(asset, vs, ctx.config.refresh.ohlc_days)
                .await?;
            let count = candles.len();
            ctx.cache
                .put_with_meta(
                    &keys::ohlc(&asset_key),
                    &candles,
                    ttl,
                    ctx.market_source.name(),
                )
                .await?;
            Ok(format!("캔들 {}개", count))
        })
        .await;
        report.push(result);
        pace(ctx).await;

        let result = run_subtask(&format!("{} 시세", asset.ticker), || async {
            let ticker = ctx.market_source.fetch_ticker(asset, vs).await?;
            let detail = format!(
                "현재가 {}, 24h {}%",
                ticker.price.round_dp(2),
                ticker
                    .change_pct_24h
                    .map(|c| c.round_dp(2).to_string())
                    .unwrap_or_else(|| "?".to_string())
            );
            ctx.cache
                .put_with_meta(
                    &keys::ticker(&asset_key),
                    &ticker,
                    ttl,
                    ctx.market_source.name(),
                )
                .await?;
            Ok(detail)
        })
        .await;
        report.push(result);
        pace(ctx).await;
    }

    finish(report, start)
}
