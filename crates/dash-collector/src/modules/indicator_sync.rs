//! 지표 도메인 갱신 모듈.
//!
//! 비트코인 시리즈 기반의 장기 신호(Pi Cycle, 레인보우)와 시장 breadth
//! (알트코인 시즌), 추적 자산별 RSI를 다시 계산해 캐시에 기록합니다.
//!
//! 이 도메인의 키들은 UI가 절대 비면 안 되는 데이터셋이라 never-stale
//! 계층(만료 없음)에 기록하고, 시리즈가 바뀐 뒤에는 파생 키를 선제
//! 무효화하고 통째로 교체합니다.

use dash_analytics::{
    AltcoinSeasonCalculator, CrossoverParams, IndicatorEngine, RainbowCalculator, RainbowParams,
    RsiParams,
};
use dash_core::{Asset, DashError};
use std::time::Instant;

use super::{finish, keys, pace, refresh_series, SyncOptions};
use crate::context::CollectorContext;
use crate::report::{run_subtask, RunReport};

/// 지표 도메인 갱신 실행.
pub async fn sync_indicators(ctx: &CollectorContext, options: &SyncOptions) -> RunReport {
    let start = Instant::now();
    let mut report = RunReport::new("indicators");

    tracing::info!("지표 도메인 갱신 시작");

    let engine = IndicatorEngine::new();
    let vs = ctx.config.vs_currency;

    // Pi Cycle — 비트코인 111일 SMA vs 350일 SMA × 2
    let result = run_subtask("Pi Cycle", || async {
        let btc = bitcoin_asset(ctx)?;
        let asset_key = ctx.config.asset_key(&btc);
        let cache_key = keys::pi_cycle(&asset_key);

        let refresh = refresh_series(ctx, &btc, options.force).await?;
        let frames = engine.crossover_series(&refresh.series.points, CrossoverParams::default())?;
        let last_cross = frames
            .iter()
            .rev()
            .find(|f| f.is_crossover)
            .map(|f| f.date.to_string());

        // 시리즈가 변했으므로 파생 캐시를 비우고 통째로 교체
        ctx.cache.forget(&cache_key).await?;
        ctx.cache
            .put_forever_with_meta(&cache_key, &frames, &refresh.source)
            .await?;

        Ok(format!(
            "프레임 {}건, 최근 돌파 {}",
            frames.len(),
            last_cross.unwrap_or_else(|| "없음".to_string())
        ))
    })
    .await;
    report.push(result);
    pace(ctx).await;

    // 레인보우 차트 — 로그 회귀 밴드
    let result = run_subtask("Rainbow Chart", || async {
        let btc = bitcoin_asset(ctx)?;
        let asset_key = ctx.config.asset_key(&btc);
        let cache_key = keys::rainbow(&asset_key);

        let refresh = refresh_series(ctx, &btc, options.force).await?;
        let bands =
            RainbowCalculator::new().bands(&refresh.series.points, RainbowParams::default())?;

        ctx.cache.forget(&cache_key).await?;
        ctx.cache
            .put_forever_with_meta(&cache_key, &bands, &refresh.source)
            .await?;

        Ok(format!("밴드 프레임 {}건", bands.len()))
    })
    .await;
    report.push(result);
    pace(ctx).await;

    // 알트코인 시즌 — 상위 코인 대비 비트코인 성과
    let limit = ctx.config.refresh.top_coins_limit;
    let result = run_subtask("Altcoin Season", || async {
        if options.force {
            ctx.cache.forget(keys::ALTCOIN_SEASON).await?;
        }
        let coins = ctx.market_source.fetch_top_coins(vs, limit).await?;
        let snapshot = AltcoinSeasonCalculator::new().index(&coins)?;

        ctx.cache
            .put_forever_with_meta(keys::ALTCOIN_SEASON, &snapshot, ctx.market_source.name())
            .await?;

        Ok(format!(
            "지수 {} ({:?}), 표본 {}개 ({} 기준)",
            snapshot.index.round_dp(1),
            snapshot.season,
            snapshot.sample_size,
            snapshot.btc_period
        ))
    })
    .await;
    report.push(result);
    pace(ctx).await;

    // RSI — 추적 자산별
    let rsi_period = ctx.config.refresh.rsi_period;
    for asset in &ctx.config.tracked_assets {
        let result = run_subtask(&format!("RSI {}", asset.ticker), || async {
            let asset_key = ctx.config.asset_key(asset);
            let cache_key = keys::rsi(&asset_key, rsi_period);

            let refresh = refresh_series(ctx, asset, options.force).await?;
            let points = engine.rsi_points(
                &refresh.series.points,
                RsiParams { period: rsi_period },
            )?;
            let latest = points
                .iter()
                .rev()
                .find_map(|p| p.rsi)
                .map(|v| v.round_dp(1).to_string())
                .unwrap_or_else(|| "?".to_string());

            ctx.cache.forget(&cache_key).await?;
            ctx.cache
                .put_forever_with_meta(&cache_key, &points, &refresh.source)
                .await?;

            Ok(format!("{}건, 최근 RSI {}", points.len(), latest))
        })
        .await;
        report.push(result);
        pace(ctx).await;
    }

    finish(report, start)
}

/// 추적 대상에서 비트코인을 찾습니다.
///
/// 비트코인 없이 Pi Cycle/레인보우를 계산하는 것은 계약 위반이므로
/// 즉시 실패합니다.
fn bitcoin_asset(ctx: &CollectorContext) -> Result<Asset, DashError> {
    ctx.config
        .tracked_assets
        .iter()
        .find(|a| a.id == "bitcoin")
        .cloned()
        .ok_or_else(|| {
            DashError::InvalidInput("bitcoin이 TRACKED_ASSETS에 없습니다".to_string())
        })
}
