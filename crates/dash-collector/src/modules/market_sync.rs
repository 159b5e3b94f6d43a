//! 시장 도메인 갱신 모듈.
//!
//! 전체 시장 통계, 상위 코인 테이블, 트렌딩 코인을 조회해
//! [`MarketSnapshot`]으로 묶어 캐시에 기록합니다. 일부 하위 작업이
//! 실패하면 성공한 부분만으로 스냅샷을 만들고, 실패한 부분은 이전
//! 캐시가 계속 서빙합니다.

use chrono::Utc;
use dash_core::MarketSnapshot;
use std::time::Instant;

use super::{finish, keys, pace, SyncOptions};
use crate::context::CollectorContext;
use crate::report::{run_subtask_with, RunReport};

/// 시장 도메인 갱신 실행.
pub async fn sync_market(ctx: &CollectorContext, _options: &SyncOptions) -> RunReport {
    let start = Instant::now();
    let mut report = RunReport::new("market");
    let mut snapshot = MarketSnapshot::default();

    tracing::info!("시장 도메인 갱신 시작");

    let (result, global) = run_subtask_with("전체 시장 통계", || async {
        let global = ctx.market_source.fetch_global().await?;
        let detail = format!(
            "BTC 도미넌스 {}%, 활성 코인 {}",
            global.btc_dominance.round_dp(1),
            global
                .active_cryptocurrencies
                .map(|n| n.to_string())
                .unwrap_or_else(|| "?".to_string())
        );
        Ok((detail, global))
    })
    .await;
    report.push(result);
    snapshot.global = global;
    pace(ctx).await;

    let limit = ctx.config.refresh.top_coins_limit;
    let (result, top_coins) = run_subtask_with("상위 코인 테이블", || async {
        let coins = ctx
            .market_source
            .fetch_top_coins(ctx.config.vs_currency, limit)
            .await?;
        Ok((format!("{}개 행", coins.len()), coins))
    })
    .await;
    report.push(result);
    snapshot.top_coins = top_coins.unwrap_or_default();
    pace(ctx).await;

    let (result, trending) = run_subtask_with("트렌딩 코인", || async {
        let trending = ctx.market_source.fetch_trending().await?;
        Ok((format!("{}개", trending.len()), trending))
    })
    .await;
    report.push(result);
    snapshot.trending = trending.unwrap_or_default();

    // 최소 한 부분이라도 성공했을 때만 스냅샷 교체
    if report.succeeded() {
        snapshot.updated_at = Some(Utc::now());
        let ttl = ctx.config.refresh.snapshot_ttl_secs;
        let source = ctx.market_source.name();
        let (result, _) = run_subtask_with("스냅샷 저장", || async {
            ctx.cache
                .put_with_meta(keys::MARKET_SNAPSHOT, &snapshot, ttl, source)
                .await?;
            Ok((format!("키 {}", keys::MARKET_SNAPSHOT), ()))
        })
        .await;
        report.push(result);
    }

    finish(report, start)
}
