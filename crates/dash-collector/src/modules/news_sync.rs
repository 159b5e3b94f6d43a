//! 뉴스/캘린더 도메인 갱신 모듈.
//!
//! 암호화폐 헤드라인(소스 fallback 체인)과 FRED 경제 지표 시리즈를
//! 갱신합니다.

use dash_core::DashError;
use std::time::Instant;
use tracing::warn;

use super::{finish, keys, pace, SyncOptions};
use crate::context::CollectorContext;
use crate::report::{run_subtask, RunReport};

/// 뉴스/캘린더 도메인 갱신 실행.
pub async fn sync_news(ctx: &CollectorContext, _options: &SyncOptions) -> RunReport {
    let start = Instant::now();
    let mut report = RunReport::new("news");

    tracing::info!("뉴스/캘린더 도메인 갱신 시작");

    let ttl = ctx.config.refresh.snapshot_ttl_secs;
    let news_limit = ctx.config.refresh.news_limit;

    let result = run_subtask("암호화폐 뉴스", || async {
        let mut last_error: Option<DashError> = None;
        for source in &ctx.news_sources {
            match source.fetch_crypto_news(news_limit).await {
                Ok(items) => {
                    ctx.cache
                        .put_with_meta(keys::NEWS_LATEST, &items, ttl, source.name())
                        .await?;
                    return Ok(format!("헤드라인 {}건 ({})", items.len(), source.name()));
                }
                Err(e) if e.is_fallback_worthy() => {
                    warn!(source = source.name(), error = %e, "뉴스 소스 실패, 다음 소스로 전환");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_error
            .unwrap_or_else(|| DashError::Config("설정된 뉴스 소스가 없습니다".to_string())))
    })
    .await;
    report.push(result);
    pace(ctx).await;

    let economic_limit = ctx.config.refresh.economic_limit;
    for series_id in &ctx.config.refresh.economic_series {
        let result = run_subtask(&format!("FRED {}", series_id), || async {
            let source = ctx.economic_source.as_ref().ok_or_else(|| {
                DashError::Config("FRED_API_KEY가 설정되지 않았습니다".to_string())
            })?;
            let series = source.fetch_series(series_id, economic_limit).await?;
            let count = series.points.len();
            ctx.cache
                .put_with_meta(&keys::economic(series_id), &series, ttl, source.name())
                .await?;
            Ok(format!("관측값 {}건", count))
        })
        .await;
        report.push(result);
        pace(ctx).await;
    }

    finish(report, start)
}
