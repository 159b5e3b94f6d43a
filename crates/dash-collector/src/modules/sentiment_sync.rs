//! 심리 도메인 갱신 모듈.
//!
//! 공포/탐욕 지수의 현재 값과 최근 이력을 [`SentimentSnapshot`]으로
//! 묶어 never-stale 계층에 기록합니다. 제공자 장애 중에도 패널이
//! 비지 않도록 만료 없이 저장하고 갱신 작업만 값을 교체합니다.

use chrono::Utc;
use dash_core::{DashError, SentimentSnapshot};
use std::time::Instant;

use super::{finish, keys, SyncOptions};
use crate::context::CollectorContext;
use crate::report::{run_subtask, RunReport};

/// 심리 도메인 갱신 실행.
pub async fn sync_sentiment(ctx: &CollectorContext, options: &SyncOptions) -> RunReport {
    let start = Instant::now();
    let mut report = RunReport::new("sentiment");

    tracing::info!("심리 도메인 갱신 시작");

    let history_len = ctx.config.refresh.fear_greed_history;
    let result = run_subtask("공포/탐욕 지수", || async {
        let points = ctx.sentiment_source.fetch_fear_greed(history_len).await?;
        let current = points.first().cloned().ok_or_else(|| {
            DashError::EmptyData("공포/탐욕 응답에 현재 값 없음".to_string())
        })?;

        let detail = format!("현재 {} ({})", current.value, current.classification);
        let snapshot = SentimentSnapshot {
            current,
            history: points,
            updated_at: Utc::now(),
        };

        if options.force {
            ctx.cache.forget(keys::SENTIMENT_SNAPSHOT).await?;
        }
        ctx.cache
            .put_forever_with_meta(
                keys::SENTIMENT_SNAPSHOT,
                &snapshot,
                ctx.sentiment_source.name(),
            )
            .await?;

        Ok(detail)
    })
    .await;
    report.push(result);

    finish(report, start)
}
