//! 도메인 시퀀스 실행기.
//!
//! 도메인 오케스트레이터를 고정된 순서로 실행하고 결과를
//! [`CommandReport`]로 집계합니다. 한 도메인이 실패해도 다음 도메인은
//! 계속 실행됩니다 — 종료 코드만 실패를 반영합니다.

use clap::ValueEnum;
use std::fmt;
use std::time::Instant;

use crate::context::CollectorContext;
use crate::modules::{self, SyncOptions};
use crate::report::{CommandReport, RunReport};

/// 갱신 도메인.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Domain {
    /// 시장 스냅샷 (통계, 상위 코인, 트렌딩)
    Market,
    /// 지갑 스냅샷
    Wallet,
    /// 시장 데이터 3종 세트 (차트, OHLC, 시세)
    MarketData,
    /// 뉴스/경제 캘린더
    News,
    /// 기술적 지표 (Pi Cycle, 레인보우, 알트코인 시즌, RSI)
    Indicators,
    /// 공포/탐욕 심리
    Sentiment,
}

impl Domain {
    /// 고정 실행 순서.
    pub fn all() -> [Domain; 6] {
        [
            Domain::Market,
            Domain::Wallet,
            Domain::MarketData,
            Domain::News,
            Domain::Indicators,
            Domain::Sentiment,
        ]
    }

    /// 로그/리포트에 쓰이는 이름.
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Market => "market",
            Domain::Wallet => "wallet",
            Domain::MarketData => "market-data",
            Domain::News => "news",
            Domain::Indicators => "indicators",
            Domain::Sentiment => "sentiment",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 전체 실행 옵션.
#[derive(Debug, Clone, Default)]
pub struct RunAllOptions {
    /// 건너뛸 도메인
    pub skip: Vec<Domain>,
    /// 신선도 무시 강제 재계산
    pub force: bool,
}

/// 단일 도메인 갱신 실행.
pub async fn run_domain(ctx: &CollectorContext, domain: Domain, force: bool) -> RunReport {
    let options = SyncOptions { force };
    match domain {
        Domain::Market => modules::sync_market(ctx, &options).await,
        Domain::Wallet => modules::sync_wallet(ctx, &options).await,
        Domain::MarketData => modules::sync_market_data(ctx, &options).await,
        Domain::News => modules::sync_news(ctx, &options).await,
        Domain::Indicators => modules::sync_indicators(ctx, &options).await,
        Domain::Sentiment => modules::sync_sentiment(ctx, &options).await,
    }
}

/// 모든 도메인을 고정 순서로 실행하고 집계 리포트를 반환합니다.
pub async fn run_all(ctx: &CollectorContext, options: &RunAllOptions) -> CommandReport {
    let start = Instant::now();
    let mut command_report = CommandReport::default();

    for domain in Domain::all() {
        if options.skip.contains(&domain) {
            tracing::info!(domain = %domain, "도메인 건너뜀 (--skip)");
            continue;
        }

        let report = run_domain(ctx, domain, options.force).await;
        report.log_summary();
        command_report.reports.push(report);
    }

    command_report.elapsed = start.elapsed();
    command_report.log_summary();
    command_report
}
