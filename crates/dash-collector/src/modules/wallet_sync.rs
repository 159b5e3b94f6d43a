//! 지갑 도메인 갱신 모듈.
//!
//! 설정된 보유 자산을 현재가로 평가해 [`WalletSnapshot`]을 기록합니다.

use chrono::Utc;
use dash_core::{Asset, DashError, HoldingValue, WalletSnapshot};
use rust_decimal::Decimal;
use std::time::Instant;

use super::{finish, keys, SyncOptions};
use crate::context::CollectorContext;
use crate::report::{run_subtask_with, RunReport};

/// 지갑 도메인 갱신 실행.
pub async fn sync_wallet(ctx: &CollectorContext, _options: &SyncOptions) -> RunReport {
    let start = Instant::now();
    let mut report = RunReport::new("wallet");

    tracing::info!("지갑 도메인 갱신 시작");

    let ttl = ctx.config.refresh.snapshot_ttl_secs;
    let source = ctx.market_source.name();
    let (result, _) = run_subtask_with("지갑 평가", || async {
        let holdings_config = &ctx.config.wallet_holdings;
        let vs = ctx.config.vs_currency;

        if holdings_config.is_empty() {
            let snapshot = WalletSnapshot {
                holdings: Vec::new(),
                total_value: Decimal::ZERO,
                vs_currency: vs,
                updated_at: Utc::now(),
            };
            ctx.cache
                .put_with_meta(keys::WALLET_SNAPSHOT, &snapshot, ttl, source)
                .await?;
            return Ok(("보유 자산 미설정 (WALLET_HOLDINGS)".to_string(), ()));
        }

        let assets: Vec<Asset> = holdings_config.iter().map(|(a, _)| a.clone()).collect();
        let prices = ctx.market_source.fetch_simple_prices(&assets, vs).await?;

        let mut holdings = Vec::with_capacity(holdings_config.len());
        let mut total_value = Decimal::ZERO;
        for (asset, amount) in holdings_config {
            let price = prices.get(&asset.id).copied().ok_or_else(|| {
                DashError::EmptyData(format!("{} 가격이 응답에 없습니다", asset.id))
            })?;
            let value = price * amount;
            total_value += value;
            holdings.push(HoldingValue {
                asset: asset.clone(),
                amount: *amount,
                price,
                value,
            });
        }

        let count = holdings.len();
        let snapshot = WalletSnapshot {
            holdings,
            total_value,
            vs_currency: vs,
            updated_at: Utc::now(),
        };
        ctx.cache
            .put_with_meta(keys::WALLET_SNAPSHOT, &snapshot, ttl, source)
            .await?;

        Ok((
            format!("자산 {}개, 총 {} {}", count, total_value.round_dp(2), vs),
            (),
        ))
    })
    .await;
    report.push(result);

    finish(report, start)
}
