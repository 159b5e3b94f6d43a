//! 알트코인 시즌 지수 (Altcoin Season Index).
//!
//! 상위 코인 중 비트코인보다 성과가 좋은 코인의 비율을 0-100 지수로
//! 계산합니다. 75 이상이면 알트코인 시즌, 25 이하면 비트코인 시즌입니다.
//!
//! # 조회 기간 fallback
//!
//! 제공자 데이터 가용성에 따라 90d→30d→7d→24h 순서로 처음 있는
//! 기간을 사용합니다. 비트코인이 자신의 기간을 고르고, 다른 코인도
//! 각자 독립적으로 같은 순서를 따라 내려갑니다. 그래서 코인에 따라
//! 서로 다른 기간의 성과가 비교될 수 있는데, 이는 운영 중인 소스
//! 동작 그대로 보존한 것입니다 (DESIGN.md 참조).

use chrono::Utc;
use dash_core::{AltcoinSeasonSnapshot, CoinMarket, SeasonLabel};
use rust_decimal::Decimal;

use crate::indicators::{IndicatorError, IndicatorResult};

/// 비교에서 제외하는 자산 id (스테이블코인, 래핑/스테이킹 파생물).
const EXCLUDED_IDS: &[&str] = &[
    "tether",
    "usd-coin",
    "dai",
    "first-digital-usd",
    "ethena-usde",
    "wrapped-bitcoin",
    "wrapped-steth",
    "staked-ether",
    "weth",
];

/// 조회 기간 후보 (선호 순서).
const PERIODS: &[&str] = &["90d", "30d", "7d", "24h"];

/// 알트코인 시즌 계산기.
#[derive(Debug, Default)]
pub struct AltcoinSeasonCalculator;

impl AltcoinSeasonCalculator {
    /// 새로운 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 상위 코인 테이블에서 알트코인 시즌 지수를 계산합니다.
    pub fn index(&self, coins: &[CoinMarket]) -> IndicatorResult<AltcoinSeasonSnapshot> {
        let btc = coins
            .iter()
            .find(|c| c.id == "bitcoin")
            .ok_or_else(|| {
                IndicatorError::CalculationError("테이블에 bitcoin 행 없음".to_string())
            })?;

        let (btc_period, btc_perf) = first_available_performance(btc).ok_or_else(|| {
            IndicatorError::CalculationError("bitcoin 성과 데이터 없음".to_string())
        })?;

        let mut sample_size = 0usize;
        let mut outperforming = 0usize;
        for coin in coins {
            if coin.id == "bitcoin" || EXCLUDED_IDS.contains(&coin.id.as_str()) {
                continue;
            }
            // 코인마다 독립적으로 기간 fallback (관찰된 소스 동작 보존)
            let Some((_, perf)) = first_available_performance(coin) else {
                continue;
            };
            sample_size += 1;
            if perf > btc_perf {
                outperforming += 1;
            }
        }

        if sample_size == 0 {
            return Err(IndicatorError::CalculationError(
                "비교 가능한 코인 없음".to_string(),
            ));
        }

        let index = Decimal::from(outperforming as u64) * Decimal::ONE_HUNDRED
            / Decimal::from(sample_size as u64);

        Ok(AltcoinSeasonSnapshot {
            index,
            season: SeasonLabel::from_index(index),
            outperforming,
            sample_size,
            btc_period: btc_period.to_string(),
            updated_at: Utc::now(),
        })
    }
}

/// 선호 순서에서 처음 있는 기간의 변동률 반환.
fn first_available_performance(coin: &CoinMarket) -> Option<(&'static str, Decimal)> {
    for &period in PERIODS {
        let value = match period {
            "90d" => coin.change_pct_90d,
            "30d" => coin.change_pct_30d,
            "7d" => coin.change_pct_7d,
            "24h" => coin.change_pct_24h,
            _ => None,
        };
        if let Some(value) = value {
            return Some((period, value));
        }
    }
    None
}
