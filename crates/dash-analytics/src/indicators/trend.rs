//! 추세 지표 (Trend Indicators).
//!
//! 이동평균 기반의 추세 지표들을 제공합니다.
//! - SMA (Simple Moving Average)
//! - EMA (Exponential Moving Average)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// SMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for SmaParams {
    fn default() -> Self {
        Self { period: 20 }
    }
}

/// EMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for EmaParams {
    fn default() -> Self {
        Self { period: 12 }
    }
}

/// 추세 지표 계산기.
#[derive(Debug, Default)]
pub struct TrendIndicators;

impl TrendIndicators {
    /// 새로운 추세 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 단순 이동평균 (SMA) 계산.
    ///
    /// # 인자
    /// * `prices` - 가격 데이터 (종가)
    /// * `params` - SMA 파라미터 (기간)
    ///
    /// # 반환
    /// 입력과 같은 길이의 벡터. 처음 period-1개는 `None`.
    pub fn sma(
        &self,
        prices: &[Decimal],
        params: SmaParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = params.period;

        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }
        if prices.len() < period {
            return Err(IndicatorError::InsufficientData {
                required: period,
                provided: prices.len(),
            });
        }

        let divisor = Decimal::from(period as u64);
        let mut result = Vec::with_capacity(prices.len());
        let mut window_sum = Decimal::ZERO;

        for (i, price) in prices.iter().enumerate() {
            window_sum += price;
            if i >= period {
                window_sum -= prices[i - period];
            }
            if i + 1 >= period {
                result.push(Some(window_sum / divisor));
            } else {
                result.push(None);
            }
        }

        Ok(result)
    }

    /// 특정 인덱스에서 끝나는 윈도우의 SMA.
    ///
    /// 인덱스 앞에 (자신 포함) `period`개 미만의 점만 있으면 `None`.
    pub fn sma_at(&self, prices: &[Decimal], index: usize, period: usize) -> Option<Decimal> {
        if period == 0 || index >= prices.len() || index + 1 < period {
            return None;
        }
        let window = &prices[index + 1 - period..=index];
        let sum: Decimal = window.iter().sum();
        Some(sum / Decimal::from(period as u64))
    }

    /// 지수 이동평균 (EMA) 계산.
    ///
    /// 승수는 `2/(period+1)`이며, 윈도우가 처음 가득 차는 인덱스에서
    /// 첫 period개의 SMA로 시드됩니다.
    pub fn ema(
        &self,
        prices: &[Decimal],
        params: EmaParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = params.period;

        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }
        if prices.len() < period {
            return Err(IndicatorError::InsufficientData {
                required: period,
                provided: prices.len(),
            });
        }

        let multiplier =
            Decimal::from(2u64) / Decimal::from((period + 1) as u64);
        let mut result: Vec<Option<Decimal>> = vec![None; prices.len()];

        // 시드: 첫 period개의 SMA
        let seed: Decimal =
            prices[..period].iter().sum::<Decimal>() / Decimal::from(period as u64);
        result[period - 1] = Some(seed);

        let mut prev = seed;
        for i in period..prices.len() {
            let ema = (prices[i] - prev) * multiplier + prev;
            result[i] = Some(ema);
            prev = ema;
        }

        Ok(result)
    }
}
