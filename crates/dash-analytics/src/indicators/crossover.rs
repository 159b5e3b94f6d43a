//! 장기 crossover 시리즈 (Long-term Crossover).
//!
//! 단기 이동평균이 배수를 곱한 장기 이동평균을 상향 돌파하는 지점을
//! 날짜별 프레임으로 표시합니다. 111일/350일×2 구성이 비트코인
//! Pi Cycle Top 신호의 일반형입니다.

use dash_core::{IndicatorFrame, PricePoint};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::trend::TrendIndicators;
use super::{IndicatorError, IndicatorResult};

/// crossover 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CrossoverParams {
    /// 단기 윈도우 (일).
    pub short_window: usize,
    /// 장기 윈도우 (일).
    pub long_window: usize,
    /// 장기선에 곱하는 배수.
    pub long_multiplier: Decimal,
}

impl Default for CrossoverParams {
    /// Pi Cycle Top: 111일 SMA vs 350일 SMA × 2.
    fn default() -> Self {
        Self {
            short_window: 111,
            long_window: 350,
            long_multiplier: Decimal::TWO,
        }
    }
}

impl CrossoverParams {
    /// 단기선 라벨 (예: "sma_111").
    pub fn short_label(&self) -> String {
        format!("sma_{}", self.short_window)
    }

    /// 배수 적용 장기선 라벨 (예: "sma_350x2").
    pub fn long_label(&self) -> String {
        format!("sma_{}x{}", self.long_window, self.long_multiplier.normalize())
    }
}

/// crossover 계산기.
#[derive(Debug, Default)]
pub struct CrossoverCalculator {
    trend: TrendIndicators,
}

impl CrossoverCalculator {
    /// 새로운 crossover 계산기 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 전체 시리즈의 crossover 프레임 계산.
    ///
    /// 각 인덱스에서 단기 SMA와 배수 적용 장기 SMA를 계산하고,
    /// 직전 인덱스에서 두 선이 모두 정의된 상태에서 단기선이
    /// ≤에서 strict >로 전환되는 지점에만 `is_crossover`를 표시합니다.
    /// 동률은 "아직 돌파 전"으로 취급합니다.
    ///
    /// 입력 순서를 신뢰하지 않고 timestamp 기준으로 정렬한 뒤 계산합니다.
    pub fn crossover_series(
        &self,
        series: &[PricePoint],
        params: CrossoverParams,
    ) -> IndicatorResult<Vec<IndicatorFrame>> {
        if params.short_window == 0 {
            return Err(IndicatorError::InvalidParameter(
                "단기 윈도우는 0보다 커야 합니다".to_string(),
            ));
        }
        if params.short_window >= params.long_window {
            return Err(IndicatorError::InvalidParameter(format!(
                "단기 윈도우({})는 장기 윈도우({})보다 작아야 합니다",
                params.short_window, params.long_window
            )));
        }
        if params.long_multiplier <= Decimal::ZERO {
            return Err(IndicatorError::InvalidParameter(
                "배수는 0보다 커야 합니다".to_string(),
            ));
        }
        if series.is_empty() {
            return Err(IndicatorError::InsufficientData {
                required: 1,
                provided: 0,
            });
        }

        let mut sorted = series.to_vec();
        sorted.sort_by_key(|p| p.timestamp);
        let closes: Vec<Decimal> = sorted.iter().map(|p| p.price).collect();

        let short_label = params.short_label();
        let long_label = params.long_label();

        let mut frames = Vec::with_capacity(sorted.len());
        let mut prev_lines: Option<(Decimal, Decimal)> = None;

        for (i, point) in sorted.iter().enumerate() {
            let short_ma = self.trend.sma_at(&closes, i, params.short_window);
            let long_scaled = self
                .trend
                .sma_at(&closes, i, params.long_window)
                .map(|ma| ma * params.long_multiplier);

            let lines = short_ma.zip(long_scaled);
            let is_crossover = match (prev_lines, lines) {
                // 직전 인덱스에서 두 선이 모두 정의되어 있어야 하고,
                // ≤ → strict > 전환이어야 상승 돌파
                (Some((prev_short, prev_long)), Some((short, long))) => {
                    prev_short <= prev_long && short > long
                }
                _ => false,
            };
            prev_lines = lines;

            let mut moving_averages = BTreeMap::new();
            moving_averages.insert(short_label.clone(), short_ma);
            moving_averages.insert(long_label.clone(), long_scaled);

            frames.push(IndicatorFrame {
                date: point.date,
                price: point.price,
                moving_averages,
                is_crossover,
            });
        }

        Ok(frames)
    }
}
