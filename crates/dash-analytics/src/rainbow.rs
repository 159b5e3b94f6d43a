//! 레인보우 차트 밴드 (Rainbow Chart).
//!
//! 가격의 로그-로그 회귀 곡선을 중심으로 등간격(로그 공간) 밴드를
//! 계산합니다. `ln(price) = a + b·ln(day)`를 최소제곱으로 적합한 뒤
//! 중심 곡선에 배수를 곱해 밴드를 만듭니다.
//!
//! 회귀 적합은 f64로 수행하고 경계에서만 Decimal로 변환합니다.

use dash_core::{PricePoint, RainbowPoint};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::indicators::{IndicatorError, IndicatorResult};

/// 레인보우 밴드 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RainbowParams {
    /// 밴드 수 (중심 곡선 기준 대칭).
    pub band_count: usize,
    /// 인접 밴드 간 로그 공간 간격.
    pub band_step: f64,
}

impl Default for RainbowParams {
    fn default() -> Self {
        Self {
            band_count: 9,
            band_step: 0.3,
        }
    }
}

/// 적합에 필요한 최소 시리즈 길이.
const MIN_SERIES_LEN: usize = 30;

/// 레인보우 밴드 계산기.
#[derive(Debug, Default)]
pub struct RainbowCalculator;

impl RainbowCalculator {
    /// 새로운 레인보우 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 시리즈 전체의 레인보우 밴드 계산.
    ///
    /// 밴드 라벨은 하단부터 "band_1" .. "band_N"입니다.
    pub fn bands(
        &self,
        series: &[PricePoint],
        params: RainbowParams,
    ) -> IndicatorResult<Vec<RainbowPoint>> {
        if params.band_count == 0 {
            return Err(IndicatorError::InvalidParameter(
                "밴드 수는 0보다 커야 합니다".to_string(),
            ));
        }
        if series.len() < MIN_SERIES_LEN {
            return Err(IndicatorError::InsufficientData {
                required: MIN_SERIES_LEN,
                provided: series.len(),
            });
        }

        let mut sorted = series.to_vec();
        sorted.sort_by_key(|p| p.timestamp);

        // 로그-로그 최소제곱 적합: x = ln(day), y = ln(price)
        let mut xs = Vec::with_capacity(sorted.len());
        let mut ys = Vec::with_capacity(sorted.len());
        for (i, point) in sorted.iter().enumerate() {
            let price = point.price.to_f64().unwrap_or(0.0);
            if price <= 0.0 {
                return Err(IndicatorError::CalculationError(format!(
                    "{} 가격이 양수가 아님: {}",
                    point.date, point.price
                )));
            }
            xs.push(((i + 1) as f64).ln());
            ys.push(price.ln());
        }

        let n = xs.len() as f64;
        let sum_x: f64 = xs.iter().sum();
        let sum_y: f64 = ys.iter().sum();
        let sum_xy: f64 = xs.iter().zip(&ys).map(|(x, y)| x * y).sum();
        let sum_xx: f64 = xs.iter().map(|x| x * x).sum();

        let denominator = n * sum_xx - sum_x * sum_x;
        if denominator.abs() < f64::EPSILON {
            return Err(IndicatorError::CalculationError(
                "회귀 분모가 0에 수렴".to_string(),
            ));
        }
        let slope = (n * sum_xy - sum_x * sum_y) / denominator;
        let intercept = (sum_y - slope * sum_x) / n;

        // 중심 밴드가 곡선 위에 오도록 대칭 오프셋
        let center = (params.band_count as f64 - 1.0) / 2.0;

        let mut points = Vec::with_capacity(sorted.len());
        for (i, point) in sorted.iter().enumerate() {
            let fitted = (intercept + slope * xs[i]).exp();

            let mut bands = BTreeMap::new();
            for band in 0..params.band_count {
                let offset = (band as f64 - center) * params.band_step;
                let level = fitted * offset.exp();
                let level = Decimal::from_f64(level).ok_or_else(|| {
                    IndicatorError::CalculationError(format!("밴드 값 변환 실패: {}", level))
                })?;
                bands.insert(format!("band_{}", band + 1), level);
            }

            points.push(RainbowPoint {
                date: point.date,
                price: point.price,
                bands,
            });
        }

        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn series(len: usize) -> Vec<PricePoint> {
        let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        (0..len)
            .map(|i| {
                PricePoint::new(
                    base + chrono::Duration::days(i as i64),
                    Decimal::from(1000 + (i as i64) * 10),
                )
            })
            .collect()
    }

    #[test]
    fn test_bands_are_monotone_per_date() {
        let frames = RainbowCalculator::new()
            .bands(&series(120), RainbowParams::default())
            .unwrap();

        assert_eq!(frames.len(), 120);
        for frame in &frames {
            let levels: Vec<Decimal> = frame.bands.values().copied().collect();
            assert_eq!(levels.len(), 9);
            // BTreeMap이 band_1..band_9 순서를 보장하므로 하단→상단 단조 증가
            for pair in levels.windows(2) {
                assert!(pair[0] < pair[1]);
            }
        }
    }

    #[test]
    fn test_short_series_rejected() {
        let result = RainbowCalculator::new().bands(&series(10), RainbowParams::default());

        assert!(matches!(
            result,
            Err(IndicatorError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let mut points = series(60);
        points[30].price = dec!(0);

        let result = RainbowCalculator::new().bands(&points, RainbowParams::default());

        assert!(matches!(result, Err(IndicatorError::CalculationError(_))));
    }

    #[test]
    fn test_deterministic() {
        let input = series(90);
        let calc = RainbowCalculator::new();

        let a = calc.bands(&input, RainbowParams::default()).unwrap();
        let b = calc.bands(&input, RainbowParams::default()).unwrap();

        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.bands, y.bands);
        }
    }
}
