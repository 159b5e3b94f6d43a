//! 모멘텀 지표 (Momentum Indicators).
//!
//! 과매수/과매도 상태를 측정하는 지표를 제공합니다.
//! - RSI (Relative Strength Index, Wilder smoothing)

use dash_core::{PricePoint, RsiPoint};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// RSI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RsiParams {
    /// RSI 기간 (기본: 14).
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 모멘텀 지표 계산기.
#[derive(Debug, Default)]
pub struct MomentumCalculator;

impl MomentumCalculator {
    /// 새로운 모멘텀 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// RSI (Relative Strength Index) 계산.
    ///
    /// RSI = 100 - (100 / (1 + RS)), RS = 평균 상승폭 / 평균 하락폭
    ///
    /// 첫 period개 변화량의 단순 평균으로 시드한 뒤 Wilder smoothing
    /// `avg = (avg*(period-1) + current) / period`를 적용합니다.
    /// 평균 하락폭이 정확히 0이면 RSI는 100입니다.
    ///
    /// # 인자
    /// * `closes` - 가격 데이터 (종가)
    /// * `params` - RSI 파라미터
    ///
    /// # 반환
    /// 입력과 1:1로 정렬된 벡터. 처음 period개는 `None`.
    pub fn rsi(
        &self,
        closes: &[Decimal],
        params: RsiParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = params.period;

        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }
        if closes.len() < period + 1 {
            return Err(IndicatorError::InsufficientData {
                required: period + 1,
                provided: closes.len(),
            });
        }

        // 일간 변화량을 상승/하락으로 분리 (하락은 양수 크기로)
        let mut gains = Vec::with_capacity(closes.len() - 1);
        let mut losses = Vec::with_capacity(closes.len() - 1);
        for i in 1..closes.len() {
            let delta = closes[i] - closes[i - 1];
            if delta > Decimal::ZERO {
                gains.push(delta);
                losses.push(Decimal::ZERO);
            } else {
                gains.push(Decimal::ZERO);
                losses.push(delta.abs());
            }
        }

        let divisor = Decimal::from(period as u64);
        let wilder_weight = Decimal::from((period - 1) as u64);

        // 시드: 첫 period개 변화량의 단순 평균
        let mut avg_gain: Decimal = gains[..period].iter().sum::<Decimal>() / divisor;
        let mut avg_loss: Decimal = losses[..period].iter().sum::<Decimal>() / divisor;

        let mut result: Vec<Option<Decimal>> = vec![None; period];
        result.push(Some(Self::rsi_value(avg_gain, avg_loss)));

        for i in period..gains.len() {
            avg_gain = (avg_gain * wilder_weight + gains[i]) / divisor;
            avg_loss = (avg_loss * wilder_weight + losses[i]) / divisor;
            result.push(Some(Self::rsi_value(avg_gain, avg_loss)));
        }

        Ok(result)
    }

    /// 날짜가 붙은 RSI 시리즈 계산.
    ///
    /// 입력 순서를 신뢰하지 않고 timestamp 기준으로 정렬한 뒤 계산합니다.
    pub fn rsi_points(
        &self,
        series: &[PricePoint],
        params: RsiParams,
    ) -> IndicatorResult<Vec<RsiPoint>> {
        let mut sorted = series.to_vec();
        sorted.sort_by_key(|p| p.timestamp);

        let closes: Vec<Decimal> = sorted.iter().map(|p| p.price).collect();
        let values = self.rsi(&closes, params)?;

        Ok(sorted
            .iter()
            .zip(values)
            .map(|(point, rsi)| RsiPoint {
                date: point.date,
                rsi,
            })
            .collect())
    }

    fn rsi_value(avg_gain: Decimal, avg_loss: Decimal) -> Decimal {
        if avg_loss.is_zero() {
            return Decimal::ONE_HUNDRED;
        }
        let rs = avg_gain / avg_loss;
        Decimal::ONE_HUNDRED - Decimal::ONE_HUNDRED / (Decimal::ONE + rs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rsi_alignment_and_warmup() {
        let calc = MomentumCalculator::new();
        let closes: Vec<Decimal> = (0..30).map(|i| Decimal::from(100 + (i % 5))).collect();

        let rsi = calc.rsi(&closes, RsiParams { period: 14 }).unwrap();

        assert_eq!(rsi.len(), closes.len());
        // 처음 period개 날짜에는 RSI가 없다
        for value in rsi.iter().take(14) {
            assert!(value.is_none());
        }
        assert!(rsi[14].is_some());
    }

    #[test]
    fn test_rsi_monotonic_increase_hits_100() {
        let calc = MomentumCalculator::new();
        // 단조 증가 → 평균 하락폭 0 → 명시적 100 분기
        let closes: Vec<Decimal> = (0..30).map(|i| Decimal::from(100 + i)).collect();

        let rsi = calc.rsi(&closes, RsiParams::default()).unwrap();

        for value in rsi.into_iter().flatten() {
            assert_eq!(value, dec!(100));
        }
    }

    #[test]
    fn test_rsi_monotonic_decrease_approaches_zero() {
        let calc = MomentumCalculator::new();
        let closes: Vec<Decimal> = (0..30).map(|i| Decimal::from(1000 - i)).collect();

        let rsi = calc.rsi(&closes, RsiParams::default()).unwrap();

        // 단조 하락 → 평균 상승폭 0 → RSI 0
        for value in rsi.into_iter().flatten() {
            assert_eq!(value, dec!(0));
        }
    }

    #[test]
    fn test_rsi_bounded() {
        let calc = MomentumCalculator::new();
        let closes: Vec<Decimal> = (0..60)
            .map(|i| Decimal::from(100 + if i % 2 == 0 { i } else { 60 - i }))
            .collect();

        let rsi = calc.rsi(&closes, RsiParams::default()).unwrap();

        for value in rsi.into_iter().flatten() {
            assert!(value >= dec!(0) && value <= dec!(100));
        }
    }

    #[test]
    fn test_rsi_insufficient_data() {
        let calc = MomentumCalculator::new();
        let closes: Vec<Decimal> = (0..14).map(Decimal::from).collect();

        let result = calc.rsi(&closes, RsiParams { period: 14 });

        assert!(matches!(
            result,
            Err(IndicatorError::InsufficientData {
                required: 15,
                provided: 14
            })
        ));
    }

    #[test]
    fn test_rsi_points_sorts_input() {
        let calc = MomentumCalculator::new();
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut series: Vec<PricePoint> = (0..20)
            .map(|i| {
                PricePoint::new(base + chrono::Duration::days(i), Decimal::from(100 + i))
            })
            .collect();
        series.reverse();

        let points = calc.rsi_points(&series, RsiParams { period: 14 }).unwrap();

        assert_eq!(points.len(), 20);
        assert_eq!(points[0].date, base);
        assert!(points[0].rsi.is_none());
        // 단조 증가 시리즈이므로 워밍업 이후는 100
        assert_eq!(points[19].rsi, Some(dec!(100)));
    }
}
