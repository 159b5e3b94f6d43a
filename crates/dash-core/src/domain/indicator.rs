//! 파생 지표 프레임 타입.
//!
//! 지표 엔진의 계산 결과가 캐시에 기록되는 형태를 정의합니다.
//! 프레임은 부분 갱신 없이 매 주기 통째로 교체됩니다.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 날짜별 지표 프레임 한 건.
///
/// 이동평균 맵은 윈도우 라벨(예: "sma_111", "sma_350x2")을 키로 하며,
/// 시리즈가 해당 윈도우를 채우기 전까지 값은 `None`입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorFrame {
    /// 달력 날짜
    pub date: NaiveDate,
    /// 해당 날짜의 종가
    pub price: Decimal,
    /// 윈도우 라벨별 이동평균 값
    pub moving_averages: BTreeMap<String, Option<Decimal>>,
    /// 단기선이 장기선을 상향 돌파한 날인지 여부
    pub is_crossover: bool,
}

/// 날짜별 RSI 값.
///
/// 입력 시리즈와 1:1로 정렬되며, 처음 `period`개 날짜는 RSI가 없습니다.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RsiPoint {
    /// 달력 날짜
    pub date: NaiveDate,
    /// RSI 값 (0-100)
    pub rsi: Option<Decimal>,
}

/// 레인보우 차트의 날짜별 밴드 값.
///
/// 밴드 맵은 라벨(예: "band_1" 최하단 ~ "band_9" 최상단)을 키로 하며,
/// 로그 회귀 곡선에 배수를 곱한 가격 수준을 담습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RainbowPoint {
    /// 달력 날짜
    pub date: NaiveDate,
    /// 해당 날짜의 종가
    pub price: Decimal,
    /// 라벨별 밴드 가격 수준 (하단부터 상단 순)
    pub bands: BTreeMap<String, Decimal>,
}

/// 알트코인 시즌 판정 라벨.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonLabel {
    /// 알트코인 시즌 (지수 >= 75)
    AltcoinSeason,
    /// 비트코인 시즌 (지수 <= 25)
    BitcoinSeason,
    /// 중립 구간
    Neutral,
}

impl SeasonLabel {
    /// 지수로부터 시즌 라벨 판정.
    pub fn from_index(index: Decimal) -> Self {
        if index >= Decimal::from(75) {
            Self::AltcoinSeason
        } else if index <= Decimal::from(25) {
            Self::BitcoinSeason
        } else {
            Self::Neutral
        }
    }
}

/// 알트코인 시즌 지수 스냅샷.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AltcoinSeasonSnapshot {
    /// 지수 (0-100): 비트코인을 앞선 코인 비율
    pub index: Decimal,
    /// 시즌 판정
    pub season: SeasonLabel,
    /// 비트코인을 앞선 코인 수
    pub outperforming: usize,
    /// 비교에 포함된 코인 수
    pub sample_size: usize,
    /// 비트코인 기준으로 선택된 조회 기간 라벨 (예: "90d")
    pub btc_period: String,
    /// 계산 시각
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_season_label_bounds() {
        assert_eq!(SeasonLabel::from_index(dec!(75)), SeasonLabel::AltcoinSeason);
        assert_eq!(SeasonLabel::from_index(dec!(25)), SeasonLabel::BitcoinSeason);
        assert_eq!(SeasonLabel::from_index(dec!(50)), SeasonLabel::Neutral);
    }
}
