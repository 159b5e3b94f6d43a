//! 시장 데이터 타입 및 구조체.
//!
//! 이 모듈은 업스트림 제공자 응답이 번역되어 도착하는 공용 시장 데이터
//! 타입을 정의합니다:
//! - `PricePoint` / `PriceSeries` - 일별 종가 시리즈
//! - `Candle` - OHLC 일봉
//! - `GlobalMarket` - 전체 시장 통계
//! - `CoinMarket` - 상위 코인 테이블 행
//! - `TrendingCoin` - 트렌딩 검색 코인
//! - `TickerStats` - 24시간 시세 요약

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 일별 가격 한 점.
///
/// 시리즈 내에서 `date`는 유일하며, 저장 시 항상 timestamp 오름차순으로
/// 정렬됩니다. 지표 엔진은 정렬을 신뢰하기 전에 직접 정렬합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    /// 달력 날짜 (시리즈 내 유일)
    pub date: NaiveDate,
    /// epoch 초 단위 timestamp
    pub timestamp: i64,
    /// 종가
    pub price: Decimal,
}

impl PricePoint {
    /// 자정 UTC timestamp로 가격 점을 생성합니다.
    pub fn new(date: NaiveDate, price: Decimal) -> Self {
        let timestamp = date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or_default();
        Self {
            date,
            timestamp,
            price,
        }
    }
}

/// 한 자산/통화 쌍의 일별 가격 시리즈.
///
/// SeriesStore가 소유하며, 갱신 주기마다 새 날짜만 덧붙는 append-only
/// 구조입니다. 만료 없이 보존되는 "forever" 캐시 계층에 저장됩니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceSeries {
    /// 시리즈 키 (예: "btc_usd")
    pub asset_key: String,
    /// timestamp 오름차순 가격 점들
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    /// 빈 시리즈를 생성합니다.
    pub fn new(asset_key: impl Into<String>) -> Self {
        Self {
            asset_key: asset_key.into(),
            points: Vec::new(),
        }
    }

    /// 마지막(가장 최근) 저장 날짜.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// 종가 벡터 (지표 계산 입력).
    pub fn closes(&self) -> Vec<Decimal> {
        self.points.iter().map(|p| p.price).collect()
    }

    /// 시리즈 길이.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// 시리즈가 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// OHLC 일봉 캔들.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    /// 캔들 시작 timestamp (epoch 초)
    pub timestamp: i64,
    /// 시가
    pub open: Decimal,
    /// 고가
    pub high: Decimal,
    /// 저가
    pub low: Decimal,
    /// 종가
    pub close: Decimal,
}

/// 전체 암호화폐 시장 통계.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalMarket {
    /// 총 시가총액 (기준 통화)
    pub total_market_cap: Decimal,
    /// 24시간 총 거래대금 (기준 통화)
    pub total_volume: Decimal,
    /// 비트코인 도미넌스 (%)
    pub btc_dominance: Decimal,
    /// 이더리움 도미넌스 (%)
    pub eth_dominance: Decimal,
    /// 활성 암호화폐 수
    pub active_cryptocurrencies: Option<u32>,
    /// 시가총액 24시간 변동률 (%)
    pub market_cap_change_pct_24h: Option<Decimal>,
}

/// 상위 코인 테이블 한 행.
///
/// 다기간 변동률은 제공자가 해당 기간을 지원하지 않거나 코인 이력이
/// 짧으면 비어 있을 수 있습니다. altcoin-season 계산이 이 공백에
/// 기간 fallback으로 대응합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinMarket {
    /// 제공자 canonical id (예: "bitcoin")
    pub id: String,
    /// 티커 심볼 (대문자)
    pub symbol: String,
    /// 표시 이름
    pub name: String,
    /// 시가총액 순위
    pub market_cap_rank: Option<u32>,
    /// 현재가
    pub current_price: Option<Decimal>,
    /// 시가총액
    pub market_cap: Option<Decimal>,
    /// 24시간 변동률 (%)
    pub change_pct_24h: Option<Decimal>,
    /// 7일 변동률 (%)
    pub change_pct_7d: Option<Decimal>,
    /// 30일 변동률 (%)
    pub change_pct_30d: Option<Decimal>,
    /// 90일 변동률 (%)
    pub change_pct_90d: Option<Decimal>,
}

/// 트렌딩 검색 코인.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingCoin {
    /// 제공자 canonical id
    pub id: String,
    /// 티커 심볼
    pub symbol: String,
    /// 표시 이름
    pub name: String,
    /// 시가총액 순위
    pub market_cap_rank: Option<u32>,
    /// 트렌딩 점수 (0부터, 낮을수록 상위)
    pub score: Option<u32>,
}

/// 24시간 시세 요약.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerStats {
    /// 자산 키 (예: "btc")
    pub asset_key: String,
    /// 현재가
    pub price: Decimal,
    /// 24시간 고가
    pub high_24h: Option<Decimal>,
    /// 24시간 저가
    pub low_24h: Option<Decimal>,
    /// 24시간 거래대금
    pub volume_24h: Option<Decimal>,
    /// 24시간 변동률 (%)
    pub change_pct_24h: Option<Decimal>,
}
