//! 도메인 스냅샷 타입.
//!
//! 갱신 주기마다 통째로 다시 계산되어 캐시에 기록되고, (범위 밖의)
//! HTTP 레이어가 읽기 전용으로 소비하는 집계 구조체들입니다.
//! 스냅샷의 신선도는 `_meta` 동반 항목의 timestamp로 노출됩니다.

use crate::types::{Asset, VsCurrency};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::market_data::{CoinMarket, GlobalMarket, TrendingCoin};

/// 캐시 항목의 `_meta` 동반 레코드.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMeta {
    /// 마지막 성공 갱신 시각
    pub timestamp: DateTime<Utc>,
    /// 데이터를 제공한 소스 이름 (예: "coingecko")
    pub source: String,
}

impl CacheMeta {
    /// 현재 시각으로 메타 레코드를 생성합니다.
    pub fn now(source: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            source: source.into(),
        }
    }
}

/// 시장 도메인 스냅샷.
///
/// 하위 작업이 일부 실패해도 성공한 부분만으로 기록됩니다.
/// 실패한 부분은 `None`/빈 벡터로 남고 이전 캐시가 계속 서빙됩니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// 전체 시장 통계
    pub global: Option<GlobalMarket>,
    /// 상위 코인 테이블
    pub top_coins: Vec<CoinMarket>,
    /// 트렌딩 코인
    pub trending: Vec<TrendingCoin>,
    /// 스냅샷 생성 시각
    pub updated_at: Option<DateTime<Utc>>,
}

/// 지갑 보유 자산 한 건의 평가액.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingValue {
    /// 자산
    pub asset: Asset,
    /// 보유 수량
    pub amount: Decimal,
    /// 단가 (기준 통화)
    pub price: Decimal,
    /// 평가액 (수량 × 단가)
    pub value: Decimal,
}

/// 지갑 도메인 스냅샷.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletSnapshot {
    /// 보유 자산별 평가액
    pub holdings: Vec<HoldingValue>,
    /// 총 평가액
    pub total_value: Decimal,
    /// 기준 통화
    pub vs_currency: VsCurrency,
    /// 스냅샷 생성 시각
    pub updated_at: DateTime<Utc>,
}

/// 공포/탐욕 지수 한 점.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FearGreedPoint {
    /// 측정 timestamp (epoch 초)
    pub timestamp: i64,
    /// 지수 값 (0 극단적 공포 ~ 100 극단적 탐욕)
    pub value: u8,
    /// 제공자 분류 문자열 (예: "Extreme Fear")
    pub classification: String,
}

/// 심리 도메인 스냅샷.
///
/// UI의 공포/탐욕 패널은 제공자 장애 중에도 비면 안 되므로
/// never-stale 키로 기록됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentSnapshot {
    /// 현재 지수
    pub current: FearGreedPoint,
    /// 최근 이력 (최신순)
    pub history: Vec<FearGreedPoint>,
    /// 스냅샷 생성 시각
    pub updated_at: DateTime<Utc>,
}

/// 뉴스 헤드라인 한 건.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    /// 제목
    pub title: String,
    /// 기사 URL
    pub url: String,
    /// 출처 (매체 이름)
    pub source: String,
    /// 요약 (제공자에 따라 없음)
    pub summary: Option<String>,
    /// 썸네일 이미지 URL
    pub image_url: Option<String>,
    /// 게시 시각
    pub published_at: DateTime<Utc>,
}

/// 경제 지표 시리즈 한 점.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EconomicPoint {
    /// 관측 날짜
    pub date: NaiveDate,
    /// 관측 값
    pub value: Decimal,
}

/// 경제 지표 시리즈 (예: FEDFUNDS, CPIAUCSL).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomicSeries {
    /// 시리즈 id
    pub series_id: String,
    /// 날짜 오름차순 관측값
    pub points: Vec<EconomicPoint>,
    /// 조회 시각
    pub updated_at: DateTime<Utc>,
}
