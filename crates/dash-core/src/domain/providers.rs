//! 업스트림 데이터 제공자 trait 정의.
//!
//! 이 모듈은 오케스트레이터가 구체 제공자 클라이언트 대신 바라보는
//! 추상화 계층을 제공합니다. 구현체는 dash-data 크레이트에 있으며,
//! 테스트에서는 스텁으로 대체됩니다. 합성 루트가 우선순위 순서의
//! `Vec<Arc<dyn DailyPriceSource>>`로 fallback 체인을 구성합니다.
//!
//! 모든 메서드는 값 또는 타입화된 실패를 반환합니다. 재시도는 하지
//! 않으며, 캐싱도 하지 않습니다 — 그것은 오케스트레이터의 책임입니다.

use crate::error::DashResult;
use crate::types::{Asset, VsCurrency};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;

use super::market_data::{Candle, CoinMarket, GlobalMarket, PricePoint, TickerStats, TrendingCoin};
use super::snapshot::{EconomicSeries, FearGreedPoint, NewsItem};

/// 일별 가격 시리즈 제공자.
///
/// `max_days_back`는 제공자 플랜 한도(예: 무료 플랜 365일)를 나타내며,
/// 호출자는 필요한 범위에 맞는 제공자를 골라야 합니다.
#[async_trait]
pub trait DailyPriceSource: Send + Sync {
    /// 소스 이름 (로그와 `_meta.source`에 기록).
    fn name(&self) -> &'static str;

    /// 한 번에 조회 가능한 최대 과거 일수.
    fn max_days_back(&self) -> u32;

    /// 최근 `days_back`일의 일별 가격을 조회합니다.
    async fn fetch_daily_prices(
        &self,
        asset: &Asset,
        vs: VsCurrency,
        days_back: u32,
    ) -> DashResult<Vec<PricePoint>>;
}

/// 깊은 이력 제공자.
///
/// 일봉 캔들 기반 스키마를 쓰는 제공자로, 종가를 일별 가격으로
/// 추출합니다. 시리즈 최초 백필에 사용됩니다.
#[async_trait]
pub trait HistoricalDailySource: Send + Sync {
    /// 소스 이름.
    fn name(&self) -> &'static str;

    /// 최근 `limit`개의 일봉에서 추출한 일별 가격을 조회합니다.
    async fn fetch_historical_daily(
        &self,
        asset: &Asset,
        vs: VsCurrency,
        limit: u32,
    ) -> DashResult<Vec<PricePoint>>;
}

/// 시장 데이터 제공자 (통계, 테이블, 시세).
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// 소스 이름.
    fn name(&self) -> &'static str;

    /// 전체 시장 통계를 조회합니다.
    async fn fetch_global(&self) -> DashResult<GlobalMarket>;

    /// 시가총액 상위 `limit`개 코인 테이블을 조회합니다.
    async fn fetch_top_coins(&self, vs: VsCurrency, limit: u32) -> DashResult<Vec<CoinMarket>>;

    /// 트렌딩 검색 코인을 조회합니다.
    async fn fetch_trending(&self) -> DashResult<Vec<TrendingCoin>>;

    /// 여러 자산의 현재가를 한 번에 조회합니다. 키는 자산 id입니다.
    async fn fetch_simple_prices(
        &self,
        assets: &[Asset],
        vs: VsCurrency,
    ) -> DashResult<HashMap<String, Decimal>>;

    /// 최근 `days`일의 OHLC 캔들을 조회합니다.
    async fn fetch_ohlc(&self, asset: &Asset, vs: VsCurrency, days: u32) -> DashResult<Vec<Candle>>;

    /// 24시간 시세 요약을 조회합니다.
    async fn fetch_ticker(&self, asset: &Asset, vs: VsCurrency) -> DashResult<TickerStats>;
}

/// 공포/탐욕 심리 지수 제공자.
#[async_trait]
pub trait SentimentSource: Send + Sync {
    /// 소스 이름.
    fn name(&self) -> &'static str;

    /// 최근 `limit`개의 공포/탐욕 지수를 조회합니다 (최신순).
    async fn fetch_fear_greed(&self, limit: u32) -> DashResult<Vec<FearGreedPoint>>;
}

/// 암호화폐 뉴스 제공자.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// 소스 이름.
    fn name(&self) -> &'static str;

    /// 최신 암호화폐 헤드라인을 조회합니다.
    async fn fetch_crypto_news(&self, limit: u32) -> DashResult<Vec<NewsItem>>;
}

/// 경제 지표 시리즈 제공자.
#[async_trait]
pub trait EconomicDataSource: Send + Sync {
    /// 소스 이름.
    fn name(&self) -> &'static str;

    /// 시리즈의 최근 `limit`개 관측값을 조회합니다.
    async fn fetch_series(&self, series_id: &str, limit: u32) -> DashResult<EconomicSeries>;
}
