//! 합성 루트 (Composition Root).
//!
//! 제공자 클라이언트, 캐시, 시리즈 저장소를 명시적으로 생성해
//! 갱신 모듈에 넘겨주는 컨텍스트입니다. 전역/ambient 조회는 없습니다 —
//! 모든 의존성이 이 구조체를 통해 흐릅니다.
//!
//! 일별 가격 소스는 우선순위 순서의 fallback 체인으로 구성됩니다:
//! CoinGecko → CryptoCompare → Alpha Vantage (키 있을 때).
//! 테스트는 trait 스텁으로 같은 자리를 채웁니다.

use std::sync::Arc;

use dash_core::{
    DailyPriceSource, EconomicDataSource, HistoricalDailySource, MarketDataSource, NewsSource,
    SentimentSource,
};
use dash_data::provider::{
    AlphaVantageClient, AlternativeMeClient, CoinGeckoClient, CryptoCompareClient, FinnhubClient,
    FredClient,
};
use dash_data::{CacheBackend, FreshnessCache, RedisCache, RedisConfig, SeriesStore};
use tracing::info;

use crate::config::CollectorConfig;
use crate::error::CollectorError;
use crate::Result;

/// 갱신 모듈이 사용하는 의존성 묶음.
pub struct CollectorContext {
    /// 설정
    pub config: CollectorConfig,
    /// 신선도 계약 캐시
    pub cache: FreshnessCache,
    /// 일별 가격 시리즈 저장소
    pub series: SeriesStore,
    /// 일별 가격 소스 fallback 체인 (우선순위 순)
    pub price_sources: Vec<Arc<dyn DailyPriceSource>>,
    /// 깊은 이력 소스 (시리즈 최초 백필)
    pub history_source: Arc<dyn HistoricalDailySource>,
    /// 시장 데이터 소스
    pub market_source: Arc<dyn MarketDataSource>,
    /// 공포/탐욕 심리 소스
    pub sentiment_source: Arc<dyn SentimentSource>,
    /// 뉴스 소스 fallback 체인 (우선순위 순)
    pub news_sources: Vec<Arc<dyn NewsSource>>,
    /// 경제 지표 소스 (FRED 키 있을 때)
    pub economic_source: Option<Arc<dyn EconomicDataSource>>,
}

impl CollectorContext {
    /// 모든 의존성을 직접 주입해 컨텍스트를 생성합니다.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: CollectorConfig,
        backend: Arc<dyn CacheBackend>,
        price_sources: Vec<Arc<dyn DailyPriceSource>>,
        history_source: Arc<dyn HistoricalDailySource>,
        market_source: Arc<dyn MarketDataSource>,
        sentiment_source: Arc<dyn SentimentSource>,
        news_sources: Vec<Arc<dyn NewsSource>>,
        economic_source: Option<Arc<dyn EconomicDataSource>>,
    ) -> Self {
        Self {
            config,
            cache: FreshnessCache::new(backend.clone()),
            series: SeriesStore::new(backend),
            price_sources,
            history_source,
            market_source,
            sentiment_source,
            news_sources,
            economic_source,
        }
    }

    /// 설정만으로 운영용 컨텍스트를 구성합니다.
    ///
    /// Redis에 연결하고 실제 제공자 클라이언트를 생성합니다. API 키가
    /// 필요한 소스는 키가 설정된 경우에만 체인에 들어갑니다.
    pub async fn from_config(config: CollectorConfig) -> Result<Self> {
        let redis = RedisCache::connect(&RedisConfig {
            url: config.redis_url.clone(),
        })
        .await
        .map_err(|e| CollectorError::Cache(e.to_string()))?;
        let backend: Arc<dyn CacheBackend> = Arc::new(redis);

        let mut coingecko = CoinGeckoClient::new();
        if let Some(key) = &config.providers.coingecko {
            coingecko = coingecko.with_api_key(key.clone());
        }

        let mut cryptocompare = CryptoCompareClient::new();
        if let Some(key) = &config.providers.cryptocompare {
            cryptocompare = cryptocompare.with_api_key(key.clone());
        }

        let mut price_sources: Vec<Arc<dyn DailyPriceSource>> = vec![
            Arc::new(coingecko.clone()),
            Arc::new(cryptocompare.clone()),
        ];
        if let Some(key) = &config.providers.alphavantage {
            price_sources.push(Arc::new(AlphaVantageClient::new(key.clone())));
        }

        let mut news_sources: Vec<Arc<dyn NewsSource>> = Vec::new();
        if let Some(token) = &config.providers.finnhub {
            news_sources.push(Arc::new(FinnhubClient::new(token.clone())));
        }
        news_sources.push(Arc::new(cryptocompare.clone()));

        let economic_source: Option<Arc<dyn EconomicDataSource>> = config
            .providers
            .fred
            .as_ref()
            .map(|key| Arc::new(FredClient::new(key.clone())) as Arc<dyn EconomicDataSource>);

        info!(
            price_sources = price_sources.len(),
            news_sources = news_sources.len(),
            fred = economic_source.is_some(),
            "컨텍스트 구성 완료"
        );

        Ok(Self::new(
            config,
            backend,
            price_sources,
            Arc::new(cryptocompare),
            Arc::new(coingecko),
            Arc::new(AlternativeMeClient::new()),
            news_sources,
            economic_source,
        ))
    }
}
