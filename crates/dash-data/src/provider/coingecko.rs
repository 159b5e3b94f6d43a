//! CoinGecko API 클라이언트.
//!
//! 기본 시장 데이터 제공자입니다. 일별 가격 차트, 전체 시장 통계,
//! 상위 코인 테이블, 트렌딩, 현재가, OHLC 캔들을 제공합니다.
//!
//! # 플랜 한도
//!
//! 무료(demo) 플랜은 market_chart 조회를 최근 365일로 제한합니다.
//! 그보다 깊은 이력이 필요하면 CryptoCompare의 histoday를 사용해야
//! 합니다 (`HistoricalDailySource`).
//!
//! # 오류 envelope
//!
//! 한도 초과 시 HTTP 200 본문에 `{"status":{"error_code":...,
//! "error_message":...}}` 형태로 오류가 내장될 수 있어, 모든 응답에서
//! 이를 감지합니다.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use dash_core::{
    Asset, Candle, CoinMarket, DailyPriceSource, DashResult, GlobalMarket, MarketDataSource,
    PricePoint, TickerStats, TrendingCoin, VsCurrency,
};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use super::build_http_client;
use crate::error::{DataError, Result};

const PROVIDER: &str = "coingecko";

/// 무료 플랜의 market_chart 최대 조회 일수.
const FREE_PLAN_MAX_DAYS: u32 = 365;

/// CoinGecko API 클라이언트.
#[derive(Clone)]
pub struct CoinGeckoClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl Default for CoinGeckoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CoinGeckoClient {
    /// 새로운 클라이언트 생성.
    pub fn new() -> Self {
        Self {
            client: build_http_client(),
            base_url: "https://api.coingecko.com/api/v3".to_string(),
            api_key: None,
        }
    }

    /// demo API 키를 설정합니다 (한도 완화).
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// base URL 재지정 (테스트용).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// GET 요청 후 오류 envelope까지 검사한 JSON 반환.
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.get(&url).query(query);
        if let Some(key) = &self.api_key {
            request = request.header("x-cg-demo-api-key", key);
        }

        let response = request.send().await?;
        let status = response.status();

        if status.as_u16() == 429 {
            return Err(DataError::RateLimited {
                provider: PROVIDER.to_string(),
                message: "HTTP 429".to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataError::ProviderError {
                provider: PROVIDER.to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let value: Value = response.json().await?;

        // HTTP 200 본문에 내장된 오류 envelope 감지
        if let Some(code) = value.pointer("/status/error_code").and_then(Value::as_u64) {
            let message = value
                .pointer("/status/error_message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            return Err(if code == 429 {
                DataError::RateLimited {
                    provider: PROVIDER.to_string(),
                    message,
                }
            } else {
                DataError::ProviderError {
                    provider: PROVIDER.to_string(),
                    message: format!("error_code {}: {}", code, message),
                }
            });
        }

        Ok(value)
    }

    /// 일별 가격 차트 조회 (`/coins/{id}/market_chart`).
    ///
    /// 같은 날짜에 여러 관측값이 오면(당일 진행 중 점 포함) 마지막
    /// 값만 유지합니다.
    pub async fn fetch_market_chart(
        &self,
        asset: &Asset,
        vs: VsCurrency,
        days_back: u32,
    ) -> Result<Vec<PricePoint>> {
        #[derive(Deserialize)]
        struct RawChart {
            prices: Vec<(i64, f64)>,
        }

        let path = format!("/coins/{}/market_chart", asset.id);
        let query = [
            ("vs_currency", vs.as_str().to_string()),
            ("days", days_back.to_string()),
            ("interval", "daily".to_string()),
        ];
        let value = self.get_json(&path, &query).await?;
        let raw: RawChart = serde_json::from_value(value)?;

        let mut by_date: BTreeMap<NaiveDate, PricePoint> = BTreeMap::new();
        for (ms, price) in raw.prices {
            let datetime = DateTime::from_timestamp_millis(ms).ok_or_else(|| {
                DataError::ParseError(format!("잘못된 timestamp: {}", ms))
            })?;
            let price = Decimal::from_f64(price)
                .ok_or_else(|| DataError::ParseError(format!("잘못된 가격: {}", price)))?;
            by_date.insert(
                datetime.date_naive(),
                PricePoint {
                    date: datetime.date_naive(),
                    timestamp: ms / 1000,
                    price,
                },
            );
        }

        if by_date.is_empty() {
            return Err(DataError::EmptyData(format!(
                "{} market_chart 응답에 가격 없음",
                asset.id
            )));
        }

        tracing::debug!(asset = %asset.id, points = by_date.len(), "market_chart 조회 완료");
        Ok(by_date.into_values().collect())
    }

    /// 전체 시장 통계 조회 (`/global`).
    pub async fn fetch_global_stats(&self) -> Result<GlobalMarket> {
        #[derive(Deserialize)]
        struct RawGlobal {
            data: RawGlobalData,
        }
        #[derive(Deserialize)]
        struct RawGlobalData {
            total_market_cap: HashMap<String, f64>,
            total_volume: HashMap<String, f64>,
            market_cap_percentage: HashMap<String, f64>,
            active_cryptocurrencies: Option<u32>,
            market_cap_change_percentage_24h_usd: Option<f64>,
        }

        let value = self.get_json("/global", &[]).await?;
        let raw: RawGlobal = serde_json::from_value(value)?;
        let data = raw.data;

        let usd_cap = data.total_market_cap.get("usd").copied().ok_or_else(|| {
            DataError::ParseError("global 응답에 usd 시가총액 없음".to_string())
        })?;
        let usd_volume = data.total_volume.get("usd").copied().ok_or_else(|| {
            DataError::ParseError("global 응답에 usd 거래대금 없음".to_string())
        })?;

        Ok(GlobalMarket {
            total_market_cap: decimal_from(usd_cap)?,
            total_volume: decimal_from(usd_volume)?,
            btc_dominance: decimal_from(
                data.market_cap_percentage.get("btc").copied().unwrap_or(0.0),
            )?,
            eth_dominance: decimal_from(
                data.market_cap_percentage.get("eth").copied().unwrap_or(0.0),
            )?,
            active_cryptocurrencies: data.active_cryptocurrencies,
            market_cap_change_pct_24h: data
                .market_cap_change_percentage_24h_usd
                .and_then(Decimal::from_f64),
        })
    }

    /// 상위 코인 테이블 조회 (`/coins/markets`).
    pub async fn fetch_markets(&self, vs: VsCurrency, limit: u32) -> Result<Vec<CoinMarket>> {
        let raw_rows = self.fetch_market_rows(vs, limit, None).await?;
        Ok(raw_rows.into_iter().map(RawMarketRow::into_coin).collect())
    }

    /// 트렌딩 검색 코인 조회 (`/search/trending`).
    pub async fn fetch_trending_coins(&self) -> Result<Vec<TrendingCoin>> {
        #[derive(Deserialize)]
        struct RawTrending {
            coins: Vec<RawTrendingEntry>,
        }
        #[derive(Deserialize)]
        struct RawTrendingEntry {
            item: RawTrendingItem,
        }
        #[derive(Deserialize)]
        struct RawTrendingItem {
            id: String,
            symbol: String,
            name: String,
            market_cap_rank: Option<u32>,
            score: Option<u32>,
        }

        let value = self.get_json("/search/trending", &[]).await?;
        let raw: RawTrending = serde_json::from_value(value)?;

        Ok(raw
            .coins
            .into_iter()
            .map(|entry| TrendingCoin {
                id: entry.item.id,
                symbol: entry.item.symbol.to_uppercase(),
                name: entry.item.name,
                market_cap_rank: entry.item.market_cap_rank,
                score: entry.item.score,
            })
            .collect())
    }

    /// 여러 자산의 현재가 조회 (`/simple/price`).
    pub async fn fetch_prices(
        &self,
        assets: &[Asset],
        vs: VsCurrency,
    ) -> Result<HashMap<String, Decimal>> {
        let ids: Vec<&str> = assets.iter().map(|a| a.id.as_str()).collect();
        let query = [
            ("ids", ids.join(",")),
            ("vs_currencies", vs.as_str().to_string()),
        ];
        let value = self.get_json("/simple/price", &query).await?;
        let raw: HashMap<String, HashMap<String, f64>> = serde_json::from_value(value)?;

        let mut prices = HashMap::new();
        for (id, currencies) in raw {
            if let Some(price) = currencies.get(vs.as_str()).copied() {
                prices.insert(id, decimal_from(price)?);
            }
        }

        if prices.is_empty() {
            return Err(DataError::EmptyData("simple/price 응답에 가격 없음".to_string()));
        }
        Ok(prices)
    }

    /// OHLC 캔들 조회 (`/coins/{id}/ohlc`).
    pub async fn fetch_ohlc_candles(
        &self,
        asset: &Asset,
        vs: VsCurrency,
        days: u32,
    ) -> Result<Vec<Candle>> {
        let path = format!("/coins/{}/ohlc", asset.id);
        let query = [
            ("vs_currency", vs.as_str().to_string()),
            ("days", days.to_string()),
        ];
        let value = self.get_json(&path, &query).await?;
        let raw: Vec<(i64, f64, f64, f64, f64)> = serde_json::from_value(value)?;

        if raw.is_empty() {
            return Err(DataError::EmptyData(format!("{} ohlc 응답 비어 있음", asset.id)));
        }

        raw.into_iter()
            .map(|(ms, open, high, low, close)| {
                Ok(Candle {
                    timestamp: ms / 1000,
                    open: decimal_from(open)?,
                    high: decimal_from(high)?,
                    low: decimal_from(low)?,
                    close: decimal_from(close)?,
                })
            })
            .collect()
    }

    /// 한 자산의 24시간 시세 요약 조회 (markets 단일 행).
    pub async fn fetch_ticker_stats(
        &self,
        asset: &Asset,
        vs: VsCurrency,
    ) -> Result<TickerStats> {
        let rows = self.fetch_market_rows(vs, 1, Some(&asset.id)).await?;
        let row = rows.into_iter().next().ok_or_else(|| {
            DataError::EmptyData(format!("{} markets 응답에 행 없음", asset.id))
        })?;

        let price = row
            .current_price
            .and_then(Decimal::from_f64)
            .ok_or_else(|| DataError::ParseError(format!("{} 현재가 없음", asset.id)))?;

        Ok(TickerStats {
            asset_key: asset.key(),
            price,
            high_24h: row.high_24h.and_then(Decimal::from_f64),
            low_24h: row.low_24h.and_then(Decimal::from_f64),
            volume_24h: row.total_volume.and_then(Decimal::from_f64),
            change_pct_24h: row
                .price_change_percentage_24h_in_currency
                .and_then(Decimal::from_f64),
        })
    }

    async fn fetch_market_rows(
        &self,
        vs: VsCurrency,
        limit: u32,
        ids: Option<&str>,
    ) -> Result<Vec<RawMarketRow>> {
        let mut query = vec![
            ("vs_currency", vs.as_str().to_string()),
            ("order", "market_cap_desc".to_string()),
            ("per_page", limit.to_string()),
            ("page", "1".to_string()),
            ("price_change_percentage", "24h,7d,30d,90d".to_string()),
        ];
        if let Some(ids) = ids {
            query.push(("ids", ids.to_string()));
        }

        let value = self.get_json("/coins/markets", &query).await?;
        let rows: Vec<RawMarketRow> = serde_json::from_value(value)?;
        Ok(rows)
    }
}

/// `/coins/markets` 한 행.
#[derive(Deserialize)]
struct RawMarketRow {
    id: String,
    symbol: String,
    name: String,
    market_cap_rank: Option<u32>,
    current_price: Option<f64>,
    market_cap: Option<f64>,
    high_24h: Option<f64>,
    low_24h: Option<f64>,
    total_volume: Option<f64>,
    price_change_percentage_24h_in_currency: Option<f64>,
    price_change_percentage_7d_in_currency: Option<f64>,
    price_change_percentage_30d_in_currency: Option<f64>,
    price_change_percentage_90d_in_currency: Option<f64>,
}

impl RawMarketRow {
    fn into_coin(self) -> CoinMarket {
        CoinMarket {
            id: self.id,
            symbol: self.symbol.to_uppercase(),
            name: self.name,
            market_cap_rank: self.market_cap_rank,
            current_price: self.current_price.and_then(Decimal::from_f64),
            market_cap: self.market_cap.and_then(Decimal::from_f64),
            change_pct_24h: self
                .price_change_percentage_24h_in_currency
                .and_then(Decimal::from_f64),
            change_pct_7d: self
                .price_change_percentage_7d_in_currency
                .and_then(Decimal::from_f64),
            change_pct_30d: self
                .price_change_percentage_30d_in_currency
                .and_then(Decimal::from_f64),
            change_pct_90d: self
                .price_change_percentage_90d_in_currency
                .and_then(Decimal::from_f64),
        }
    }
}

fn decimal_from(value: f64) -> Result<Decimal> {
    Decimal::from_f64(value)
        .ok_or_else(|| DataError::ParseError(format!("Decimal 변환 실패: {}", value)))
}

#[async_trait]
impl DailyPriceSource for CoinGeckoClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn max_days_back(&self) -> u32 {
        FREE_PLAN_MAX_DAYS
    }

    async fn fetch_daily_prices(
        &self,
        asset: &Asset,
        vs: VsCurrency,
        days_back: u32,
    ) -> DashResult<Vec<PricePoint>> {
        let days = days_back.min(FREE_PLAN_MAX_DAYS);
        Ok(self.fetch_market_chart(asset, vs, days).await?)
    }
}

#[async_trait]
impl MarketDataSource for CoinGeckoClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch_global(&self) -> DashResult<GlobalMarket> {
        Ok(self.fetch_global_stats().await?)
    }

    async fn fetch_top_coins(&self, vs: VsCurrency, limit: u32) -> DashResult<Vec<CoinMarket>> {
        Ok(self.fetch_markets(vs, limit).await?)
    }

    async fn fetch_trending(&self) -> DashResult<Vec<TrendingCoin>> {
        Ok(self.fetch_trending_coins().await?)
    }

    async fn fetch_simple_prices(
        &self,
        assets: &[Asset],
        vs: VsCurrency,
    ) -> DashResult<HashMap<String, Decimal>> {
        Ok(self.fetch_prices(assets, vs).await?)
    }

    async fn fetch_ohlc(
        &self,
        asset: &Asset,
        vs: VsCurrency,
        days: u32,
    ) -> DashResult<Vec<Candle>> {
        Ok(self.fetch_ohlc_candles(asset, vs, days).await?)
    }

    async fn fetch_ticker(&self, asset: &Asset, vs: VsCurrency) -> DashResult<TickerStats> {
        Ok(self.fetch_ticker_stats(asset, vs).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(server: &mockito::ServerGuard) -> CoinGeckoClient {
        CoinGeckoClient::new().with_base_url(server.url())
    }

    #[tokio::test]
    async fn test_market_chart_parses_and_dedupes_dates() {
        let mut server = mockito::Server::new_async().await;
        // 마지막 두 점은 같은 날짜 (일별 점 + 당일 진행 중 점)
        let body = r#"{
            "prices": [
                [1704067200000, 42000.0],
                [1704153600000, 43000.0],
                [1704200000000, 43500.0]
            ]
        }"#;
        let _mock = server
            .mock("GET", "/coins/bitcoin/market_chart")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let points = client(&server)
            .fetch_market_chart(&Asset::bitcoin(), VsCurrency::Usd, 365)
            .await
            .unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[1].price, Decimal::from(43500));
    }

    #[tokio::test]
    async fn test_embedded_error_envelope_detected() {
        let mut server = mockito::Server::new_async().await;
        let body = r#"{
            "status": {
                "error_code": 429,
                "error_message": "You've exceeded the Rate Limit."
            }
        }"#;
        let _mock = server
            .mock("GET", "/coins/bitcoin/market_chart")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let result = client(&server)
            .fetch_market_chart(&Asset::bitcoin(), VsCurrency::Usd, 30)
            .await;

        assert!(matches!(result, Err(DataError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn test_http_429_maps_to_rate_limited() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/global")
            .with_status(429)
            .with_body("slow down")
            .create_async()
            .await;

        let result = client(&server).fetch_global_stats().await;

        assert!(matches!(result, Err(DataError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn test_global_parses() {
        let mut server = mockito::Server::new_async().await;
        let body = r#"{
            "data": {
                "total_market_cap": {"usd": 2500000000000.0},
                "total_volume": {"usd": 90000000000.0},
                "market_cap_percentage": {"btc": 52.3, "eth": 16.8},
                "active_cryptocurrencies": 11000,
                "market_cap_change_percentage_24h_usd": -1.2
            }
        }"#;
        let _mock = server
            .mock("GET", "/global")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let global = client(&server).fetch_global_stats().await.unwrap();

        assert!(global.btc_dominance > Decimal::from(52));
        assert_eq!(global.active_cryptocurrencies, Some(11000));
    }

    #[tokio::test]
    async fn test_empty_chart_is_typed_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/coins/bitcoin/market_chart")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"prices": []}"#)
            .create_async()
            .await;

        let result = client(&server)
            .fetch_market_chart(&Asset::bitcoin(), VsCurrency::Usd, 30)
            .await;

        assert!(matches!(result, Err(DataError::EmptyData(_))));
    }
}
