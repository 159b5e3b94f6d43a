//! CryptoCompare API 클라이언트.
//!
//! CoinGecko보다 깊은 일봉 이력(최대 2000일)을 제공하는 소스입니다.
//! 시리즈 최초 백필과 일별 가격 fallback, 그리고 뉴스 fallback에
//! 사용됩니다.
//!
//! # 오류 envelope
//!
//! CryptoCompare는 오류를 HTTP 200 본문의
//! `{"Response":"Error","Message":...}` 형태로 반환하므로 상태 코드만
//! 믿으면 안 됩니다.

use async_trait::async_trait;
use chrono::DateTime;
use dash_core::{
    Asset, DailyPriceSource, DashResult, HistoricalDailySource, NewsItem, NewsSource, PricePoint,
    VsCurrency,
};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use super::build_http_client;
use crate::error::{DataError, Result};

const PROVIDER: &str = "cryptocompare";

/// histoday 요청당 최대 캔들 수.
const HISTODAY_MAX_LIMIT: u32 = 2000;

/// CryptoCompare API 클라이언트.
#[derive(Clone)]
pub struct CryptoCompareClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl Default for CryptoCompareClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CryptoCompareClient {
    /// 새로운 클라이언트 생성.
    pub fn new() -> Self {
        Self {
            client: build_http_client(),
            base_url: "https://min-api.cryptocompare.com".to_string(),
            api_key: None,
        }
    }

    /// API 키를 설정합니다.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// base URL 재지정 (테스트용).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.get(&url).query(query);
        if let Some(key) = &self.api_key {
            request = request.header("authorization", format!("Apikey {}", key));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataError::ProviderError {
                provider: PROVIDER.to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let value: Value = response.json().await?;

        // HTTP 200 본문에 내장된 오류 envelope 감지
        if value.get("Response").and_then(Value::as_str) == Some("Error") {
            let message = value
                .get("Message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            return Err(if message.to_lowercase().contains("rate limit") {
                DataError::RateLimited {
                    provider: PROVIDER.to_string(),
                    message,
                }
            } else {
                DataError::ProviderError {
                    provider: PROVIDER.to_string(),
                    message,
                }
            });
        }

        Ok(value)
    }

    /// 일봉 캔들 조회 (`/data/v2/histoday`).
    ///
    /// 집계된 OHLC 캔들에서 종가를 일별 가격으로 추출합니다.
    pub async fn fetch_histoday(
        &self,
        asset: &Asset,
        vs: VsCurrency,
        limit: u32,
    ) -> Result<Vec<PricePoint>> {
        #[derive(Deserialize)]
        struct RawHistoday {
            #[serde(rename = "Data")]
            data: RawHistodayData,
        }
        #[derive(Deserialize)]
        struct RawHistodayData {
            #[serde(rename = "Data")]
            candles: Vec<RawCandle>,
        }
        #[derive(Deserialize)]
        struct RawCandle {
            time: i64,
            close: f64,
        }

        let query = [
            ("fsym", asset.ticker.clone()),
            ("tsym", vs.as_str().to_uppercase()),
            ("limit", limit.min(HISTODAY_MAX_LIMIT).to_string()),
        ];
        let value = self.get_json("/data/v2/histoday", &query).await?;
        let raw: RawHistoday = serde_json::from_value(value)?;

        let mut points = Vec::with_capacity(raw.data.candles.len());
        for candle in raw.data.candles {
            // 상장 전 구간은 close가 0으로 채워져 옴
            if candle.close <= 0.0 {
                continue;
            }
            let datetime = DateTime::from_timestamp(candle.time, 0).ok_or_else(|| {
                DataError::ParseError(format!("잘못된 timestamp: {}", candle.time))
            })?;
            let price = Decimal::from_f64(candle.close).ok_or_else(|| {
                DataError::ParseError(format!("잘못된 종가: {}", candle.close))
            })?;
            points.push(PricePoint {
                date: datetime.date_naive(),
                timestamp: candle.time,
                price,
            });
        }

        if points.is_empty() {
            return Err(DataError::EmptyData(format!(
                "{} histoday 응답에 캔들 없음",
                asset.ticker
            )));
        }

        tracing::debug!(asset = %asset.ticker, points = points.len(), "histoday 조회 완료");
        Ok(points)
    }

    /// 최신 뉴스 조회 (`/data/v2/news/`).
    pub async fn fetch_latest_news(&self, limit: u32) -> Result<Vec<NewsItem>> {
        #[derive(Deserialize)]
        struct RawNews {
            #[serde(rename = "Data")]
            data: Vec<RawArticle>,
        }
        #[derive(Deserialize)]
        struct RawArticle {
            title: String,
            url: String,
            body: Option<String>,
            imageurl: Option<String>,
            published_on: i64,
            source_info: RawSourceInfo,
        }
        #[derive(Deserialize)]
        struct RawSourceInfo {
            name: String,
        }

        let query = [("lang", "EN".to_string())];
        let value = self.get_json("/data/v2/news/", &query).await?;
        let raw: RawNews = serde_json::from_value(value)?;

        let items: Vec<NewsItem> = raw
            .data
            .into_iter()
            .take(limit as usize)
            .filter_map(|article| {
                let published_at = DateTime::from_timestamp(article.published_on, 0)?;
                Some(NewsItem {
                    title: article.title,
                    url: article.url,
                    source: article.source_info.name,
                    summary: article.body,
                    image_url: article.imageurl,
                    published_at,
                })
            })
            .collect();

        if items.is_empty() {
            return Err(DataError::EmptyData("뉴스 응답 비어 있음".to_string()));
        }
        Ok(items)
    }
}

#[async_trait]
impl HistoricalDailySource for CryptoCompareClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch_historical_daily(
        &self,
        asset: &Asset,
        vs: VsCurrency,
        limit: u32,
    ) -> DashResult<Vec<PricePoint>> {
        Ok(self.fetch_histoday(asset, vs, limit).await?)
    }
}

#[async_trait]
impl DailyPriceSource for CryptoCompareClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn max_days_back(&self) -> u32 {
        HISTODAY_MAX_LIMIT
    }

    async fn fetch_daily_prices(
        &self,
        asset: &Asset,
        vs: VsCurrency,
        days_back: u32,
    ) -> DashResult<Vec<PricePoint>> {
        Ok(self.fetch_histoday(asset, vs, days_back).await?)
    }
}

#[async_trait]
impl NewsSource for CryptoCompareClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch_crypto_news(&self, limit: u32) -> DashResult<Vec<NewsItem>> {
        Ok(self.fetch_latest_news(limit).await?)
    }
}
