//! Alpha Vantage API 클라이언트.
//!
//! 일별 가격의 3차 fallback 소스입니다 (`DIGITAL_CURRENCY_DAILY`).
//! 무료 플랜 한도가 매우 낮아(분당 5회) 주 소스로는 쓰지 않습니다.
//!
//! # 오류 envelope
//!
//! Alpha Vantage는 한도 초과와 오류를 모두 HTTP 200으로 반환합니다:
//! `{"Note": ...}` / `{"Information": ...}`은 한도 초과,
//! `{"Error Message": ...}`는 요청 오류입니다.

use async_trait::async_trait;
use chrono::NaiveDate;
use dash_core::{Asset, DailyPriceSource, DashResult, PricePoint, VsCurrency};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use super::build_http_client;
use crate::error::{DataError, Result};

const PROVIDER: &str = "alphavantage";

/// fallback으로 제공할 최대 과거 일수.
const MAX_DAYS_BACK: u32 = 1000;

/// Alpha Vantage API 클라이언트.
#[derive(Clone)]
pub struct AlphaVantageClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageClient {
    /// 새로운 클라이언트 생성.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: build_http_client(),
            base_url: "https://www.alphavantage.co".to_string(),
            api_key: api_key.into(),
        }
    }

    /// base URL 재지정 (테스트용).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 일별 암호화폐 시세 조회 (`DIGITAL_CURRENCY_DAILY`).
    pub async fn fetch_digital_daily(
        &self,
        asset: &Asset,
        vs: VsCurrency,
        days_back: u32,
    ) -> Result<Vec<PricePoint>> {
        let query = [
            ("function", "DIGITAL_CURRENCY_DAILY".to_string()),
            ("symbol", asset.ticker.clone()),
            ("market", vs.as_str().to_uppercase()),
            ("apikey", self.api_key.clone()),
        ];
        let url = format!("{}/query", self.base_url);
        let response = self.client.get(&url).query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DataError::ProviderError {
                provider: PROVIDER.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        let value: Value = response.json().await?;

        // HTTP 200 본문에 내장된 오류/한도 envelope 감지
        for rate_limit_key in ["Note", "Information"] {
            if let Some(message) = value.get(rate_limit_key).and_then(Value::as_str) {
                return Err(DataError::RateLimited {
                    provider: PROVIDER.to_string(),
                    message: message.to_string(),
                });
            }
        }
        if let Some(message) = value.get("Error Message").and_then(Value::as_str) {
            return Err(DataError::ProviderError {
                provider: PROVIDER.to_string(),
                message: message.to_string(),
            });
        }

        let series = value
            .get("Time Series (Digital Currency Daily)")
            .and_then(Value::as_object)
            .ok_or_else(|| {
                DataError::ParseError("응답에 Time Series 객체 없음".to_string())
            })?;

        let mut points = Vec::with_capacity(series.len());
        for (date_str, fields) in series {
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
                .map_err(|e| DataError::ParseError(format!("날짜 파싱 실패 {}: {}", date_str, e)))?;
            let close = extract_close(fields, vs).ok_or_else(|| {
                DataError::ParseError(format!("{} 종가 필드 없음", date_str))
            })?;
            let price = Decimal::from_str(close).map_err(|e| {
                DataError::ParseError(format!("종가 파싱 실패 {}: {}", close, e))
            })?;
            points.push(PricePoint::new(date, price));
        }

        if points.is_empty() {
            return Err(DataError::EmptyData(format!(
                "{} digital daily 응답 비어 있음",
                asset.ticker
            )));
        }

        points.sort_by_key(|p| p.timestamp);
        if points.len() > days_back as usize {
            let excess = points.len() - days_back as usize;
            points.drain(0..excess);
        }

        tracing::debug!(asset = %asset.ticker, points = points.len(), "digital daily 조회 완료");
        Ok(points)
    }
}

/// 종가 필드 추출.
///
/// Alpha Vantage는 스키마를 여러 번 바꿨습니다. 현행 `"4. close"`를
/// 먼저 시도하고 구형 `"4a. close (USD)"` 형태로 fallback합니다.
fn extract_close(fields: &Value, vs: VsCurrency) -> Option<&str> {
    fields
        .get("4. close")
        .or_else(|| fields.get(format!("4a. close ({})", vs.as_str().to_uppercase()).as_str()))
        .and_then(Value::as_str)
}

#[async_trait]
impl DailyPriceSource for AlphaVantageClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn max_days_back(&self) -> u32 {
        MAX_DAYS_BACK
    }

    async fn fetch_daily_prices(
        &self,
        asset: &Asset,
        vs: VsCurrency,
        days_back: u32,
    ) -> DashResult<Vec<PricePoint>> {
        Ok(self.fetch_digital_daily(asset, vs, days_back).await?)
    }
}
