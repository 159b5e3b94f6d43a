//! FRED (Federal Reserve Economic Data) API 클라이언트.
//!
//! 대시보드 매크로 패널에 쓰이는 경제 지표 시리즈를 제공합니다.
//! 관측값이 없는 날은 값이 `"."`로 오므로 건너뜁니다.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use dash_core::{DashResult, EconomicDataSource, EconomicPoint, EconomicSeries};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;

use super::build_http_client;
use crate::error::{DataError, Result};

const PROVIDER: &str = "fred";

/// FRED API 클라이언트.
#[derive(Clone)]
pub struct FredClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FredClient {
    /// 새로운 클라이언트 생성.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: build_http_client(),
            base_url: "https://api.stlouisfed.org".to_string(),
            api_key: api_key.into(),
        }
    }

    /// base URL 재지정 (테스트용).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 시리즈 관측값 조회 (`/fred/series/observations`).
    pub async fn fetch_observations(
        &self,
        series_id: &str,
        limit: u32,
    ) -> Result<EconomicSeries> {
        #[derive(Deserialize)]
        struct RawObservations {
            observations: Vec<RawObservation>,
        }
        #[derive(Deserialize)]
        struct RawObservation {
            date: String,
            value: String,
        }

        let url = format!("{}/fred/series/observations", self.base_url);
        let query = [
            ("series_id", series_id.to_string()),
            ("api_key", self.api_key.clone()),
            ("file_type", "json".to_string()),
            ("sort_order", "desc".to_string()),
            ("limit", limit.to_string()),
        ];
        let response = self.client.get(&url).query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataError::ProviderError {
                provider: PROVIDER.to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let value: Value = response.json().await?;

        // FRED는 오류도 200이 아닌 4xx로 주지만 본문 형태를 한 번 더 확인
        if let Some(message) = value.get("error_message").and_then(Value::as_str) {
            return Err(DataError::ProviderError {
                provider: PROVIDER.to_string(),
                message: message.to_string(),
            });
        }

        let raw: RawObservations = serde_json::from_value(value)?;

        let mut points = Vec::with_capacity(raw.observations.len());
        for obs in raw.observations {
            // 관측값 없는 날
            if obs.value == "." {
                continue;
            }
            let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d").map_err(|e| {
                DataError::ParseError(format!("날짜 파싱 실패 {}: {}", obs.date, e))
            })?;
            let value = Decimal::from_str(&obs.value).map_err(|e| {
                DataError::ParseError(format!("관측값 파싱 실패 {}: {}", obs.value, e))
            })?;
            points.push(EconomicPoint { date, value });
        }

        if points.is_empty() {
            return Err(DataError::EmptyData(format!(
                "{} 관측값 없음",
                series_id
            )));
        }

        // desc로 조회했으므로 날짜 오름차순으로 뒤집기
        points.sort_by_key(|p| p.date);

        tracing::debug!(series_id = series_id, points = points.len(), "FRED 시리즈 조회 완료");
        Ok(EconomicSeries {
            series_id: series_id.to_string(),
            points,
            updated_at: Utc::now(),
        })
    }
}

#[async_trait]
impl EconomicDataSource for FredClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch_series(&self, series_id: &str, limit: u32) -> DashResult<EconomicSeries> {
        Ok(self.fetch_observations(series_id, limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_observations_skip_missing_values() {
        let mut server = mockito::Server::new_async().await;
        let body = r#"{
            "observations": [
                {"date": "2024-02-01", "value": "5.33"},
                {"date": "2024-01-15", "value": "."},
                {"date": "2024-01-01", "value": "5.25"}
            ]
        }"#;
        let _mock = server
            .mock("GET", "/fred/series/observations")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let series = FredClient::new("key")
            .with_base_url(server.url())
            .fetch_observations("FEDFUNDS", 120)
            .await
            .unwrap();

        assert_eq!(series.points.len(), 2);
        // 오름차순 정렬
        assert_eq!(series.points[0].value, dec!(5.25));
        assert_eq!(series.points[1].value, dec!(5.33));
    }

    #[tokio::test]
    async fn test_bad_api_key_is_provider_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/fred/series/observations")
            .match_query(mockito::Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error_code": 400, "error_message": "Bad Request. The value for variable api_key is not registered."}"#)
            .create_async()
            .await;

        let result = FredClient::new("bad")
            .with_base_url(server.url())
            .fetch_observations("FEDFUNDS", 10)
            .await;

        assert!(matches!(result, Err(DataError::ProviderError { .. })));
    }
}
