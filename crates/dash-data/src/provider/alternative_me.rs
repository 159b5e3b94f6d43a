//! Alternative.me 공포/탐욕 지수 클라이언트.
//!
//! 값이 전부 문자열로 인코딩된 특이한 응답 형태를 씁니다.
//! `metadata.error`가 null이 아니면 오류입니다.

use async_trait::async_trait;
use dash_core::{DashResult, FearGreedPoint, SentimentSource};
use serde::Deserialize;

use super::build_http_client;
use crate::error::{DataError, Result};

const PROVIDER: &str = "alternative.me";

/// Alternative.me API 클라이언트.
#[derive(Clone)]
pub struct AlternativeMeClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for AlternativeMeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AlternativeMeClient {
    /// 새로운 클라이언트 생성.
    pub fn new() -> Self {
        Self {
            client: build_http_client(),
            base_url: "https://api.alternative.me".to_string(),
        }
    }

    /// base URL 재지정 (테스트용).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 공포/탐욕 지수 조회 (`/fng/`). 최신순으로 반환됩니다.
    pub async fn fetch_index(&self, limit: u32) -> Result<Vec<FearGreedPoint>> {
        #[derive(Deserialize)]
        struct RawFng {
            data: Vec<RawPoint>,
            metadata: Option<RawMetadata>,
        }
        #[derive(Deserialize)]
        struct RawPoint {
            value: String,
            value_classification: String,
            timestamp: String,
        }
        #[derive(Deserialize)]
        struct RawMetadata {
            error: Option<String>,
        }

        let url = format!("{}/fng/", self.base_url);
        let query = [("limit", limit.to_string()), ("format", "json".to_string())];
        let response = self.client.get(&url).query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DataError::ProviderError {
                provider: PROVIDER.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        let raw: RawFng = response.json().await?;

        if let Some(error) = raw.metadata.and_then(|m| m.error) {
            return Err(DataError::ProviderError {
                provider: PROVIDER.to_string(),
                message: error,
            });
        }

        // 모든 숫자가 문자열로 옴
        let mut points = Vec::with_capacity(raw.data.len());
        for point in raw.data {
            let value: u8 = point.value.parse().map_err(|_| {
                DataError::ParseError(format!("잘못된 지수 값: {}", point.value))
            })?;
            let timestamp: i64 = point.timestamp.parse().map_err(|_| {
                DataError::ParseError(format!("잘못된 timestamp: {}", point.timestamp))
            })?;
            points.push(FearGreedPoint {
                timestamp,
                value,
                classification: point.value_classification,
            });
        }

        if points.is_empty() {
            return Err(DataError::EmptyData("공포/탐욕 응답 비어 있음".to_string()));
        }
        Ok(points)
    }
}

#[async_trait]
impl SentimentSource for AlternativeMeClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch_fear_greed(&self, limit: u32) -> DashResult<Vec<FearGreedPoint>> {
        Ok(self.fetch_index(limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_string_encoded_values_parse() {
        let mut server = mockito::Server::new_async().await;
        let body = r#"{
            "name": "Fear and Greed Index",
            "data": [
                {"value": "25", "value_classification": "Extreme Fear", "timestamp": "1704067200"},
                {"value": "31", "value_classification": "Fear", "timestamp": "1703980800"}
            ],
            "metadata": {"error": null}
        }"#;
        let _mock = server
            .mock("GET", "/fng/")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let points = AlternativeMeClient::new()
            .with_base_url(server.url())
            .fetch_index(2)
            .await
            .unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].value, 25);
        assert_eq!(points[0].classification, "Extreme Fear");
    }

    #[tokio::test]
    async fn test_metadata_error_surfaced() {
        let mut server = mockito::Server::new_async().await;
        let body = r#"{"name": "Fear and Greed Index", "data": [], "metadata": {"error": "service unavailable"}}"#;
        let _mock = server
            .mock("GET", "/fng/")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let result = AlternativeMeClient::new()
            .with_base_url(server.url())
            .fetch_index(1)
            .await;

        assert!(matches!(result, Err(DataError::ProviderError { .. })));
    }
}
