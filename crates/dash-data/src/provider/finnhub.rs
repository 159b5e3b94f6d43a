//! Finnhub API 클라이언트.
//!
//! 암호화폐 뉴스 헤드라인의 주 소스입니다.

use async_trait::async_trait;
use chrono::DateTime;
use dash_core::{DashResult, NewsItem, NewsSource};
use serde::Deserialize;

use super::build_http_client;
use crate::error::{DataError, Result};

const PROVIDER: &str = "finnhub";

/// Finnhub API 클라이언트.
#[derive(Clone)]
pub struct FinnhubClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl FinnhubClient {
    /// 새로운 클라이언트 생성.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: build_http_client(),
            base_url: "https://finnhub.io/api/v1".to_string(),
            token: token.into(),
        }
    }

    /// base URL 재지정 (테스트용).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 암호화폐 카테고리 뉴스 조회 (`/news?category=crypto`).
    pub async fn fetch_news(&self, limit: u32) -> Result<Vec<NewsItem>> {
        #[derive(Deserialize)]
        struct RawArticle {
            headline: String,
            url: String,
            source: String,
            summary: Option<String>,
            image: Option<String>,
            datetime: i64,
        }

        let url = format!("{}/news", self.base_url);
        let query = [
            ("category", "crypto".to_string()),
            ("token", self.token.clone()),
        ];
        let response = self.client.get(&url).query(&query).send().await?;
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

        let raw: Vec<RawArticle> = response.json().await?;

        let items: Vec<NewsItem> = raw
            .into_iter()
            .take(limit as usize)
            .filter_map(|article| {
                let published_at = DateTime::from_timestamp(article.datetime, 0)?;
                Some(NewsItem {
                    title: article.headline,
                    url: article.url,
                    source: article.source,
                    summary: article.summary.filter(|s| !s.is_empty()),
                    image_url: article.image.filter(|s| !s.is_empty()),
                    published_at,
                })
            })
            .collect();

        if items.is_empty() {
            return Err(DataError::EmptyData("뉴스 응답 비어 있음".to_string()));
        }

        tracing::debug!(count = items.len(), "뉴스 조회 완료");
        Ok(items)
    }
}

#[async_trait]
impl NewsSource for FinnhubClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch_crypto_news(&self, limit: u32) -> DashResult<Vec<NewsItem>> {
        Ok(self.fetch_news(limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_news_parses_and_limits() {
        let mut server = mockito::Server::new_async().await;
        let body = r#"[
            {"headline": "BTC rallies", "url": "https://example.com/1", "source": "CoinDesk",
             "summary": "Bitcoin is up.", "image": "", "datetime": 1704067200},
            {"headline": "ETH upgrade", "url": "https://example.com/2", "source": "The Block",
             "summary": "", "image": "https://example.com/img.png", "datetime": 1704063600},
            {"headline": "Third story", "url": "https://example.com/3", "source": "Reuters",
             "summary": null, "image": null, "datetime": 1704060000}
        ]"#;
        let _mock = server
            .mock("GET", "/news")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let items = FinnhubClient::new("token")
            .with_base_url(server.url())
            .fetch_news(2)
            .await
            .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "BTC rallies");
        // 빈 문자열 필드는 None으로 정규화
        assert!(items[0].image_url.is_none());
        assert!(items[1].summary.is_none());
    }

    #[tokio::test]
    async fn test_unauthorized_is_provider_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/news")
            .match_query(mockito::Matcher::Any)
            .with_status(401)
            .with_body(r#"{"error": "Invalid API key"}"#)
            .create_async()
            .await;

        let result = FinnhubClient::new("bad-token")
            .with_base_url(server.url())
            .fetch_news(10)
            .await;

        assert!(matches!(result, Err(DataError::ProviderError { .. })));
    }
}
