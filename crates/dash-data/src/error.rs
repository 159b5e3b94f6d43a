//! 데이터 모듈 오류 타입.

use dash_core::DashError;
use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 캐시 백엔드 오류
    #[error("Cache error: {0}")]
    CacheError(String),

    /// 직렬화/역직렬화 오류
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// 네트워크 오류 (연결 실패, 타임아웃)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// 제공자 오류 응답 (non-2xx, 또는 200 본문에 내장된 오류 envelope)
    #[error("Provider error ({provider}): {message}")]
    ProviderError { provider: String, message: String },

    /// 제공자 요청 한도 초과
    #[error("Rate limited ({provider}): {message}")]
    RateLimited { provider: String, message: String },

    /// 파싱 오류 (예상 밖의 응답 형태)
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 빈 payload (조회 성공, 사용할 데이터 없음)
    #[error("Empty payload: {0}")]
    EmptyData(String),

    /// 설정 오류
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<redis::RedisError> for DataError {
    fn from(err: redis::RedisError) -> Self {
        DataError::CacheError(err.to_string())
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        DataError::NetworkError(err.to_string())
    }
}

impl From<DataError> for DashError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::CacheError(m) => DashError::Cache(m),
            DataError::SerializationError(m) => DashError::Serialization(m),
            DataError::NetworkError(m) => DashError::Network(m),
            DataError::ProviderError { provider, message } => {
                DashError::Provider { provider, message }
            }
            DataError::RateLimited { provider, message } => {
                DashError::RateLimit { provider, message }
            }
            DataError::ParseError(m) => DashError::Serialization(m),
            DataError::EmptyData(m) => DashError::EmptyData(m),
            DataError::ConfigError(m) => DashError::Config(m),
        }
    }
}

/// Result 타입 별칭.
pub type Result<T> = std::result::Result<T, DataError>;
