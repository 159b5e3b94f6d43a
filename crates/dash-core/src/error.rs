//! coindash 백엔드의 에러 타입.
//!
//! 이 모듈은 캐시 갱신 파이프라인 전반에서 사용되는 에러 타입을 정의합니다.

use thiserror::Error;

/// 핵심 파이프라인 에러.
#[derive(Debug, Error)]
pub enum DashError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 업스트림 제공자 에러 (에러 응답, 잘못된 payload)
    #[error("제공자 에러 ({provider}): {message}")]
    Provider { provider: String, message: String },

    /// 요청 한도 초과
    #[error("요청 한도 초과 ({provider}): {message}")]
    RateLimit { provider: String, message: String },

    /// 네트워크 에러 (연결 실패, 타임아웃)
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 캐시 백엔드 에러
    #[error("캐시 에러: {0}")]
    Cache(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 빈 데이터 (조회 성공, 사용할 데이터 없음)
    #[error("데이터 없음: {0}")]
    EmptyData(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 파이프라인 작업을 위한 Result 타입.
pub type DashResult<T> = Result<T, DashError>;

impl DashError {
    /// 재시도 가능한 에러인지 확인합니다.
    ///
    /// 일시적인 제공자 장애는 다음 스케줄 주기에서 자연스럽게 재시도되며,
    /// 같은 주기 안에서는 fallback 체인의 다음 소스로 넘어갑니다.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DashError::Network(_) | DashError::RateLimit { .. } | DashError::Cache(_)
        )
    }

    /// fallback 체인의 다음 소스로 넘어가야 하는 에러인지 확인합니다.
    ///
    /// 설정 오류나 잘못된 입력은 어떤 소스를 시도해도 같은 결과이므로
    /// fallback 대상이 아닙니다.
    pub fn is_fallback_worthy(&self) -> bool {
        matches!(
            self,
            DashError::Network(_)
                | DashError::RateLimit { .. }
                | DashError::Provider { .. }
                | DashError::EmptyData(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(DashError::Network("timeout".into()).is_retryable());
        assert!(DashError::RateLimit {
            provider: "coingecko".into(),
            message: "429".into()
        }
        .is_retryable());
        assert!(!DashError::Config("missing key".into()).is_retryable());
        assert!(!DashError::InvalidInput("bad asset".into()).is_retryable());
    }

    #[test]
    fn test_fallback_classification() {
        assert!(DashError::Provider {
            provider: "alphavantage".into(),
            message: "error envelope".into()
        }
        .is_fallback_worthy());
        assert!(DashError::EmptyData("no prices".into()).is_fallback_worthy());
        assert!(!DashError::Config("missing key".into()).is_fallback_worthy());
    }
}
