//! 업스트림 제공자 클라이언트.
//!
//! 제공자별로 하나의 타입화된 HTTP 클라이언트를 제공합니다. 각 클라이언트는
//! 제공자 고유 응답 형태를 공용 도메인 타입으로 번역하며, 예상 밖의 형태에는
//! 조용히 기본값을 채우는 대신 시끄럽게 실패합니다.
//!
//! 재시도와 캐싱은 여기서 하지 않습니다 — 오케스트레이터의 책임입니다.
//! 일부 제공자는 HTTP 200 본문 안에 오류 envelope을 내장하므로, 각
//! 클라이언트가 이를 감지해 타입화된 실패로 변환합니다.

pub mod alphavantage;
pub mod alternative_me;
pub mod coingecko;
pub mod cryptocompare;
pub mod finnhub;
pub mod fred;

use std::time::Duration;

pub use alphavantage::AlphaVantageClient;
pub use alternative_me::AlternativeMeClient;
pub use coingecko::CoinGeckoClient;
pub use cryptocompare::CryptoCompareClient;
pub use finnhub::FinnhubClient;
pub use fred::FredClient;

/// 업스트림 호출 공통 타임아웃. 멈춘 업스트림이 전체 갱신 주기를
/// 무한정 붙잡지 못하게 합니다.
pub(crate) const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// 공통 옵션이 적용된 HTTP 클라이언트 생성.
pub(crate) fn build_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent("coindash/0.1")
        .build()
        .expect("HTTP 클라이언트 생성 실패")
}
