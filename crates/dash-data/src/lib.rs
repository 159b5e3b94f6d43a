//! # Dash Data
//!
//! coindash 백엔드의 데이터 계층입니다:
//! - 업스트림 제공자 HTTP 클라이언트 (CoinGecko, CryptoCompare,
//!   Alpha Vantage, Alternative.me, Finnhub, FRED)
//! - 캐시 백엔드 추상화 (Redis, 인메모리)
//! - FreshnessCache - TTL 준수/신선도 면제 두 가지 읽기 계약
//! - SeriesStore - append-only 일별 가격 시리즈의 증분 유지

pub mod cache;
pub mod error;
pub mod provider;
pub mod storage;

pub use cache::{FreshnessCache, SeriesStore};
pub use error::{DataError, Result};
pub use storage::{CacheBackend, MemoryCache, RedisCache, RedisConfig};
