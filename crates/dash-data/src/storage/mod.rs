//! 캐시 백엔드 추상화.
//!
//! FreshnessCache와 SeriesStore가 바라보는 key→JSON 문자열 저장소
//! 인터페이스입니다. 운영에서는 Redis, 테스트/로컬 개발에서는
//! 인메모리 구현을 사용합니다.

pub mod memory;
pub mod redis;

use async_trait::async_trait;

use crate::error::Result;

pub use memory::MemoryCache;
pub use redis::{RedisCache, RedisConfig};

/// key→JSON 문자열 캐시 저장소.
///
/// TTL이 `None`이면 만료 없이 저장됩니다 ("forever" 계층).
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// 키의 값을 조회합니다. 없거나 만료되었으면 `None`.
    async fn get_raw(&self, key: &str) -> Result<Option<String>>;

    /// 값을 저장합니다. `ttl_secs`가 `None`이면 만료 없음.
    async fn put_raw(&self, key: &str, value: &str, ttl_secs: Option<u64>) -> Result<()>;

    /// 키를 삭제합니다. 없는 키는 무시합니다.
    async fn forget(&self, key: &str) -> Result<()>;
}
