//! 인메모리 cache 백엔드.
//!
//! 테스트와 Redis 없는 로컬 개발에서 사용합니다. TTL 만료는
//! 조회 시점에 lazy하게 적용됩니다.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::storage::CacheBackend;

struct MemoryEntry {
    value: String,
    /// `None`이면 만료 없음
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }
}

/// HashMap 기반 인메모리 캐시.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, MemoryEntry>>,
}

impl MemoryCache {
    /// 빈 캐시를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장된 (만료 포함) 항목 수.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// 캐시가 비어 있는지 확인합니다.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn put_raw(&self, key: &str, value: &str, ttl_secs: Option<u64>) -> Result<()> {
        let entry = MemoryEntry {
            value: value.to_string(),
            expires_at: ttl_secs.map(|ttl| Instant::now() + Duration::from_secs(ttl)),
        };
        self.entries.lock().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn forget(&self, key: &str) -> Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_forget() {
        let cache = MemoryCache::new();

        cache.put_raw("k", "v", None).await.unwrap();
        assert_eq!(cache.get_raw("k").await.unwrap(), Some("v".to_string()));

        cache.forget("k").await.unwrap();
        assert_eq!(cache.get_raw("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_zero_ttl_expires_immediately() {
        let cache = MemoryCache::new();

        cache.put_raw("k", "v", Some(0)).await.unwrap();
        assert_eq!(cache.get_raw("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_forever_entry_survives() {
        let cache = MemoryCache::new();

        cache.put_raw("k", "v", None).await.unwrap();
        // 만료 없는 항목은 계속 살아 있어야 한다
        assert!(cache.get_raw("k").await.unwrap().is_some());
    }
}
