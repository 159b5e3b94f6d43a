//! 신선도 계약이 있는 key-value 캐시.
//!
//! 기반 캐시 백엔드를 감싸며 두 가지 읽기 계약을 제공합니다:
//!
//! - `get_or_compute`: 일반 memoization. 없거나 만료되면 다시 계산해
//!   TTL과 함께 저장합니다. 계산 실패는 그대로 전파됩니다.
//! - `get_or_compute_never_stale`: 값이 있으면 나이에 관계없이 즉시
//!   반환하고 계산을 호출하지 않습니다. 신선도는 이 읽기 경로가 아니라
//!   외부 갱신 작업이 관리합니다. 제공자 장애로 UI 데이터셋이 비어버리는
//!   것보다 오래된 값이 낫기 때문입니다.
//!
//! 파생 캐시를 기록할 때는 `<key>_meta` 동반 항목에 `{timestamp, source}`를
//! 함께 남겨 화면에 마지막 갱신 시각을 노출할 수 있게 합니다.

use dash_core::{CacheMeta, DashResult};
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use crate::error::DataError;
use crate::storage::CacheBackend;

/// 신선도 계약 캐시.
#[derive(Clone)]
pub struct FreshnessCache {
    backend: Arc<dyn CacheBackend>,
}

impl FreshnessCache {
    /// 백엔드 위에 캐시를 생성합니다.
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self { backend }
    }

    /// 키의 `_meta` 동반 키.
    pub fn meta_key(key: &str) -> String {
        format!("{}_meta", key)
    }

    /// 키의 값을 조회합니다. 없거나 만료되었으면 `None`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> DashResult<Option<T>> {
        match self.backend.get_raw(key).await? {
            Some(raw) => {
                let value = serde_json::from_str(&raw).map_err(DataError::from)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// 값을 TTL과 함께 저장합니다.
    pub async fn put<T: Serialize>(&self, key: &str, value: &T, ttl_secs: u64) -> DashResult<()> {
        let raw = serde_json::to_string(value).map_err(DataError::from)?;
        self.backend.put_raw(key, &raw, Some(ttl_secs)).await?;
        Ok(())
    }

    /// 값을 만료 없이 저장합니다.
    pub async fn put_forever<T: Serialize>(&self, key: &str, value: &T) -> DashResult<()> {
        let raw = serde_json::to_string(value).map_err(DataError::from)?;
        self.backend.put_raw(key, &raw, None).await?;
        Ok(())
    }

    /// 키를 삭제합니다 (동반 `_meta` 포함).
    pub async fn forget(&self, key: &str) -> DashResult<()> {
        self.backend.forget(key).await?;
        self.backend.forget(&Self::meta_key(key)).await?;
        Ok(())
    }

    /// 값을 TTL과 함께 저장하고 `_meta` 동반 항목을 남깁니다.
    pub async fn put_with_meta<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_secs: u64,
        source: &str,
    ) -> DashResult<()> {
        self.put(key, value, ttl_secs).await?;
        // meta는 값보다 오래 남아 staleness 표시에 쓰이므로 만료 없이 저장
        self.put_forever(&Self::meta_key(key), &CacheMeta::now(source))
            .await
    }

    /// 값을 만료 없이 저장하고 `_meta` 동반 항목을 남깁니다.
    pub async fn put_forever_with_meta<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        source: &str,
    ) -> DashResult<()> {
        self.put_forever(key, value).await?;
        self.put_forever(&Self::meta_key(key), &CacheMeta::now(source))
            .await
    }

    /// 일반 memoized 읽기.
    ///
    /// 키가 없거나 만료되었으면 `compute`를 호출해 결과를 TTL과 함께
    /// 저장하고 반환합니다. `compute`가 실패하면 아무것도 저장하지 않고
    /// 에러를 전파합니다.
    pub async fn get_or_compute<T, F, Fut>(
        &self,
        key: &str,
        ttl_secs: u64,
        compute: F,
    ) -> DashResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = DashResult<T>>,
    {
        if let Some(value) = self.get(key).await? {
            debug!(key = key, "cache hit");
            return Ok(value);
        }

        let value = compute().await?;
        self.put(key, &value, ttl_secs).await?;
        Ok(value)
    }

    /// 신선도 면제 읽기.
    ///
    /// 값이 있으면 아무리 오래되었어도 즉시 반환하며 `compute`를
    /// 호출하지 않습니다. 없을 때만 계산해 만료 없이 저장합니다.
    pub async fn get_or_compute_never_stale<T, F, Fut>(&self, key: &str, compute: F) -> DashResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = DashResult<T>>,
    {
        if let Some(value) = self.get(key).await? {
            debug!(key = key, "cache hit (never-stale)");
            return Ok(value);
        }

        let value = compute().await?;
        self.put_forever(key, &value).await?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryCache;
    use dash_core::DashError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cache() -> FreshnessCache {
        FreshnessCache::new(Arc::new(MemoryCache::new()))
    }

    #[tokio::test]
    async fn test_get_or_compute_memoizes() {
        let cache = cache();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: u32 = cache
                .get_or_compute("answer", 3600, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .await
                .unwrap();
            assert_eq!(value, 42);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_or_compute_recomputes_after_ttl() {
        let cache = cache();
        let calls = AtomicUsize::new(0);

        // TTL 0 → 즉시 만료 → 매 호출마다 재계산
        for _ in 0..2 {
            let _: u32 = cache
                .get_or_compute("volatile", 0, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_get_or_compute_propagates_error() {
        let cache = cache();

        let result: DashResult<u32> = cache
            .get_or_compute("broken", 60, || async {
                Err(DashError::Network("timeout".into()))
            })
            .await;

        assert!(result.is_err());
        // 실패 시 아무것도 저장되지 않아야 한다
        let stored: Option<u32> = cache.get("broken").await.unwrap();
        assert!(stored.is_none());
    }

    #[tokio::test]
    async fn test_never_stale_skips_compute_for_existing_value() {
        let cache = cache();
        let calls = AtomicUsize::new(0);

        // 외부 갱신 작업이 한참 전에 남겨둔 값이라고 가정
        cache.put_forever("season", &55u32).await.unwrap();

        let value: u32 = cache
            .get_or_compute_never_stale("season", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(99)
            })
            .await
            .unwrap();

        assert_eq!(value, 55);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_never_stale_computes_when_absent() {
        let cache = cache();

        let value: u32 = cache
            .get_or_compute_never_stale("fresh", || async { Ok(11) })
            .await
            .unwrap();
        assert_eq!(value, 11);

        // 이후에는 저장된 값이 이긴다
        let value: u32 = cache
            .get_or_compute_never_stale("fresh", || async { Ok(22) })
            .await
            .unwrap();
        assert_eq!(value, 11);
    }

    #[tokio::test]
    async fn test_put_with_meta_writes_companion() {
        let cache = cache();

        cache
            .put_with_meta("snapshot", &1u32, 600, "coingecko")
            .await
            .unwrap();

        let meta: Option<CacheMeta> = cache.get(&FreshnessCache::meta_key("snapshot")).await.unwrap();
        let meta = meta.expect("meta companion must exist");
        assert_eq!(meta.source, "coingecko");
    }

    #[tokio::test]
    async fn test_forget_removes_value_and_meta() {
        let cache = cache();

        cache
            .put_forever_with_meta("gone", &1u32, "coingecko")
            .await
            .unwrap();
        cache.forget("gone").await.unwrap();

        let value: Option<u32> = cache.get("gone").await.unwrap();
        let meta: Option<CacheMeta> = cache.get(&FreshnessCache::meta_key("gone")).await.unwrap();
        assert!(value.is_none());
        assert!(meta.is_none());
    }
}
