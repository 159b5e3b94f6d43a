//! append-only 일별 가격 시리즈 저장소.
//!
//! 자산별 과거 가격 시리즈를 증분 조회에 유리한 형태로 유지합니다.
//!
//! # 동작 흐름
//!
//! ```text
//! 갱신 주기 시작
//!         │
//!         ▼
//! ┌────────────────────┐
//! │ last_date 조회      │ ← 저장된 시리즈의 마지막 날짜
//! └─────────┬──────────┘
//!           │
//!     ┌─────┴──────┐
//!     │ 시리즈 있음? │
//!     └─────┬──────┘
//!       YES │ NO
//!           │   │
//!           ▼   ▼
//!   갭+버퍼만 조회   전체 백필 (깊은 이력 소스)
//!           │   │
//!           └─┬─┘
//!             ▼
//! ┌────────────────────┐
//! │ merge: 중복 제거,   │
//! │ 정렬, 길이 상한,    │
//! │ 만료 없이 저장      │
//! └────────────────────┘
//! ```
//!
//! 확정된 과거 가격은 변하지 않으므로 시리즈는 만료 없는 "forever"
//! 계층에 저장됩니다. 파생 지표 캐시는 별도로 만료됩니다.

use chrono::NaiveDate;
use dash_core::{DashResult, PricePoint, PriceSeries};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::DataError;
use crate::storage::CacheBackend;

/// 시리즈당 최대 보존 길이. 초과분은 가장 오래된 점부터 버립니다.
pub const MAX_SERIES_LEN: usize = 2000;

/// 증분 조회 시 갭에 더하는 안전 버퍼 (일).
pub const GAP_BUFFER_DAYS: i64 = 2;

/// 증분 조회에 필요한 일수를 계산합니다.
///
/// 저장된 시리즈가 없으면 `None`을 반환하며, 호출자는 전체 백필을
/// 수행해야 합니다. 있으면 마지막 날짜부터 오늘까지의 갭에 안전
/// 버퍼를 더한 일수를 반환합니다.
pub fn incremental_gap(last_date: Option<NaiveDate>, today: NaiveDate) -> Option<u32> {
    let last = last_date?;
    let gap = (today - last).num_days().max(0) + GAP_BUFFER_DAYS;
    Some(gap as u32)
}

/// 날짜별 중복 제거 + 정렬 + 길이 상한 적용.
///
/// 계약: 같은 날짜에서는 기존 점이 이기고(새 중복 점은 폐기),
/// 결과는 timestamp 오름차순이며, 상한 초과 시 가장 오래된 점부터
/// 버립니다. 순수 함수라 property 테스트가 쉽습니다.
fn merge_points(
    existing: Vec<PricePoint>,
    incoming: Vec<PricePoint>,
    cap: usize,
) -> Vec<PricePoint> {
    let mut by_date: BTreeMap<NaiveDate, PricePoint> = BTreeMap::new();

    // 새 점을 먼저 넣고 기존 점으로 덮어써서 "기존 날짜가 이긴다"를 구현
    for point in incoming {
        by_date.insert(point.date, point);
    }
    for point in existing {
        by_date.insert(point.date, point);
    }

    let mut merged: Vec<PricePoint> = by_date.into_values().collect();
    merged.sort_by_key(|p| p.timestamp);

    if merged.len() > cap {
        let excess = merged.len() - cap;
        merged.drain(0..excess);
    }

    merged
}

/// 자산별 일별 가격 시리즈 저장소.
#[derive(Clone)]
pub struct SeriesStore {
    backend: Arc<dyn CacheBackend>,
}

impl SeriesStore {
    /// 백엔드 위에 저장소를 생성합니다.
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self { backend }
    }

    /// 자산 키의 시리즈 캐시 키.
    pub fn series_key(asset_key: &str) -> String {
        format!("price_series_{}", asset_key)
    }

    /// 저장된 시리즈를 조회합니다.
    pub async fn get(&self, asset_key: &str) -> DashResult<Option<PriceSeries>> {
        let key = Self::series_key(asset_key);
        match self.backend.get_raw(&key).await? {
            Some(raw) => {
                let series: PriceSeries =
                    serde_json::from_str(&raw).map_err(DataError::from)?;
                Ok(Some(series))
            }
            None => Ok(None),
        }
    }

    /// 저장된 시리즈의 마지막 날짜.
    ///
    /// 증분 조회 범위 결정에 사용됩니다. 시리즈가 없으면 `None`이며,
    /// 호출자는 전체 백필로 전환해야 합니다.
    pub async fn last_date(&self, asset_key: &str) -> DashResult<Option<NaiveDate>> {
        Ok(self.get(asset_key).await?.and_then(|s| s.last_date()))
    }

    /// 새 가격 점들을 시리즈에 병합하고 저장합니다.
    ///
    /// 날짜 기준 중복 제거(기존 날짜가 이김), timestamp 오름차순 정렬,
    /// [`MAX_SERIES_LEN`] 상한 적용 후 만료 없이 저장합니다.
    ///
    /// 새 점이 비어 있고 저장된 시리즈가 이미 있으면 아무것도 바꾸지
    /// 않고 저장된 시리즈를 그대로 반환합니다. 일시적 제공자 장애가
    /// 이력을 지우는 일은 없어야 합니다.
    pub async fn merge(
        &self,
        asset_key: &str,
        new_points: Vec<PricePoint>,
    ) -> DashResult<PriceSeries> {
        let existing = self.get(asset_key).await?;

        if new_points.is_empty() {
            if let Some(series) = existing {
                warn!(
                    asset_key = asset_key,
                    stored = series.len(),
                    "새 가격 점 없음, 저장된 시리즈 유지"
                );
                return Ok(series);
            }
        }

        let existing_points = existing.map(|s| s.points).unwrap_or_default();
        let before = existing_points.len();
        let merged = merge_points(existing_points, new_points, MAX_SERIES_LEN);

        let series = PriceSeries {
            asset_key: asset_key.to_string(),
            points: merged,
        };

        let key = Self::series_key(asset_key);
        let raw = serde_json::to_string(&series).map_err(DataError::from)?;
        self.backend.put_raw(&key, &raw, None).await?;

        debug!(
            asset_key = asset_key,
            before = before,
            after = series.len(),
            "시리즈 병합 완료"
        );

        Ok(series)
    }
}
