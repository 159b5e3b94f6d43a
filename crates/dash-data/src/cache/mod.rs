//! 캐시 레이어.
//!
//! - `FreshnessCache` - TTL 준수/신선도 면제 두 가지 읽기 계약
//! - `SeriesStore` - append-only 일별 가격 시리즈의 증분 유지

pub mod freshness;
pub mod series;

pub use freshness::FreshnessCache;
pub use series::{incremental_gap, SeriesStore, MAX_SERIES_LEN};
