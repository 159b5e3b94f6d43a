//! 도메인 모델.

pub mod indicator;
pub mod market_data;
pub mod providers;
pub mod snapshot;

pub use indicator::*;
pub use market_data::*;
pub use providers::*;
pub use snapshot::*;
