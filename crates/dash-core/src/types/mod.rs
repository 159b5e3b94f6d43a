//! 기본 타입 정의.

pub mod asset;

pub use asset::{Asset, VsCurrency};
