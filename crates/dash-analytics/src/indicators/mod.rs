//! 기술적 지표 모듈.
//!
//! 대시보드 파생 캐시에 쓰이는 지표 계산을 제공합니다.
//!
//! # 지원 지표
//!
//! ## 추세 지표 (Trend Indicators)
//! - **SMA**: 단순 이동평균 (Simple Moving Average)
//! - **EMA**: 지수 이동평균 (Exponential Moving Average)
//!
//! ## 모멘텀 지표 (Momentum Indicators)
//! - **RSI**: 상대강도지수 (Wilder smoothing)
//!
//! ## 장기 신호 (Long-term Signals)
//! - **Crossover**: 단기선이 배수 적용 장기선을 상향 돌파하는 지점
//!   (111일/350일×2 구성이 Pi Cycle Top)
//!
//! # 사용 예시
//!
//! ```ignore
//! use dash_analytics::indicators::{IndicatorEngine, RsiParams, SmaParams};
//!
//! let engine = IndicatorEngine::new();
//! let sma = engine.sma(&closes, SmaParams { period: 111 })?;
//! let rsi = engine.rsi(&closes, RsiParams::default())?;
//! ```

pub mod crossover;
pub mod momentum;
pub mod trend;

use dash_core::{IndicatorFrame, PricePoint, RsiPoint};
use rust_decimal::Decimal;
use thiserror::Error;

pub use crossover::{CrossoverCalculator, CrossoverParams};
pub use momentum::{MomentumCalculator, RsiParams};
pub use trend::{EmaParams, SmaParams, TrendIndicators};

/// 지표 계산 오류.
#[derive(Debug, Error)]
pub enum IndicatorError {
    /// 데이터 부족 오류
    #[error("데이터가 부족합니다: 필요 {required}개, 제공 {provided}개")]
    InsufficientData { required: usize, provided: usize },

    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),

    /// 계산 오류
    #[error("계산 오류: {0}")]
    CalculationError(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

impl From<IndicatorError> for dash_core::DashError {
    fn from(err: IndicatorError) -> Self {
        match err {
            IndicatorError::InsufficientData { .. } => {
                dash_core::DashError::EmptyData(err.to_string())
            }
            IndicatorError::InvalidParameter(m) => dash_core::DashError::InvalidInput(m),
            IndicatorError::CalculationError(m) => dash_core::DashError::Internal(m),
        }
    }
}

/// 통합 지표 엔진.
///
/// 모든 지표 계산을 위한 통합 인터페이스를 제공합니다.
#[derive(Debug, Default)]
pub struct IndicatorEngine {
    trend: TrendIndicators,
    momentum: MomentumCalculator,
    crossover: CrossoverCalculator,
}

impl IndicatorEngine {
    /// 새로운 지표 엔진 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 단순 이동평균 (SMA) 계산.
    ///
    /// 처음 period-1개 값은 `None`입니다.
    pub fn sma(
        &self,
        prices: &[Decimal],
        params: SmaParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        self.trend.sma(prices, params)
    }

    /// 특정 인덱스에서 끝나는 윈도우의 SMA.
    pub fn sma_at(&self, prices: &[Decimal], index: usize, period: usize) -> Option<Decimal> {
        self.trend.sma_at(prices, index, period)
    }

    /// 지수 이동평균 (EMA) 계산.
    pub fn ema(
        &self,
        prices: &[Decimal],
        params: EmaParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        self.trend.ema(prices, params)
    }

    /// RSI (Relative Strength Index) 계산.
    pub fn rsi(
        &self,
        closes: &[Decimal],
        params: RsiParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        self.momentum.rsi(closes, params)
    }

    /// 날짜가 붙은 RSI 시리즈 계산.
    pub fn rsi_points(
        &self,
        series: &[PricePoint],
        params: RsiParams,
    ) -> IndicatorResult<Vec<RsiPoint>> {
        self.momentum.rsi_points(series, params)
    }

    /// 장기 crossover 시리즈 계산 (Pi Cycle Top 일반형).
    pub fn crossover_series(
        &self,
        series: &[PricePoint],
        params: CrossoverParams,
    ) -> IndicatorResult<Vec<IndicatorFrame>> {
        self.crossover.crossover_series(series, params)
    }
}
