//! 자산 및 기준 통화 정의.
//!
//! 이 모듈은 추적 대상 자산 관련 타입을 정의합니다:
//! - `Asset` - 제공자 canonical id와 티커로 식별되는 암호화폐 자산
//! - `VsCurrency` - 가격 표시 기준 법정/기축 통화

use serde::{Deserialize, Serialize};
use std::fmt;

/// 추적 대상 암호화폐 자산.
///
/// `id`는 제공자 API 호출에 쓰이는 canonical 식별자(예: "bitcoin"),
/// `ticker`는 화면/캐시 키에 쓰이는 짧은 심볼(예: "BTC")입니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    /// 제공자 canonical id (예: bitcoin, ethereum)
    pub id: String,
    /// 티커 심볼 (예: BTC, ETH)
    pub ticker: String,
}

impl Asset {
    /// 새 자산을 생성합니다.
    pub fn new(id: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            id: id.into().to_lowercase(),
            ticker: ticker.into().to_uppercase(),
        }
    }

    /// 비트코인.
    pub fn bitcoin() -> Self {
        Self::new("bitcoin", "BTC")
    }

    /// 이더리움.
    pub fn ethereum() -> Self {
        Self::new("ethereum", "ETH")
    }

    /// 캐시 키 조각으로 쓰이는 소문자 티커.
    pub fn key(&self) -> String {
        self.ticker.to_lowercase()
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.ticker, self.id)
    }
}

impl std::str::FromStr for Asset {
    type Err = String;

    /// `"id:TICKER"` 형식 파싱 (예: "bitcoin:BTC").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((id, ticker)) if !id.trim().is_empty() && !ticker.trim().is_empty() => {
                Ok(Self::new(id.trim(), ticker.trim()))
            }
            _ => Err(format!("잘못된 자산 형식 (id:TICKER 필요): {}", s)),
        }
    }
}

/// 가격 표시 기준 통화.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VsCurrency {
    /// 미국 달러
    #[default]
    Usd,
    /// 유로
    Eur,
    /// 대한민국 원
    Krw,
}

impl VsCurrency {
    /// 제공자 API 파라미터 및 캐시 키에 쓰이는 소문자 코드.
    pub fn as_str(&self) -> &'static str {
        match self {
            VsCurrency::Usd => "usd",
            VsCurrency::Eur => "eur",
            VsCurrency::Krw => "krw",
        }
    }
}

impl fmt::Display for VsCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for VsCurrency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "usd" => Ok(Self::Usd),
            "eur" => Ok(Self::Eur),
            "krw" => Ok(Self::Krw),
            _ => Err(format!("지원하지 않는 기준 통화: {}", s)),
        }
    }
}
