//! 환경변수 기반 설정 모듈.

use crate::error::CollectorError;
use crate::Result;
use dash_core::{Asset, VsCurrency};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Redis URL
    pub redis_url: String,
    /// 추적 대상 자산 (지표/시장 데이터 갱신 대상)
    pub tracked_assets: Vec<Asset>,
    /// 가격 표시 기준 통화
    pub vs_currency: VsCurrency,
    /// 지갑 보유 자산 (자산, 수량)
    pub wallet_holdings: Vec<(Asset, Decimal)>,
    /// 제공자 API 키
    pub providers: ProviderKeys,
    /// 갱신 동작 설정
    pub refresh: RefreshConfig,
    /// 데몬 모드 설정
    pub daemon: DaemonConfig,
}

/// 제공자 API 키 모음. 없는 키의 제공자는 해당 하위 작업에서
/// 설정 누락 실패로 보고됩니다.
#[derive(Debug, Clone, Default)]
pub struct ProviderKeys {
    /// CoinGecko demo API 키 (선택, 한도 완화)
    pub coingecko: Option<String>,
    /// Alpha Vantage API 키
    pub alphavantage: Option<String>,
    /// Finnhub API 토큰
    pub finnhub: Option<String>,
    /// FRED API 키
    pub fred: Option<String>,
    /// CryptoCompare API 키 (선택)
    pub cryptocompare: Option<String>,
}

/// 갱신 동작 설정
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// API 요청 간 딜레이 (밀리초)
    pub request_delay_ms: u64,
    /// 상위 코인 테이블 행 수
    pub top_coins_limit: u32,
    /// 뉴스 헤드라인 수
    pub news_limit: u32,
    /// 공포/탐욕 이력 길이 (일)
    pub fear_greed_history: u32,
    /// OHLC 캔들 조회 일수
    pub ohlc_days: u32,
    /// UI용 일별 차트 길이 (일)
    pub chart_days: usize,
    /// 시리즈 최초 백필 캔들 수
    pub backfill_limit: u32,
    /// 스냅샷 TTL (초)
    pub snapshot_ttl_secs: u64,
    /// RSI 기간
    pub rsi_period: usize,
    /// 조회할 FRED 시리즈 id 목록
    pub economic_series: Vec<String>,
    /// FRED 시리즈당 관측값 수
    pub economic_limit: u32,
}

/// 데몬 모드 설정
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// 워크플로우 실행 주기 (분 단위)
    pub interval_minutes: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://localhost:6379/0".to_string(),
            tracked_assets: vec![Asset::bitcoin(), Asset::ethereum()],
            vs_currency: VsCurrency::Usd,
            wallet_holdings: Vec::new(),
            providers: ProviderKeys::default(),
            refresh: RefreshConfig::default(),
            daemon: DaemonConfig {
                interval_minutes: 60,
            },
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: 1500,
            top_coins_limit: 50,
            news_limit: 30,
            fear_greed_history: 30,
            ohlc_days: 30,
            chart_days: 365,
            backfill_limit: 2000,
            snapshot_ttl_secs: 7200,
            rsi_period: 14,
            economic_series: vec![
                "FEDFUNDS".to_string(),
                "CPIAUCSL".to_string(),
                "UNRATE".to_string(),
            ],
            economic_limit: 120,
        }
    }
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let refresh_defaults = defaults.refresh;

        let tracked_assets = parse_assets(
            &std::env::var("TRACKED_ASSETS")
                .unwrap_or_else(|_| "bitcoin:BTC,ethereum:ETH".to_string()),
        )?;

        let vs_currency = match std::env::var("VS_CURRENCY") {
            Ok(raw) => raw.parse().map_err(CollectorError::Config)?,
            Err(_) => VsCurrency::Usd,
        };

        let wallet_holdings = match std::env::var("WALLET_HOLDINGS") {
            Ok(raw) if !raw.trim().is_empty() => parse_holdings(&raw, &tracked_assets)?,
            _ => Vec::new(),
        };

        Ok(Self {
            redis_url: std::env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            tracked_assets,
            vs_currency,
            wallet_holdings,
            providers: ProviderKeys {
                coingecko: std::env::var("COINGECKO_API_KEY").ok(),
                alphavantage: std::env::var("ALPHAVANTAGE_API_KEY").ok(),
                finnhub: std::env::var("FINNHUB_API_KEY").ok(),
                fred: std::env::var("FRED_API_KEY").ok(),
                cryptocompare: std::env::var("CRYPTOCOMPARE_API_KEY").ok(),
            },
            refresh: RefreshConfig {
                request_delay_ms: env_var_parse(
                    "REQUEST_DELAY_MS",
                    refresh_defaults.request_delay_ms,
                ),
                top_coins_limit: env_var_parse("TOP_COINS_LIMIT", refresh_defaults.top_coins_limit),
                news_limit: env_var_parse("NEWS_LIMIT", refresh_defaults.news_limit),
                fear_greed_history: env_var_parse(
                    "FEAR_GREED_HISTORY",
                    refresh_defaults.fear_greed_history,
                ),
                ohlc_days: env_var_parse("OHLC_DAYS", refresh_defaults.ohlc_days),
                chart_days: env_var_parse("CHART_DAYS", refresh_defaults.chart_days),
                backfill_limit: env_var_parse("BACKFILL_LIMIT", refresh_defaults.backfill_limit),
                snapshot_ttl_secs: env_var_parse(
                    "SNAPSHOT_TTL_SECS",
                    refresh_defaults.snapshot_ttl_secs,
                ),
                rsi_period: env_var_parse("RSI_PERIOD", refresh_defaults.rsi_period),
                economic_series: match std::env::var("ECONOMIC_SERIES") {
                    Ok(raw) => raw
                        .split(',')
                        .map(|s| s.trim().to_uppercase())
                        .filter(|s| !s.is_empty())
                        .collect(),
                    Err(_) => refresh_defaults.economic_series,
                },
                economic_limit: env_var_parse("ECONOMIC_LIMIT", refresh_defaults.economic_limit),
            },
            daemon: DaemonConfig {
                interval_minutes: env_var_parse("DAEMON_INTERVAL_MINUTES", 60),
            },
        })
    }

    /// 기준 통화가 붙은 자산의 시리즈/캐시 키 조각 (예: "btc_usd").
    pub fn asset_key(&self, asset: &Asset) -> String {
        format!("{}_{}", asset.key(), self.vs_currency)
    }
}

impl RefreshConfig {
    /// API 요청 간 딜레이를 Duration으로 반환
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl DaemonConfig {
    /// 워크플로우 실행 주기를 Duration으로 반환
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }
}

/// `"id:TICKER,id:TICKER"` 형식의 자산 목록 파싱.
fn parse_assets(raw: &str) -> Result<Vec<Asset>> {
    let assets: Vec<Asset> = raw
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.parse().map_err(CollectorError::Config))
        .collect::<Result<_>>()?;

    if assets.is_empty() {
        return Err(CollectorError::Config(
            "TRACKED_ASSETS가 비어 있습니다".to_string(),
        ));
    }
    Ok(assets)
}

/// `"TICKER:수량,TICKER:수량"` 형식의 보유 자산 파싱.
///
/// 추적 대상에 없는 티커는 계약 위반으로 즉시 실패합니다.
fn parse_holdings(raw: &str, assets: &[Asset]) -> Result<Vec<(Asset, Decimal)>> {
    let mut holdings = Vec::new();
    for entry in raw.split(',').filter(|s| !s.trim().is_empty()) {
        let (ticker, amount) = entry.split_once(':').ok_or_else(|| {
            CollectorError::Config(format!("잘못된 보유 자산 형식 (TICKER:수량 필요): {}", entry))
        })?;

        let ticker = ticker.trim().to_uppercase();
        let asset = assets
            .iter()
            .find(|a| a.ticker == ticker)
            .cloned()
            .ok_or_else(|| {
                CollectorError::Config(format!(
                    "보유 자산 {}이(가) TRACKED_ASSETS에 없습니다",
                    ticker
                ))
            })?;

        let amount = Decimal::from_str(amount.trim()).map_err(|e| {
            CollectorError::Config(format!("수량 파싱 실패 {}: {}", entry, e))
        })?;
        holdings.push((asset, amount));
    }
    Ok(holdings)
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_assets() {
        let assets = parse_assets("bitcoin:BTC, ethereum:ETH").unwrap();
        assert_eq!(assets.len(), 2);
        assert_eq!(assets[1].ticker, "ETH");

        assert!(parse_assets("").is_err());
        assert!(parse_assets("nocolon").is_err());
    }

    #[test]
    fn test_parse_holdings() {
        let assets = vec![Asset::bitcoin(), Asset::ethereum()];

        let holdings = parse_holdings("BTC:0.5,eth:2", &assets).unwrap();
        assert_eq!(holdings.len(), 2);
        assert_eq!(holdings[0].1, dec!(0.5));
        assert_eq!(holdings[1].0.ticker, "ETH");
    }

    #[test]
    fn test_unknown_holding_ticker_fails_fast() {
        let assets = vec![Asset::bitcoin()];

        let result = parse_holdings("DOGE:100", &assets);

        assert!(matches!(result, Err(CollectorError::Config(_))));
    }

    #[test]
    fn test_asset_key() {
        let config = CollectorConfig::default();
        assert_eq!(config.asset_key(&Asset::bitcoin()), "btc_usd");
    }
}
