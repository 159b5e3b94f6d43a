//! Standalone cache-refresh CLI.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dash_collector::runner::{run_all, run_domain, Domain, RunAllOptions};
use dash_collector::{CollectorConfig, CollectorContext};

#[derive(Parser)]
#[command(name = "dash-collector")]
#[command(about = "CoinDash Cache Refresh Collector", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 단일 도메인 갱신 (예: market, indicators)
    Sync {
        /// 갱신할 도메인
        #[arg(value_enum)]
        domain: Domain,

        /// 신선도 무시 강제 재계산
        #[arg(long)]
        force: bool,
    },

    /// 전체 도메인 갱신 (시장 → 지갑 → 시장 데이터 → 뉴스 → 지표 → 심리)
    RunAll {
        /// 건너뛸 도메인 (여러 번 지정 가능)
        #[arg(long, value_enum)]
        skip: Vec<Domain>,

        /// 신선도 무시 강제 재계산
        #[arg(long)]
        force: bool,
    },

    /// 데몬 모드: 주기적으로 전체 갱신 실행
    Daemon,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("dash_collector={}", cli.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("CoinDash Collector 시작");

    // 설정 로드 및 합성 루트 구성
    let config = CollectorConfig::from_env()?;
    tracing::debug!(
        assets = config.tracked_assets.len(),
        vs = %config.vs_currency,
        "설정 로드 완료"
    );

    let ctx = CollectorContext::from_config(config).await?;

    // 명령 실행
    match cli.command {
        Commands::Sync { domain, force } => {
            let report = run_domain(&ctx, domain, force).await;
            report.log_summary();
            if !report.succeeded() {
                std::process::exit(1);
            }
        }
        Commands::RunAll { skip, force } => {
            let options = RunAllOptions { skip, force };
            let report = run_all(&ctx, &options).await;
            println!("{}", report.render_table());
            let code = report.exit_code();
            if code != 0 {
                std::process::exit(code);
            }
        }
        Commands::Daemon => {
            tracing::info!(
                "=== 데몬 모드 시작 (주기: {}분) ===",
                ctx.config.daemon.interval_minutes
            );

            let mut interval = tokio::time::interval(ctx.config.daemon.interval());
            // 주기를 넘긴 실행이 있어도 겹쳐 돌지 않는다
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("종료 신호 수신, 데몬 종료 중...");
                        break;
                    }
                    _ = interval.tick() => {
                        tracing::info!("=== 전체 갱신 시작 ===");
                        let report = run_all(&ctx, &RunAllOptions::default()).await;
                        println!("{}", report.render_table());
                        tracing::info!(
                            "=== 전체 갱신 완료, 다음 실행: {}분 후 ===",
                            ctx.config.daemon.interval_minutes
                        );
                    }
                }
            }
        }
    }

    tracing::info!("CoinDash Collector 종료");

    Ok(())
}
