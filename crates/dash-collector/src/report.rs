//! 실행 결과 리포트 구조체.
//!
//! 한 번의 스케줄 실행 동안만 존재하는 임시 구조체들입니다.
//! 로그 싱크와 운영자용 테이블로만 노출되고 저장되지는 않습니다.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};
use tabled::{settings::Style, Table, Tabled};

use dash_core::DashResult;

/// 하위 작업 하나의 실행 결과
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// 하위 작업 이름 (예: "Pi Cycle")
    pub name: String,
    /// 성공 여부
    pub success: bool,
    /// 소요 시간
    #[serde(skip)]
    pub duration: Duration,
    /// 성공 시 사람이 읽는 요약 (건수, 주요 값)
    pub detail: String,
    /// 실패 시 에러 메시지
    pub error: Option<String>,
}

/// 도메인 하나의 실행 리포트
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    /// 도메인 이름 (예: "indicators")
    pub domain: String,
    /// 하위 작업별 결과
    pub results: Vec<RunResult>,
    /// 전체 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl RunReport {
    /// 새 리포트 생성
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            ..Default::default()
        }
    }

    /// 하위 작업 결과 추가
    pub fn push(&mut self, result: RunResult) {
        self.results.push(result);
    }

    /// 성공한 하위 작업 수
    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    /// 실패한 하위 작업 수
    pub fn failure_count(&self) -> usize {
        self.results.len() - self.success_count()
    }

    /// 도메인 전체 성공 여부.
    ///
    /// 도메인은 best-effort라서 하위 작업이 하나라도 성공하면 성공으로
    /// 칩니다. 전부 실패했을 때만 도메인 실패입니다.
    pub fn succeeded(&self) -> bool {
        self.results.iter().any(|r| r.success)
    }

    /// 리포트 요약 로그 출력
    pub fn log_summary(&self) {
        tracing::info!(
            domain = %self.domain,
            total = self.results.len(),
            success = self.success_count(),
            failed = self.failure_count(),
            succeeded = self.succeeded(),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "도메인 갱신 완료"
        );

        for result in self.results.iter().filter(|r| !r.success) {
            tracing::warn!(
                domain = %self.domain,
                subtask = %result.name,
                error = result.error.as_deref().unwrap_or("unknown"),
                "하위 작업 실패"
            );
        }
    }
}

/// 전체 명령 실행 리포트
#[derive(Debug, Clone, Default)]
pub struct CommandReport {
    /// 도메인별 리포트 (실행 순서대로)
    pub reports: Vec<RunReport>,
    /// 전체 소요 시간
    pub elapsed: Duration,
}

#[derive(Tabled)]
struct DomainRow {
    #[tabled(rename = "domain")]
    domain: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "subtasks")]
    subtasks: String,
    #[tabled(rename = "elapsed")]
    elapsed: String,
    #[tabled(rename = "failures")]
    failures: String,
}

impl CommandReport {
    /// 모든 도메인이 최소 한 건 이상 기여했는지 여부
    pub fn all_domains_contributed(&self) -> bool {
        self.reports.iter().all(|r| r.succeeded())
    }

    /// 프로세스 종료 코드.
    ///
    /// 어느 한 도메인이라도 전체 실패했으면 1, 아니면 0.
    pub fn exit_code(&self) -> i32 {
        if self.all_domains_contributed() {
            0
        } else {
            1
        }
    }

    /// 운영자용 요약 테이블 렌더링
    pub fn render_table(&self) -> String {
        let rows: Vec<DomainRow> = self
            .reports
            .iter()
            .map(|report| DomainRow {
                domain: report.domain.clone(),
                status: if report.succeeded() { "OK" } else { "FAILED" }.to_string(),
                subtasks: format!("{}/{}", report.success_count(), report.results.len()),
                elapsed: format!("{:.1}s", report.elapsed.as_secs_f64()),
                failures: report
                    .results
                    .iter()
                    .filter(|r| !r.success)
                    .map(|r| r.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
            .collect();

        Table::new(rows).with(Style::sharp()).to_string()
    }

    /// 전체 요약 로그 출력
    pub fn log_summary(&self) {
        tracing::info!(
            domains = self.reports.len(),
            failed_domains = self.reports.iter().filter(|r| !r.succeeded()).count(),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "전체 갱신 완료"
        );
    }
}

/// 하위 작업 실행 래퍼.
///
/// 소요 시간을 재고 결과를 [`RunResult`]로 포착합니다. 실패해도
/// 에러를 전파하지 않으므로 호출자는 다음 하위 작업을 계속 실행할 수
/// 있습니다. 하위 작업 간 독립성이 핵심 요구사항입니다 — 제공자 하나의
/// 장애가 무관한 지표를 막으면 안 됩니다.
pub async fn run_subtask<F, Fut>(name: &str, task: F) -> RunResult
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = DashResult<String>>,
{
    let (result, _) = run_subtask_with(name, move || async move {
        let detail = task().await?;
        Ok((detail, ()))
    })
    .await;
    result
}

/// 값을 함께 반환하는 하위 작업 실행 래퍼.
///
/// 여러 하위 작업의 결과를 모아 스냅샷을 조립할 때 사용합니다.
pub async fn run_subtask_with<T, F, Fut>(name: &str, task: F) -> (RunResult, Option<T>)
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = DashResult<(String, T)>>,
{
    let start = Instant::now();
    tracing::debug!(subtask = name, "하위 작업 시작");

    match task().await {
        Ok((detail, value)) => {
            let duration = start.elapsed();
            tracing::info!(
                subtask = name,
                detail = %detail,
                elapsed = format!("{:.1}s", duration.as_secs_f64()),
                "하위 작업 성공"
            );
            (
                RunResult {
                    name: name.to_string(),
                    success: true,
                    duration,
                    detail,
                    error: None,
                },
                Some(value),
            )
        }
        Err(e) => {
            let duration = start.elapsed();
            tracing::warn!(
                subtask = name,
                error = %e,
                elapsed = format!("{:.1}s", duration.as_secs_f64()),
                "하위 작업 실패"
            );
            (
                RunResult {
                    name: name.to_string(),
                    success: false,
                    duration,
                    detail: String::new(),
                    error: Some(e.to_string()),
                },
                None,
            )
        }
    }
}
