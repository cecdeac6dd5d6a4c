use serde::Serialize;

use crate::context::RunContext;
use crate::error::Result;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Success,
    PartialSuccess,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: String,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepReport {
    pub fn success(step: &str) -> Self {
        Self {
            step: step.to_string(),
            status: StepStatus::Success,
            warnings: Vec::new(),
            error: None,
        }
    }

    pub fn partial(step: &str, warnings: Vec<String>) -> Self {
        Self {
            step: step.to_string(),
            status: StepStatus::PartialSuccess,
            warnings,
            error: None,
        }
    }

    pub fn failed(step: &str, error: String) -> Self {
        Self {
            step: step.to_string(),
            status: StepStatus::Failed,
            warnings: Vec::new(),
            error: Some(error),
        }
    }
}

/// One discrete stage of a run.
///
/// Steps receive the shared run context and report their outcome; a
/// step's failure is a result to inspect, not a reason to stop the
/// chain. Anything that must halt the whole run (e.g. unresolvable
/// configuration) belongs before the chain starts, not inside a step.
pub trait Step {
    fn name(&self) -> &'static str;
    fn run(&self, ctx: &mut RunContext) -> Result<StepReport>;
}

#[derive(Debug, Clone, Serialize)]
pub struct ChainSummary {
    pub total_steps: usize,
    pub succeeded: usize,
    pub partial: usize,
    pub failed: usize,
    pub status: StepStatus,
}

/// Run every step in order, recording reports into the context.
///
/// Every step runs regardless of earlier failures - a failed mirror
/// must not prevent the image push, and vice versa.
pub fn run_chain(steps: &[Box<dyn Step>], ctx: &mut RunContext) -> ChainSummary {
    for step in steps {
        log_status!("run", "Running step '{}'", step.name());
        let report = match step.run(ctx) {
            Ok(report) => report,
            Err(err) => StepReport::failed(step.name(), err.to_string()),
        };

        if let Some(error) = &report.error {
            log_status!("run", "Step '{}' failed: {}", step.name(), error);
        }
        ctx.reports.push(report);
    }

    summarize(&ctx.reports)
}

fn summarize(reports: &[StepReport]) -> ChainSummary {
    let succeeded = reports
        .iter()
        .filter(|r| r.status == StepStatus::Success)
        .count();
    let partial = reports
        .iter()
        .filter(|r| r.status == StepStatus::PartialSuccess)
        .count();
    let failed = reports
        .iter()
        .filter(|r| r.status == StepStatus::Failed)
        .count();

    let status = if failed == reports.len() && !reports.is_empty() {
        StepStatus::Failed
    } else if failed > 0 || partial > 0 {
        StepStatus::PartialSuccess
    } else {
        StepStatus::Success
    };

    ChainSummary {
        total_steps: reports.len(),
        succeeded,
        partial,
        failed,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ssh::SshClient;
    use std::path::PathBuf;

    fn test_context() -> RunContext {
        RunContext {
            server_id: "test-vm".to_string(),
            client: SshClient {
                host: "localhost".to_string(),
                user: "test".to_string(),
                port: 22,
                identity_file: None,
                is_local: true,
            },
            artifacts_dir: PathBuf::from("/tmp/artifacts"),
            reports: Vec::new(),
        }
    }

    struct FixedStep {
        name: &'static str,
        fail: bool,
    }

    impl Step for FixedStep {
        fn name(&self) -> &'static str {
            self.name
        }

        fn run(&self, _ctx: &mut RunContext) -> Result<StepReport> {
            if self.fail {
                Err(crate::Error::internal_unexpected("boom"))
            } else {
                Ok(StepReport::success(self.name))
            }
        }
    }

    #[test]
    fn chain_continues_past_failed_step() {
        let steps: Vec<Box<dyn Step>> = vec![
            Box::new(FixedStep {
                name: "first",
                fail: true,
            }),
            Box::new(FixedStep {
                name: "second",
                fail: false,
            }),
        ];

        let mut ctx = test_context();
        let summary = run_chain(&steps, &mut ctx);

        assert_eq!(ctx.reports.len(), 2);
        assert_eq!(ctx.reports[0].status, StepStatus::Failed);
        assert_eq!(ctx.reports[1].status, StepStatus::Success);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.status, StepStatus::PartialSuccess);
    }

    #[test]
    fn all_success_summary() {
        let steps: Vec<Box<dyn Step>> = vec![Box::new(FixedStep {
            name: "only",
            fail: false,
        })];

        let mut ctx = test_context();
        let summary = run_chain(&steps, &mut ctx);
        assert_eq!(summary.status, StepStatus::Success);
        assert_eq!(summary.total_steps, 1);
    }
}
