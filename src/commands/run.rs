use clap::Args;
use serde::Serialize;

use rigger::context::RunContext;
use rigger::images::ImagesStep;
use rigger::mirror::MirrorStep;
use rigger::step::{self, ChainSummary, Step, StepReport, StepStatus};

use super::CmdResult;

#[derive(Args)]
pub struct RunArgs {
    /// Server ID
    pub server_id: String,

    /// Comma-separated image specs (name:version:gitRef)
    #[arg(long)]
    pub build_images: String,

    /// Registry base URL to push to
    #[arg(long)]
    pub registry: String,

    /// Local artifacts directory (defaults to ./artifacts)
    #[arg(long)]
    pub artifacts_dir: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutput {
    pub command: String,
    pub server_id: String,
    pub steps: Vec<StepReport>,
    pub summary: ChainSummary,
}

/// Run the full step chain: mirror artifacts, then build and push
/// images. Every step runs even when an earlier one fails.
pub fn run(args: RunArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<RunOutput> {
    let mut ctx = RunContext::resolve(&args.server_id, args.artifacts_dir.as_deref())?;

    let steps: Vec<Box<dyn Step>> = vec![
        Box::new(MirrorStep),
        Box::new(ImagesStep {
            build_images: args.build_images.clone(),
            registry: args.registry.clone(),
        }),
    ];

    let summary = step::run_chain(&steps, &mut ctx);
    let exit_code = if summary.status == StepStatus::Success {
        0
    } else {
        20
    };

    Ok((
        RunOutput {
            command: "run".to_string(),
            server_id: args.server_id,
            steps: ctx.reports,
            summary,
        },
        exit_code,
    ))
}
