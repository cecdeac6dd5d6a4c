use clap::Args;
use serde::Serialize;

use rigger::images::{self, script, ImageRegistry, ImageSpec};

use super::CmdResult;

#[derive(Args)]
pub struct PlanArgs {
    /// Comma-separated image specs (name:version:gitRef)
    #[arg(long)]
    pub build_images: String,

    /// Registry base URL to push to
    #[arg(long)]
    pub registry: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanOutput {
    pub command: String,
    pub registry: String,
    pub images: Vec<ImageSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
    pub script: String,
}

/// Render the combined remote script without connecting anywhere.
pub fn run(args: PlanArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<PlanOutput> {
    let known = ImageRegistry::openshift_defaults();
    let plan = images::resolve(&args.build_images, &known)?;
    let registry = images::normalize_registry(&args.registry);

    let steps = images::orchestrator::command_plan(&plan, &registry, &known);
    let rendered = script::render(&steps);

    Ok((
        PlanOutput {
            command: "plan".to_string(),
            registry,
            images: plan.images,
            skipped: plan.skipped,
            script: rendered,
        },
        0,
    ))
}
