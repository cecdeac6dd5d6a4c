use clap::Args;
use serde::Serialize;

use rigger::context;
use rigger::images::{self, ImageRegistry, ImageSpec};

use super::CmdResult;

#[derive(Args)]
pub struct ImagesArgs {
    /// Server ID
    pub server_id: String,

    /// Comma-separated image specs (name:version:gitRef)
    #[arg(long)]
    pub build_images: String,

    /// Registry base URL to push to
    #[arg(long)]
    pub registry: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagesOutput {
    pub command: String,
    pub server_id: String,
    pub registry: String,
    pub images: Vec<ImageSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
    pub exit_code: i32,
    pub success: bool,
}

pub fn run(args: ImagesArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<ImagesOutput> {
    let client = context::resolve_server_ssh(&args.server_id)?;

    let known = ImageRegistry::openshift_defaults();
    let plan = images::resolve(&args.build_images, &known)?;
    let registry = images::normalize_registry(&args.registry);

    let result = images::orchestrate(&plan, &registry, &known, &client);
    let exit_code = if result.success { 0 } else { 20 };

    Ok((
        ImagesOutput {
            command: "images".to_string(),
            server_id: args.server_id,
            registry,
            images: plan.images,
            skipped: plan.skipped,
            exit_code: result.exit_code,
            success: result.success,
        },
        exit_code,
    ))
}
