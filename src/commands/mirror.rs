use clap::Args;
use serde::Serialize;

use rigger::context::RunContext;
use rigger::executor::ProcessRunner;
use rigger::mirror::{self, MirrorEntryResult};

use super::CmdResult;

#[derive(Args)]
pub struct MirrorArgs {
    /// Server ID
    pub server_id: String,

    /// Local artifacts directory (defaults to ./artifacts)
    #[arg(long)]
    pub artifacts_dir: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorOutput {
    pub command: String,
    pub server_id: String,
    pub artifacts_dir: String,
    pub entries: Vec<MirrorEntryResult>,
    pub failed: usize,
}

pub fn run(args: MirrorArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<MirrorOutput> {
    let ctx = RunContext::resolve(&args.server_id, args.artifacts_dir.as_deref())?;

    rigger::log_status!("mirror", "Downloading logs and rpms");
    let mapping = mirror::default_download_map(&ctx.artifacts_dir);
    let entries = mirror::mirror(&mapping, &ctx.client, &ProcessRunner);

    let failed = entries.iter().filter(|r| !r.success).count();
    let exit_code = if failed > 0 { 20 } else { 0 };

    Ok((
        MirrorOutput {
            command: "mirror".to_string(),
            server_id: args.server_id,
            artifacts_dir: ctx.artifacts_dir.display().to_string(),
            entries,
            failed,
        },
        exit_code,
    ))
}
