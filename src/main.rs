use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{images, mirror, plan, run, server, GlobalArgs};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "rigger")]
#[command(version = VERSION)]
#[command(about = "Post-provisioning orchestration for remote build machines")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mirror remote logs, RPMs and test outputs to a local artifacts tree
    Mirror(mirror::MirrorArgs),
    /// Build, test, tag and push container images on the remote machine
    Images(images::ImagesArgs),
    /// Run the full step chain (mirror, then images)
    Run(run::RunArgs),
    /// Render the combined image script without executing it
    Plan(plan::PlanArgs),
    /// Manage SSH server configurations
    Server(server::ServerArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let global = GlobalArgs {};

    let (json_result, exit_code) = commands::run_json(cli.command, &global);
    let _ = output::print_json_result(json_result);

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
