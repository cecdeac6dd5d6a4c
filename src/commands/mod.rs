pub type CmdResult<T> = rigger::Result<(T, i32)>;

pub(crate) struct GlobalArgs {}

pub mod images;
pub mod mirror;
pub mod plan;
pub mod run;
pub mod server;

pub fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (rigger::Result<serde_json::Value>, i32) {
    match command {
        crate::Commands::Mirror(args) => {
            crate::output::map_cmd_result_to_json(mirror::run(args, global))
        }
        crate::Commands::Images(args) => {
            crate::output::map_cmd_result_to_json(images::run(args, global))
        }
        crate::Commands::Run(args) => crate::output::map_cmd_result_to_json(run::run(args, global)),
        crate::Commands::Plan(args) => {
            crate::output::map_cmd_result_to_json(plan::run(args, global))
        }
        crate::Commands::Server(args) => {
            crate::output::map_cmd_result_to_json(server::run(args, global))
        }
    }
}
