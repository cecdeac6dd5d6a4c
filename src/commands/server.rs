use clap::{Args, Subcommand};
use serde::Serialize;

use rigger::server::{self, Server};

use super::CmdResult;

#[derive(Args)]
pub struct ServerArgs {
    #[command(subcommand)]
    pub command: ServerSubcommand,
}

#[derive(Subcommand)]
pub enum ServerSubcommand {
    /// Create or update a server configuration
    Set {
        /// Server ID
        id: String,
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// Path to the SSH private key
        #[arg(long)]
        identity_file: Option<String>,
    },
    /// List configured servers
    List,
    /// Show a server configuration
    Show {
        /// Server ID
        id: String,
    },
    /// Remove a server configuration
    Remove {
        /// Server ID
        id: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerOutput {
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<Server>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Server>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed: Option<String>,
}

pub fn run(args: ServerArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<ServerOutput> {
    let output = match args.command {
        ServerSubcommand::Set {
            id,
            host,
            user,
            port,
            identity_file,
        } => ServerOutput {
            command: "server.set".to_string(),
            server: Some(server::set(&id, host, user, port, identity_file)?),
            servers: None,
            removed: None,
        },
        ServerSubcommand::List => ServerOutput {
            command: "server.list".to_string(),
            server: None,
            servers: Some(server::list()?),
            removed: None,
        },
        ServerSubcommand::Show { id } => ServerOutput {
            command: "server.show".to_string(),
            server: Some(server::load(&id)?),
            servers: None,
            removed: None,
        },
        ServerSubcommand::Remove { id } => {
            server::delete(&id)?;
            ServerOutput {
                command: "server.remove".to_string(),
                server: None,
                servers: None,
                removed: Some(id),
            }
        }
    };

    Ok((output, 0))
}
