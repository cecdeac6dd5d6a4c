use std::path::PathBuf;

use crate::error::Result;
use crate::server;
use crate::ssh::SshClient;
use crate::step::StepReport;

/// Shared mutable state handed to every step in a run.
///
/// Steps record their reports here; the chain runner reads them back
/// for the run summary. Connection and artifact settings are fixed at
/// resolve time and steps treat them as read-only.
pub struct RunContext {
    pub server_id: String,
    pub client: SshClient,
    pub artifacts_dir: PathBuf,
    pub reports: Vec<StepReport>,
}

impl RunContext {
    pub fn resolve(server_id: &str, artifacts_dir: Option<&str>) -> Result<Self> {
        let client = resolve_server_ssh(server_id)?;
        let artifacts_dir = match artifacts_dir {
            Some(dir) => PathBuf::from(shellexpand::tilde(dir).to_string()),
            None => default_artifacts_dir()?,
        };

        Ok(Self {
            server_id: server_id.to_string(),
            client,
            artifacts_dir,
            reports: Vec::new(),
        })
    }
}

/// Load a server config and build an SSH client for it.
pub fn resolve_server_ssh(server_id: &str) -> Result<SshClient> {
    let server = server::load(server_id)?;
    SshClient::from_server(&server, server_id)
}

fn default_artifacts_dir() -> Result<PathBuf> {
    let cwd = std::env::current_dir()
        .map_err(|e| crate::Error::internal_io(e.to_string(), None))?;
    Ok(cwd.join("artifacts"))
}
