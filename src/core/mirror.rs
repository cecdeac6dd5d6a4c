use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::context::RunContext;
use crate::error::Result;
use crate::executor::{CommandRunner, ProcessRunner};
use crate::ssh::SshClient;
use crate::step::{Step, StepReport};
use crate::utils::shell;

/// Remote build output directory on the provisioned machine.
const REMOTE_BUILD_DIR: &str = "/data";

/// One remote-to-local mirror entry.
///
/// The local path is kept as a string because a trailing separator is
/// meaningful: it marks the destination as a directory to create
/// directly, rather than a file whose parent must exist.
#[derive(Debug, Clone)]
pub struct MirrorEntry {
    pub remote_path: String,
    pub local_path: String,
}

impl MirrorEntry {
    fn new(remote_path: &str, local_path: String) -> Self {
        Self {
            remote_path: remote_path.to_string(),
            local_path,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorEntryResult {
    pub remote_path: String,
    pub local_path: String,
    pub exit_code: i32,
    pub success: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr: String,
}

/// The fixed set of paths mirrored back after a test run: test
/// outputs, system and service logs, and built RPMs.
pub fn default_download_map(artifacts_dir: &Path) -> Vec<MirrorEntry> {
    let dir = artifacts_dir.display();
    vec![
        MirrorEntry::new("/tmp/rhc/", format!("{}/test_runs/", dir)),
        MirrorEntry::new("/var/log/openshift/", format!("{}/openshift_logs/", dir)),
        MirrorEntry::new("/var/log/httpd/", format!("{}/node_httpd_logs/", dir)),
        MirrorEntry::new("/var/log/yum.log", format!("{}/yum.log", dir)),
        MirrorEntry::new("/var/log/messages", format!("{}/messages", dir)),
        MirrorEntry::new("/var/log/secure", format!("{}/secure", dir)),
        MirrorEntry::new("/var/log/audit/audit.log", format!("{}/audit.log", dir)),
        MirrorEntry::new("/var/log/mcollective.*", format!("{}/mcollective/", dir)),
        MirrorEntry::new(
            &format!("{}/origin-rpms/", REMOTE_BUILD_DIR),
            format!("{}/rpms/", dir),
        ),
        MirrorEntry::new(
            &format!("{}/origin-srpms/", REMOTE_BUILD_DIR),
            format!("{}/srpms/", dir),
        ),
    ]
}

/// The directory that must exist before transferring to `local_path`.
///
/// A trailing separator means the path itself is the directory;
/// otherwise the file lands inside its parent.
pub fn dest_dir(local_path: &str) -> PathBuf {
    if local_path.ends_with('/') {
        PathBuf::from(local_path)
    } else {
        Path::new(local_path)
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_default()
    }
}

fn rsync_args(client: &SshClient, remote_path: &str, local_path: &str) -> Vec<String> {
    let mut rsh = format!("ssh -p {} -o StrictHostKeyChecking=no", client.port);
    if let Some(key) = &client.identity_file {
        rsh.push_str(&format!(" -i {}", shell::quote_path(key)));
    }

    vec![
        "--verbose".to_string(),
        "--human-readable".to_string(),
        "--compress".to_string(),
        "--recursive".to_string(),
        "--perms".to_string(),
        "--times".to_string(),
        "--stats".to_string(),
        "--delete".to_string(),
        "--rsync-path".to_string(),
        "sudo rsync".to_string(),
        "--rsh".to_string(),
        rsh,
        format!("{}@{}:{}", client.user, client.host, remote_path),
        local_path.to_string(),
    ]
}

/// Mirror every mapping entry from the remote machine to the local
/// artifacts tree.
///
/// A failed entry is warned about and recorded, never fatal - the
/// remaining entries still run. The caller decides whether any
/// aggregate failure should be surfaced.
pub fn mirror(
    mapping: &[MirrorEntry],
    client: &SshClient,
    runner: &dyn CommandRunner,
) -> Vec<MirrorEntryResult> {
    let mut results = Vec::with_capacity(mapping.len());

    for entry in mapping {
        log_status!(
            "mirror",
            "Downloading artifacts from '{}' to '{}'",
            entry.remote_path,
            entry.local_path
        );

        let dir = dest_dir(&entry.local_path);
        if !dir.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(&dir) {
                log_status!("mirror", "Unable to create '{}': {}", dir.display(), e);
                results.push(MirrorEntryResult {
                    remote_path: entry.remote_path.clone(),
                    local_path: entry.local_path.clone(),
                    exit_code: -1,
                    success: false,
                    stderr: e.to_string(),
                });
                continue;
            }
        }

        let args = rsync_args(client, &entry.remote_path, &entry.local_path);
        let output = runner.run("rsync", &args);

        if !output.success {
            log_status!("mirror", "Unable to download artifact");
            log_status!("mirror", "{}", output.stderr);
        }

        results.push(MirrorEntryResult {
            remote_path: entry.remote_path.clone(),
            local_path: entry.local_path.clone(),
            exit_code: output.exit_code,
            success: output.success,
            stderr: output.stderr,
        });
    }

    results
}

/// Chain step that mirrors the default download map.
pub struct MirrorStep;

impl Step for MirrorStep {
    fn name(&self) -> &'static str {
        "mirror"
    }

    fn run(&self, ctx: &mut RunContext) -> Result<StepReport> {
        let mapping = default_download_map(&ctx.artifacts_dir);
        let results = mirror(&mapping, &ctx.client, &ProcessRunner);

        let warnings: Vec<String> = results
            .iter()
            .filter(|r| !r.success)
            .map(|r| format!("Failed to mirror '{}' (exit {})", r.remote_path, r.exit_code))
            .collect();

        if warnings.is_empty() {
            Ok(StepReport::success(self.name()))
        } else if warnings.len() == results.len() {
            Ok(StepReport::failed(
                self.name(),
                format!("All {} mirror entries failed", results.len()),
            ))
        } else {
            Ok(StepReport::partial(self.name(), warnings))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::testing::ScriptedRunner;
    use crate::ssh::CommandOutput;

    fn test_client() -> SshClient {
        SshClient {
            host: "vm.example.com".to_string(),
            user: "vagrant".to_string(),
            port: 2222,
            identity_file: Some("/home/dev/.ssh/vm_key".to_string()),
            is_local: false,
        }
    }

    #[test]
    fn dest_dir_uses_path_itself_for_directories() {
        assert_eq!(dest_dir("/out/test_runs/"), PathBuf::from("/out/test_runs/"));
    }

    #[test]
    fn dest_dir_uses_parent_for_files() {
        assert_eq!(dest_dir("/out/messages"), PathBuf::from("/out"));
    }

    #[test]
    fn default_map_mixes_files_and_directories() {
        let map = default_download_map(Path::new("/out"));
        let messages = map
            .iter()
            .find(|e| e.remote_path == "/var/log/messages")
            .unwrap();
        assert_eq!(messages.local_path, "/out/messages");

        let test_runs = map.iter().find(|e| e.remote_path == "/tmp/rhc/").unwrap();
        assert!(test_runs.local_path.ends_with("/test_runs/"));

        let rpms = map.iter().find(|e| e.local_path == "/out/rpms/").unwrap();
        assert_eq!(rpms.remote_path, "/data/origin-rpms/");
    }

    #[test]
    fn rsync_args_carry_transfer_semantics_and_target() {
        let args = rsync_args(&test_client(), "/var/log/messages", "/out/messages");
        for flag in ["--recursive", "--perms", "--times", "--delete", "--compress"] {
            assert!(args.contains(&flag.to_string()), "missing {}", flag);
        }
        let rsync_path_idx = args.iter().position(|a| a == "--rsync-path").unwrap();
        assert_eq!(args[rsync_path_idx + 1], "sudo rsync");

        let rsh_idx = args.iter().position(|a| a == "--rsh").unwrap();
        assert!(args[rsh_idx + 1].contains("-p 2222"));
        assert!(args[rsh_idx + 1].contains("vm_key"));

        assert_eq!(args[args.len() - 2], "vagrant@vm.example.com:/var/log/messages");
        assert_eq!(args[args.len() - 1], "/out/messages");
    }

    #[test]
    fn failed_transfer_is_recorded_and_loop_continues() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().display().to_string();

        let mapping = vec![
            MirrorEntry::new("/var/log/messages", format!("{}/messages", out)),
            MirrorEntry::new("/var/log/secure", format!("{}/secure", out)),
        ];

        let runner = ScriptedRunner::new(vec![
            CommandOutput {
                stdout: String::new(),
                stderr: "rsync: connection unexpectedly closed".to_string(),
                success: false,
                exit_code: 2,
            },
            CommandOutput {
                stdout: String::new(),
                stderr: String::new(),
                success: true,
                exit_code: 0,
            },
        ]);

        let results = mirror(&mapping, &test_client(), &runner);

        assert_eq!(results.len(), 2);
        assert!(!results[0].success);
        assert_eq!(results[0].exit_code, 2);
        assert!(results[0].stderr.contains("connection unexpectedly closed"));
        assert!(results[1].success);
        assert_eq!(runner.calls.borrow().len(), 2);
    }

    #[test]
    fn destination_directories_are_created() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().display().to_string();

        let mapping = vec![
            MirrorEntry::new("/tmp/rhc/", format!("{}/test_runs/", out)),
            MirrorEntry::new("/var/log/messages", format!("{}/logs/messages", out)),
        ];

        let runner = ScriptedRunner::succeeding();
        mirror(&mapping, &test_client(), &runner);

        assert!(tmp.path().join("test_runs").is_dir());
        assert!(tmp.path().join("logs").is_dir());
        assert!(!tmp.path().join("logs/messages").exists());
    }
}
