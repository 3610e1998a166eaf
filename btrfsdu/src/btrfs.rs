//! Runs the btrfs tool and captures its output.

use std::process::Command;

use btrfsdulib::BtrfsduError;
use tracing::debug;

/// Handle to a btrfs executable.
#[derive(Debug, Clone)]
pub struct Btrfs {
    program: String,
}

impl Btrfs {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// `btrfs subvolume list`, sorted by path.
    pub fn subvolume_list(&self, path: &str) -> Result<String, BtrfsduError> {
        self.run(&["subvolume", "list", "--sort=path", path])
    }

    /// Rescan quota groups and wait until the rescan is finished.
    pub fn quota_rescan(&self, path: &str) -> Result<String, BtrfsduError> {
        self.run(&["quota", "rescan", "-w", path])
    }

    /// `btrfs qgroup show` with limits and raw byte counts.
    pub fn qgroup_show(&self, path: &str) -> Result<String, BtrfsduError> {
        self.run(&["qgroup", "show", "-re", "--raw", path])
    }

    fn run(&self, args: &[&str]) -> Result<String, BtrfsduError> {
        let command = format!("{} {}", self.program, args.join(" "));
        debug!("running {}", command);

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|source| BtrfsduError::ToolSpawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(BtrfsduError::ToolFailed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
