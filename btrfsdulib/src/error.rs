//! Error types for btrfsdulib

use thiserror::Error;

/// Errors that can occur while collecting or parsing subvolume usage
#[derive(Error, Debug)]
pub enum BtrfsduError {
    /// An invocation of the btrfs tool exited with a non-zero status
    #[error("`{command}` failed ({status}): {stderr}")]
    ToolFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// The btrfs tool could not be started at all
    #[error("failed to run `{command}`: {source}")]
    ToolSpawn {
        command: String,
        source: std::io::Error,
    },

    /// No `qgroupid` header line in the quota output
    #[error("incompatible output format: no qgroupid header found in quota output")]
    UnsupportedOutputFormat,

    /// The quota header has no column for a required field
    #[error("incompatible output format: quota header has no '{0}' column")]
    MissingColumn(&'static str),

    /// The level part of a qgroupid is not a number
    #[error("malformed or unsupported qgroupid '{0}'")]
    MalformedQgroupId(String),

    /// A required numeric quota value is absent or not a number
    #[error("invalid value '{value}' in column '{column}' of qgroup {qgroupid}")]
    InvalidQuotaValue {
        qgroupid: String,
        column: &'static str,
        value: String,
    },

    /// A subvolume list line has fewer fields than expected
    #[error("unexpected subvolume list line: '{0}'")]
    MalformedListLine(String),

    /// A listed subvolume has no level-0 quota record
    #[error("no quota information for subvolume {id} ('{name}')")]
    MissingQuota { id: String, name: String },
}
