//! # btrfsdulib
//!
//! Per-subvolume disk usage for btrfs, built from the text printed by
//! `btrfs subvolume list` and `btrfs qgroup show`.
//!
//! ## Overview
//!
//! `du` cannot tell how much space a btrfs subvolume really owns: snapshots
//! share extents, so the same bytes show up under many paths. Quota groups
//! track this exactly, but `btrfs qgroup show` prints numeric ids and raw
//! byte counts. This library joins both listings into one aligned report:
//!
//! - **Used**: bytes referenced by the subvolume, shared extents included
//! - **Exclusive**: bytes only this subvolume holds, freed if it is deleted
//! - **Limits**: quota ceilings with the percentage already consumed
//!
//! ## Features
//!
//! - **Version tolerant**: column layout is read from the header, so both the
//!   old `rfer`/`excl` and the newer `Referenced`/`Exclusive` headers work
//! - **Level aware**: only level-0 groups are used; aggregate groups at higher
//!   levels never mask a subvolume's own numbers
//! - **Stable order**: rows follow the subvolume list, not the quota table
//! - **Pure**: no I/O, callers run the tool and hand over its output
//!
//! ## Example
//!
//! ```rust
//! use btrfsdulib::{build_report, ReportOutcome, ReportTable};
//!
//! let list = "ID 258 gen 10 top level 5 path home\n";
//! let quota = "qgroupid  rfer  excl  max_rfer  max_excl\n\
//!              --------  ----  ----  --------  --------\n\
//!              0/258  1048576  524288  0  0\n";
//!
//! match build_report("/", list, quota).unwrap() {
//!     ReportOutcome::Ready(report) => {
//!         let text = ReportTable::from_report(&report).render();
//!         assert!(text.contains("home"));
//!         assert!(text.contains(" 512.0 KiB"));
//!     }
//!     ReportOutcome::NoUsage { .. } => unreachable!(),
//! }
//! ```

pub mod columns;
pub mod error;
pub mod quota;
pub mod report;
pub mod size;
pub mod subvolume;
pub mod table;

pub use columns::{resolve_columns, ColumnMapping, QuotaField};
pub use error::BtrfsduError;
pub use quota::{parse_quota_output, parse_quota_table, QuotaRecord, QuotaTable};
pub use report::{Report, ReportEntry, ReportOutcome};
pub use size::{human_limit, human_size};
pub use subvolume::{parse_subvolume_list, Subvolume};
pub use table::{ColumnWidths, ReportRow, ReportTable};

/// Result type for btrfsdulib operations
pub type Result<T> = std::result::Result<T, BtrfsduError>;

/// Parse both tool outputs and join them into a report for `path`.
///
/// `list_output` is the text of `btrfs subvolume list`, `quota_output` the
/// text of `btrfs qgroup show`. Nothing is rendered if any step fails.
pub fn build_report(path: &str, list_output: &str, quota_output: &str) -> Result<ReportOutcome> {
    let subvolumes = parse_subvolume_list(list_output)?;
    let quotas = parse_quota_output(quota_output)?;
    Report::build(path, subvolumes, &quotas)
}
