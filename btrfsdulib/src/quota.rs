//! Parsing of `btrfs qgroup show` output into per-subvolume quota records.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::columns::{resolve_columns, ColumnMapping, QuotaField};
use crate::{BtrfsduError, Result};

/// Usage and limits of one level-0 quota group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaRecord {
    /// Hierarchy level; 0 for per-subvolume groups
    pub level: u64,
    /// Subvolume id this group accounts for
    pub volume_id: String,
    /// Bytes visible through the subvolume, shared extents included
    pub referenced: u64,
    /// Bytes owned by this subvolume alone
    pub exclusive: u64,
    /// Referenced limit, 0 when unlimited
    pub max_referenced: u64,
    /// Exclusive limit, 0 when unlimited
    pub max_exclusive: u64,
}

/// Level-0 quota records keyed by subvolume id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuotaTable {
    records: HashMap<String, QuotaRecord>,
}

impl QuotaTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record, replacing any earlier one for the same subvolume.
    ///
    /// Records above level 0 aggregate other groups and are ignored; returns
    /// whether the record was kept.
    pub fn insert(&mut self, record: QuotaRecord) -> bool {
        if record.level > 0 {
            debug!(
                "skipping qgroup {}/{}: not a subvolume group",
                record.level, record.volume_id
            );
            return false;
        }
        self.records.insert(record.volume_id.clone(), record);
        true
    }

    /// Record for a subvolume id.
    pub fn get(&self, volume_id: &str) -> Option<&QuotaRecord> {
        self.records.get(volume_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over the retained records in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &QuotaRecord> {
        self.records.values()
    }

    /// Sum of exclusive bytes across every retained record.
    pub fn total_exclusive(&self) -> u64 {
        self.iter().map(|r| r.exclusive).sum()
    }

    /// Whether any subvolume references data at all.
    pub fn has_usage(&self) -> bool {
        self.iter().any(|r| r.referenced > 0)
    }
}

/// Resolve the column layout and parse the records of raw quota output.
pub fn parse_quota_output(output: &str) -> Result<QuotaTable> {
    let mapping = resolve_columns(output)?;
    parse_quota_table(output, &mapping)
}

/// Parse the data lines of quota output using an already resolved layout.
///
/// Lines that do not start with a digit (header, ruler, warnings, blanks) are
/// skipped. Only level-0 groups are kept and the last line for an id wins.
pub fn parse_quota_table(output: &str, mapping: &ColumnMapping) -> Result<QuotaTable> {
    let mut table = QuotaTable::new();
    for line in output.lines() {
        if !line.starts_with(|c: char| c.is_ascii_digit()) {
            continue;
        }
        table.insert(parse_record(line, mapping)?);
    }
    Ok(table)
}

fn parse_record(line: &str, mapping: &ColumnMapping) -> Result<QuotaRecord> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let value = |field: QuotaField| {
        mapping
            .resolve(field)
            .and_then(|index| fields.get(index).copied())
    };

    let qgroupid = value(QuotaField::QgroupId).unwrap_or_default();
    let (level, volume_id) = parse_qgroupid(qgroupid)?;

    let required = |field: QuotaField| -> Result<u64> {
        let raw = value(field).unwrap_or_default();
        raw.parse().map_err(|_| BtrfsduError::InvalidQuotaValue {
            qgroupid: qgroupid.to_string(),
            column: field.name(),
            value: raw.to_string(),
        })
    };
    // "none", absent columns and short lines all mean no limit
    let limit = |field: QuotaField| -> u64 {
        value(field)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0)
    };

    Ok(QuotaRecord {
        level,
        volume_id: volume_id.to_string(),
        referenced: required(QuotaField::Referenced)?,
        exclusive: required(QuotaField::Exclusive)?,
        max_referenced: limit(QuotaField::MaxReferenced),
        max_exclusive: limit(QuotaField::MaxExclusive),
    })
}

/// Split a `<level>/<id>` qgroup id.
fn parse_qgroupid(qgroupid: &str) -> Result<(u64, &str)> {
    let malformed = || BtrfsduError::MalformedQgroupId(qgroupid.to_string());
    let (level, volume_id) = qgroupid.split_once('/').ok_or_else(malformed)?;
    let level = level.parse().map_err(|_| malformed())?;
    Ok((level, volume_id))
}
