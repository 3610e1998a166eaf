//! Joining subvolumes with their quota records.
//!
//! The data flow is:
//! 1. Raw tool output (subvolume list, qgroup show)
//! 2. `Vec<Subvolume>` and `QuotaTable`
//! 3. `Report` (joined, in subvolume list order)
//! 4. `ReportTable` (formatted strings for display)

use serde::{Deserialize, Serialize};

use crate::quota::{QuotaRecord, QuotaTable};
use crate::subvolume::Subvolume;
use crate::{BtrfsduError, Result};

/// One subvolume together with its level-0 quota record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub subvolume: Subvolume,
    pub quota: QuotaRecord,
}

/// Usage of every listed subvolume on one filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Filesystem path the report was taken on
    pub path: String,
    /// Entries in subvolume list order
    pub entries: Vec<ReportEntry>,
    /// Exclusive bytes summed over all level-0 quota groups
    pub total_exclusive: u64,
}

/// Result of building a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// The report is ready to render
    Ready(Report),
    /// Subvolumes exist but none references any data, which usually means
    /// quota accounting has not caught up yet
    NoUsage { subvolumes: usize },
}

impl Report {
    /// Join subvolumes to their quota records.
    ///
    /// The order of `subvolumes` is kept as is. A subvolume without a level-0
    /// record fails the whole join with [`BtrfsduError::MissingQuota`].
    pub fn build(
        path: impl Into<String>,
        subvolumes: Vec<Subvolume>,
        quotas: &QuotaTable,
    ) -> Result<ReportOutcome> {
        if !quotas.has_usage() {
            return Ok(ReportOutcome::NoUsage {
                subvolumes: subvolumes.len(),
            });
        }

        let entries = subvolumes
            .into_iter()
            .map(|subvolume| match quotas.get(&subvolume.id) {
                Some(quota) => Ok(ReportEntry {
                    quota: quota.clone(),
                    subvolume,
                }),
                None => Err(BtrfsduError::MissingQuota {
                    id: subvolume.id,
                    name: subvolume.name,
                }),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ReportOutcome::Ready(Report {
            path: path.into(),
            entries,
            total_exclusive: quotas.total_exclusive(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, referenced: u64, exclusive: u64) -> QuotaRecord {
        QuotaRecord {
            level: 0,
            volume_id: id.to_string(),
            referenced,
            exclusive,
            ..Default::default()
        }
    }

    fn table(records: Vec<QuotaRecord>) -> QuotaTable {
        let mut table = QuotaTable::new();
        for r in records {
            table.insert(r);
        }
        table
    }

    fn ready(outcome: ReportOutcome) -> Report {
        match outcome {
            ReportOutcome::Ready(report) => report,
            other => panic!("expected a report, got {:?}", other),
        }
    }

    #[test]
    fn test_entries_follow_list_order() {
        let quotas = table(vec![
            record("256", 10, 1),
            record("258", 30, 3),
            record("257", 20, 2),
        ]);
        let subvolumes = vec![
            Subvolume::new("258", "c"),
            Subvolume::new("256", "a"),
            Subvolume::new("257", "b"),
        ];

        let report = ready(Report::build("/", subvolumes, &quotas).unwrap());
        let names: Vec<&str> = report
            .entries
            .iter()
            .map(|e| e.subvolume.name.as_str())
            .collect();
        assert_eq!(names, vec!["c", "a", "b"]);
        assert_eq!(report.entries[0].quota.referenced, 30);
    }

    #[test]
    fn test_total_covers_all_level_zero_groups() {
        // 5 is the top level and is usually not listed as a subvolume
        let quotas = table(vec![record("5", 16_384, 16_384), record("258", 100, 40)]);
        let report = ready(Report::build("/", vec![Subvolume::new("258", "home")], &quotas).unwrap());
        assert_eq!(report.total_exclusive, 16_384 + 40);
        assert_eq!(report.path, "/");
    }

    #[test]
    fn test_missing_quota_is_fatal() {
        let quotas = table(vec![record("258", 100, 40)]);
        let subvolumes = vec![Subvolume::new("258", "home"), Subvolume::new("259", "srv")];

        match Report::build("/", subvolumes, &quotas) {
            Err(BtrfsduError::MissingQuota { id, name }) => {
                assert_eq!(id, "259");
                assert_eq!(name, "srv");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_only_higher_level_group_is_missing() {
        let mut quotas = table(vec![record("258", 100, 40)]);
        quotas.insert(QuotaRecord {
            level: 1,
            ..record("259", 100, 40)
        });
        let subvolumes = vec![Subvolume::new("259", "srv")];
        assert!(matches!(
            Report::build("/", subvolumes, &quotas),
            Err(BtrfsduError::MissingQuota { .. })
        ));
    }

    #[test]
    fn test_no_usage() {
        let quotas = table(vec![record("258", 0, 0), record("259", 0, 0)]);
        let subvolumes = vec![Subvolume::new("258", "a"), Subvolume::new("259", "b")];
        assert_eq!(
            Report::build("/", subvolumes, &quotas).unwrap(),
            ReportOutcome::NoUsage { subvolumes: 2 }
        );
    }

    #[test]
    fn test_no_usage_takes_precedence_over_join() {
        let quotas = table(vec![record("258", 0, 0)]);
        let subvolumes = vec![Subvolume::new("999", "orphan")];
        assert_eq!(
            Report::build("/", subvolumes, &quotas).unwrap(),
            ReportOutcome::NoUsage { subvolumes: 1 }
        );
    }
}
