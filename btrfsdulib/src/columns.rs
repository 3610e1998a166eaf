//! Column layout detection for `btrfs qgroup show` output.
//!
//! Different btrfs-progs releases print different header names for the same
//! data (`rfer` vs `Referenced`, `max_excl` vs `Max exclusive`, ...) and may
//! prefix the table with warning lines. The layout is therefore read from the
//! header line instead of being hard-coded.

use std::collections::HashMap;

use tracing::warn;

use crate::{BtrfsduError, Result};

/// A logical quota column, independent of the header text a tool version uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuotaField {
    QgroupId,
    Referenced,
    Exclusive,
    MaxReferenced,
    MaxExclusive,
}

impl QuotaField {
    /// Every logical field, in display order.
    pub const ALL: [QuotaField; 5] = [
        QuotaField::QgroupId,
        QuotaField::Referenced,
        QuotaField::Exclusive,
        QuotaField::MaxReferenced,
        QuotaField::MaxExclusive,
    ];

    /// Header names this field may appear under, tried in order.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            QuotaField::QgroupId => &["qgroupid"],
            QuotaField::Referenced => &["rfer", "referenced"],
            QuotaField::Exclusive => &["excl", "exclusive"],
            QuotaField::MaxReferenced => &["max_rfer", "max referenced"],
            QuotaField::MaxExclusive => &["max_excl", "max exclusive"],
        }
    }

    /// Canonical (short) column name.
    pub fn name(self) -> &'static str {
        self.aliases()[0]
    }

    /// Limits are not printed by every btrfs-progs release.
    pub fn is_required(self) -> bool {
        !matches!(self, QuotaField::MaxReferenced | QuotaField::MaxExclusive)
    }
}

/// Lower-cased header name to zero-based column index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: HashMap<String, usize>,
}

impl ColumnMapping {
    /// Build a mapping from an already split, lower-cased header.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut columns = HashMap::new();
        for (index, name) in names.into_iter().enumerate() {
            // first occurrence wins for duplicated headers
            columns.entry(name.into()).or_insert(index);
        }
        Self { columns }
    }

    /// Index of a raw header name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.get(name).copied()
    }

    /// Index of a logical field, trying each alias in priority order.
    pub fn resolve(&self, field: QuotaField) -> Option<usize> {
        field
            .aliases()
            .iter()
            .find_map(|alias| self.index_of(alias))
    }

    /// Number of header columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the mapping has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Split a header line on runs of two or more spaces and lower-case each field.
///
/// Single spaces belong to the column name (`Max referenced`). A line without
/// any double space is split on single whitespace instead, which covers
/// compact headers made of one-word names only.
pub fn split_header(line: &str) -> Vec<String> {
    let fields: Vec<String> = line
        .trim()
        .split("  ")
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(str::to_lowercase)
        .collect();
    if fields.len() == 1 {
        return fields[0].split_whitespace().map(str::to_string).collect();
    }
    fields
}

/// Whether a line is a tool warning rather than table content.
pub(crate) fn is_warning(line: &str) -> bool {
    line.trim_start()
        .get(..7)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("warning"))
}

/// Find the `qgroupid` header in raw quota output and build its mapping.
///
/// Warning lines are logged and skipped. Fails with
/// [`BtrfsduError::UnsupportedOutputFormat`] when no header is present and
/// with [`BtrfsduError::MissingColumn`] when a required field is absent.
pub fn resolve_columns(output: &str) -> Result<ColumnMapping> {
    for line in output.lines() {
        if is_warning(line) {
            warn!("{}", line.trim());
            continue;
        }
        let fields = split_header(line);
        if fields.first().map(String::as_str) != Some(QuotaField::QgroupId.name()) {
            continue;
        }

        let mapping = ColumnMapping::from_names(fields);
        if let Some(missing) = QuotaField::ALL
            .into_iter()
            .find(|field| field.is_required() && mapping.resolve(*field).is_none())
        {
            return Err(BtrfsduError::MissingColumn(missing.name()));
        }
        return Ok(mapping);
    }

    Err(BtrfsduError::UnsupportedOutputFormat)
}
