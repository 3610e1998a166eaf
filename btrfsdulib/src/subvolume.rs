//! Parsing of `btrfs subvolume list` output.

use serde::{Deserialize, Serialize};

use crate::{BtrfsduError, Result};

/// Position of the subvolume id in a list line (`ID <id> ...`).
const ID_FIELD: usize = 1;

/// Position of the subvolume path in a list line (`... path <path>`).
const PATH_FIELD: usize = 8;

/// A subvolume as reported by `btrfs subvolume list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subvolume {
    /// Numeric subvolume id, kept as text to match qgroup ids verbatim
    pub id: String,
    /// Path of the subvolume relative to the filesystem root
    pub name: String,
}

impl Subvolume {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Parse subvolume list output into `(id, name)` pairs.
///
/// Lines look like `ID 258 gen 12 top level 5 path home`. Fields are split on
/// single spaces at fixed positions; the path field runs to the end of the
/// line so names containing spaces are kept whole. Blank lines are skipped
/// and the input order is preserved.
pub fn parse_subvolume_list(output: &str) -> Result<Vec<Subvolume>> {
    output
        .lines()
        .map(|line| line.trim_end())
        .filter(|line| !line.is_empty())
        .map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Result<Subvolume> {
    let fields: Vec<&str> = line.splitn(PATH_FIELD + 1, ' ').collect();
    match (fields.get(ID_FIELD), fields.get(PATH_FIELD)) {
        (Some(id), Some(path)) if !id.is_empty() && !path.is_empty() => {
            Ok(Subvolume::new(*id, *path))
        }
        _ => Err(BtrfsduError::MalformedListLine(line.to_string())),
    }
}
