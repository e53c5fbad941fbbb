//! Score aggregation.
//!
//! Merges fetched score records with the roster so every record carries
//! a display name.

use crate::models::{Identity, NamedRecord, ScoreRecord};
use std::collections::HashMap;

/// Display name used for handles that are not on the roster.
pub const UNKNOWN_NAME: &str = "N/A";

/// Resolve each record's handle to its roster display name.
///
/// Records are neither deduplicated nor reordered. When a handle appears
/// more than once in the roster, the first row wins.
pub fn attach_names(records: Vec<ScoreRecord>, roster: &[Identity]) -> Vec<NamedRecord> {
    let mut names: HashMap<&str, &str> = HashMap::with_capacity(roster.len());
    for identity in roster {
        names
            .entry(identity.handle.as_str())
            .or_insert(identity.name.as_str());
    }

    records
        .into_iter()
        .map(|record| {
            let name = names
                .get(record.handle.as_str())
                .copied()
                .unwrap_or(UNKNOWN_NAME)
                .to_string();
            NamedRecord { record, name }
        })
        .collect()
}
