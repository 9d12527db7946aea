//! Group address directory
//!
//! Resolves group names and datapoint types from a group address export
//! produced by ETS ("Export Group Addresses", CSV, 3/1 format):
//!
//! ```text
//! "Group name","Address","Central","Unfiltered","Description","DatapointType","Security"
//! "Kitchen light","1/1/1","","","","DPST-1-1","Auto"
//! ```
//!
//! The file is not cached: every lookup re-opens it and scans from the first
//! data row, so edits to the export are picked up while the monitor runs.

use crate::types::{DecoderError, Result};
use std::path::{Path, PathBuf};

/// Number of fields in a group address row
const FIELD_COUNT: usize = 7;
/// Column holding the group name
const NAME_FIELD: usize = 0;
/// Column holding the group address text (`main/middle/sub`)
const ADDRESS_FIELD: usize = 1;
/// Column holding the datapoint type tag
const DATAPOINT_TYPE_FIELD: usize = 5;

/// Name and datapoint type of a group
///
/// Both fields are empty when the group is not listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupInfo {
    /// Human-assigned group name
    pub name: String,
    /// ETS datapoint type tag (e.g. `DPST-1-1`)
    pub datapoint_type: String,
}

impl GroupInfo {
    /// True if the group was not found in the directory
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.datapoint_type.is_empty()
    }
}

/// Group address file used to enrich decoded telegrams
#[derive(Debug, Clone)]
pub struct GroupDirectory {
    path: PathBuf,
}

impl GroupDirectory {
    /// Create a directory backed by the CSV export at `path`
    ///
    /// The file is not opened here; a missing or unreadable file surfaces on
    /// the first lookup.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        log::info!("Using group address file: {:?}", path);
        Self { path }
    }

    /// Path of the backing CSV file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up a group by its canonical `main/middle/sub` text
    pub fn lookup(&self, group: &str) -> Result<GroupInfo> {
        lookup_group(&self.path, group)
    }
}

/// Scan the CSV export at `path` for the first row describing `group`
///
/// The header row is skipped. A row matches only if it has exactly seven
/// fields and its address field equals `group` byte for byte.
pub fn lookup_group(path: &Path, group: &str) -> Result<GroupInfo> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| directory_error(path, e))?;

    for record in reader.byte_records() {
        let record = record.map_err(|e| directory_error(path, e))?;

        if record.len() != FIELD_COUNT || &record[ADDRESS_FIELD] != group.as_bytes() {
            continue;
        }

        let info = GroupInfo {
            name: decode_field(&record[NAME_FIELD]),
            datapoint_type: decode_field(&record[DATAPOINT_TYPE_FIELD]),
        };
        log::trace!("Group {} resolved to {:?}", group, info);
        return Ok(info);
    }

    log::trace!("Group {} not found in {:?}", group, path);
    Ok(GroupInfo::default())
}

/// Decode a CSV field as UTF-8, falling back to Latin-1
fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn directory_error(path: &Path, e: csv::Error) -> DecoderError {
    DecoderError::Directory(format!("{:?}: {}", path, e))
}
