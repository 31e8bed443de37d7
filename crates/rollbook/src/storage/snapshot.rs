//! On-disk snapshot format for rollbook.
//!
//! The whole collection is stored as one JSON document carrying a format
//! version, so files written by a future layout are refused instead of
//! being misread.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::student::Student;

/// The current snapshot format version.
pub const CURRENT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    format_version: u32,
    saved_at: DateTime<Utc>,
    students: &'a [Student],
}

#[derive(Deserialize)]
struct Snapshot {
    format_version: u32,
    #[serde(default)]
    saved_at: Option<DateTime<Utc>>,
    students: Vec<Student>,
}

/// Read the collection stored at `path`.
///
/// Returns `Ok(None)` if no file exists there.
///
/// # Errors
///
/// Returns [`Error::StorageLoad`] if the file exists but cannot be read,
/// is not a valid snapshot, was written with another format version, or
/// holds two records with the same roll number.
pub fn read(path: &Path) -> Result<Option<Vec<Student>>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(load_error(path, e.to_string())),
    };

    let snapshot: Snapshot =
        serde_json::from_slice(&bytes).map_err(|e| load_error(path, e.to_string()))?;

    if snapshot.format_version != CURRENT_VERSION {
        return Err(load_error(
            path,
            format!(
                "unsupported format version {} (expected {CURRENT_VERSION})",
                snapshot.format_version
            ),
        ));
    }

    let mut seen = HashSet::with_capacity(snapshot.students.len());
    if let Some(dup) = snapshot
        .students
        .iter()
        .find(|s| !seen.insert(s.roll_number.as_str()))
    {
        return Err(load_error(
            path,
            format!("roll number '{}' appears more than once", dup.roll_number),
        ));
    }

    if let Some(saved_at) = snapshot.saved_at {
        debug!(
            "Read {} records saved at {}",
            snapshot.students.len(),
            saved_at.to_rfc3339()
        );
    }
    Ok(Some(snapshot.students))
}

/// Replace the file at `path` with a snapshot of `students`.
///
/// The document is written to a sibling temporary file first and then
/// renamed into place, so readers never observe a half-written file.
/// Missing parent directories are created.
///
/// # Errors
///
/// Returns an error if a directory cannot be created, or if serialization,
/// the write or the rename fails.
pub fn write(path: &Path, students: &[Student], pretty: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let snapshot = SnapshotRef {
        format_version: CURRENT_VERSION,
        saved_at: Utc::now(),
        students,
    };
    let data = if pretty {
        serde_json::to_vec_pretty(&snapshot)?
    } else {
        serde_json::to_vec(&snapshot)?
    };

    let tmp = temp_path(path);
    if let Err(e) = fs::write(&tmp, data).and_then(|()| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }

    trace!("Wrote {} records to {}", students.len(), path.display());
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn load_error(path: &Path, message: String) -> Error {
    Error::StorageLoad {
        path: path.to_path_buf(),
        message,
    }
}
