//! Storage layer for rollbook.
//!
//! This module provides the record store: an in-memory, insertion-ordered
//! collection of students that is written back to a single snapshot file
//! after every successful mutation.

pub mod snapshot;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::student::{Student, StudentFields};

/// Options controlling how a [`RecordStore`] persists its collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Indent the snapshot file for human readers.
    pub pretty: bool,
    /// Undo the in-memory change when the snapshot cannot be written.
    pub rollback_on_write_failure: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            rollback_on_write_failure: true,
        }
    }
}

/// How the collection was obtained when the store was opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No data file existed; the store started empty.
    Fresh,
    /// The data file was read successfully.
    Loaded {
        /// Number of records read.
        records: usize,
    },
    /// The data file existed but was unreadable; the store started empty.
    Recovered {
        /// Why the file could not be used.
        reason: String,
    },
    /// The store has no backing file.
    InMemory,
}

/// What to do to reverse a mutation whose snapshot could not be written.
#[derive(Debug)]
enum Undo {
    Create,
    Update { index: usize, previous: Student },
    Delete { index: usize, removed: Student },
}

/// Store for student records.
///
/// Owns the full collection. Readers get clones; every mutation goes
/// through [`create`](Self::create), [`update`](Self::update) or
/// [`delete`](Self::delete), each of which rewrites the whole data file on
/// success.
#[derive(Debug)]
pub struct RecordStore {
    /// Path to the data file, `None` for an in-memory store.
    path: Option<PathBuf>,
    /// The records, in insertion order.
    students: Vec<Student>,
    options: StoreOptions,
    load_outcome: LoadOutcome,
}

impl RecordStore {
    /// Open the store backed by the file at `path`.
    ///
    /// A missing file yields an empty store. A file that exists but cannot
    /// be parsed is logged and also yields an empty store; it will be
    /// replaced by the next successful mutation.
    pub fn open(path: impl AsRef<Path>, options: StoreOptions) -> Self {
        let path = path.as_ref().to_path_buf();

        debug!("Opening record store at {}", path.display());
        let (students, load_outcome) = match snapshot::read(&path) {
            Ok(Some(students)) => {
                info!(
                    "Loaded {} records from {}",
                    students.len(),
                    path.display()
                );
                let records = students.len();
                (students, LoadOutcome::Loaded { records })
            }
            Ok(None) => {
                info!("No data file at {}, starting fresh", path.display());
                (Vec::new(), LoadOutcome::Fresh)
            }
            Err(e) => {
                warn!("{e}; starting with an empty store");
                (
                    Vec::new(),
                    LoadOutcome::Recovered {
                        reason: e.to_string(),
                    },
                )
            }
        };

        Self {
            path: Some(path),
            students,
            options,
            load_outcome,
        }
    }

    /// Create a store with no backing file.
    #[must_use]
    pub fn open_in_memory() -> Self {
        Self {
            path: None,
            students: Vec::new(),
            options: StoreOptions::default(),
            load_outcome: LoadOutcome::InMemory,
        }
    }

    /// Get the path to the data file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// How the collection was obtained at open time.
    #[must_use]
    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.load_outcome
    }

    /// Add a new record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] if the roll number is already stored,
    /// or [`Error::StorageWrite`] if the snapshot could not be written and
    /// the change was rolled back.
    pub fn create(&mut self, student: Student) -> Result<()> {
        if self.position(&student.roll_number).is_some() {
            debug!("Rejecting duplicate roll number {}", student.roll_number);
            return Err(Error::duplicate_key(student.roll_number));
        }

        debug!("Creating record {}", student.roll_number);
        self.students.push(student);
        self.persist(Undo::Create)
    }

    /// Get a copy of every record, in insertion order.
    #[must_use]
    pub fn list(&self) -> Vec<Student> {
        self.students.clone()
    }

    /// Get the record with the given roll number.
    #[must_use]
    pub fn find_by_key(&self, roll_number: &str) -> Option<Student> {
        self.students
            .iter()
            .find(|s| s.roll_number == roll_number)
            .cloned()
    }

    /// Get every record in `course`, ignoring case, in insertion order.
    #[must_use]
    pub fn find_by_course(&self, course: &str) -> Vec<Student> {
        self.students
            .iter()
            .filter(|s| s.in_course(course))
            .cloned()
            .collect()
    }

    /// Overwrite the mutable fields of an existing record.
    ///
    /// Returns the record as stored after the update.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the roll number is not stored, or
    /// [`Error::StorageWrite`] if the snapshot could not be written and the
    /// change was rolled back.
    pub fn update(&mut self, roll_number: &str, fields: StudentFields) -> Result<Student> {
        let index = self
            .position(roll_number)
            .ok_or_else(|| Error::not_found(roll_number))?;

        debug!("Updating record {}", roll_number);
        let previous = self.students[index].clone();
        self.students[index].apply(fields);
        let updated = self.students[index].clone();

        self.persist(Undo::Update { index, previous })?;
        Ok(updated)
    }

    /// Remove a record.
    ///
    /// Returns the removed record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the roll number is not stored, or
    /// [`Error::StorageWrite`] if the snapshot could not be written and the
    /// change was rolled back.
    pub fn delete(&mut self, roll_number: &str) -> Result<Student> {
        let index = self
            .position(roll_number)
            .ok_or_else(|| Error::not_found(roll_number))?;

        debug!("Deleting record {}", roll_number);
        let removed = self.students.remove(index);

        self.persist(Undo::Delete {
            index,
            removed: removed.clone(),
        })?;
        Ok(removed)
    }

    /// Count stored records.
    #[must_use]
    pub fn count(&self) -> usize {
        self.students.len()
    }

    /// Mean GPA over all records, `0.0` when the store is empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_gpa(&self) -> f64 {
        if self.students.is_empty() {
            return 0.0;
        }
        let total: f64 = self.students.iter().map(|s| s.gpa).sum();
        total / self.students.len() as f64
    }

    /// Get store statistics.
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        let data_size_bytes = self
            .path
            .as_ref()
            .and_then(|p| std::fs::metadata(p).ok())
            .map_or(0, |m| m.len());

        StoreStats {
            total_students: self.count(),
            average_gpa: self.average_gpa(),
            data_path: self.path.clone(),
            data_size_bytes,
        }
    }

    fn position(&self, roll_number: &str) -> Option<usize> {
        self.students
            .iter()
            .position(|s| s.roll_number == roll_number)
    }

    /// Write the collection after a mutation, reverting it on failure if so
    /// configured.
    fn persist(&mut self, undo: Undo) -> Result<()> {
        let Some(path) = self.path.clone() else {
            return Ok(());
        };

        let Err(source) = snapshot::write(&path, &self.students, self.options.pretty) else {
            return Ok(());
        };

        if self.options.rollback_on_write_failure {
            warn!(
                "Could not save {}: {source}; reverting in-memory change",
                path.display()
            );
            self.revert(undo);
            Err(Error::storage_write(path, source))
        } else {
            error!(
                "Could not save {}: {source}; in-memory records are now ahead of the file",
                path.display()
            );
            Ok(())
        }
    }

    fn revert(&mut self, undo: Undo) {
        match undo {
            Undo::Create => {
                self.students.pop();
            }
            Undo::Update { index, previous } => {
                self.students[index] = previous;
            }
            Undo::Delete { index, removed } => {
                self.students.insert(index, removed);
            }
        }
    }
}

/// Statistics about the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreStats {
    /// Number of stored records.
    pub total_students: usize,
    /// Mean GPA, `0.0` when empty.
    pub average_gpa: f64,
    /// Path to the data file, if any.
    pub data_path: Option<PathBuf>,
    /// Size of the data file in bytes.
    pub data_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn scratch() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("students.json");
        (dir, path)
    }

    fn create_test_store() -> RecordStore {
        RecordStore::open_in_memory()
    }

    fn alice() -> Student {
        Student::new("R1", "Alice", "a@x.com", 3.5, "CSE")
    }

    fn fields(name: &str, gpa: f64) -> StudentFields {
        StudentFields {
            name: name.to_string(),
            email: "new@x.com".to_string(),
            gpa,
            course: "ECE".to_string(),
        }
    }

    fn roll_numbers(store: &RecordStore) -> Vec<String> {
        store.list().into_iter().map(|s| s.roll_number).collect()
    }

    /// A store whose data file can never be written: its parent is a file.
    fn unwritable_store(rollback: bool) -> (RecordStore, TempDir) {
        let (dir, blocker) = scratch();
        std::fs::write(&blocker, b"blocker").unwrap();
        let store = RecordStore::open(
            blocker.join("students.json"),
            StoreOptions {
                pretty: false,
                rollback_on_write_failure: rollback,
            },
        );
        (store, dir)
    }

    #[test]
    fn test_create_and_count() {
        let mut store = create_test_store();
        store.create(alice()).unwrap();
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_create_duplicate_rejected() {
        let mut store = create_test_store();
        store.create(alice()).unwrap();

        let err = store
            .create(Student::new("R1", "Other", "o@x.com", 2.0, "ME"))
            .unwrap_err();

        assert!(err.is_duplicate_key());
        assert_eq!(store.count(), 1);
        assert_eq!(store.find_by_key("R1").unwrap().name, "Alice");
    }

    #[test]
    fn test_no_duplicate_roll_numbers_after_many_creates() {
        let mut store = create_test_store();
        for i in 0..20 {
            let roll = format!("R{}", i % 7);
            let _ = store.create(Student::new(roll, "N", "e", 1.0, "CSE"));
        }

        let mut rolls = roll_numbers(&store);
        assert_eq!(rolls.len(), 7);
        rolls.sort();
        rolls.dedup();
        assert_eq!(rolls.len(), 7);
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let mut store = create_test_store();
        for roll in ["R3", "R1", "R2"] {
            store
                .create(Student::new(roll, "N", "e", 1.0, "CSE"))
                .unwrap();
        }
        assert_eq!(roll_numbers(&store), ["R3", "R1", "R2"]);
    }

    #[test]
    fn test_list_is_independent_copy() {
        let mut store = create_test_store();
        store.create(alice()).unwrap();

        let mut snapshot = store.list();
        snapshot[0].name = "Mallory".to_string();
        snapshot.clear();

        assert_eq!(store.count(), 1);
        assert_eq!(store.find_by_key("R1").unwrap().name, "Alice");
    }

    #[test]
    fn test_find_by_key_missing() {
        let store = create_test_store();
        assert!(store.find_by_key("R1").is_none());
    }

    #[test]
    fn test_find_by_course_case_insensitive() {
        let mut store = create_test_store();
        store.create(alice()).unwrap();
        store
            .create(Student::new("R2", "Bob", "b@x.com", 3.0, "ECE"))
            .unwrap();
        store
            .create(Student::new("R3", "Cara", "c@x.com", 2.5, "cse"))
            .unwrap();

        let lower = store.find_by_course("cse");
        let upper = store.find_by_course("CSE");
        assert_eq!(lower, upper);
        assert_eq!(
            lower.iter().map(|s| s.roll_number.as_str()).collect::<Vec<_>>(),
            ["R1", "R3"]
        );

        let ece = store.find_by_course("ece");
        assert_eq!(ece.len(), 1);
        assert_eq!(ece[0].roll_number, "R2");

        assert!(store.find_by_course("ME").is_empty());
    }

    #[test]
    fn test_update_preserves_key() {
        let mut store = create_test_store();
        store.create(alice()).unwrap();

        let updated = store.update("R1", fields("Alicia", 3.8)).unwrap();
        assert_eq!(updated.roll_number, "R1");

        let stored = store.find_by_key("R1").unwrap();
        assert_eq!(stored.roll_number, "R1");
        assert_eq!(stored.name, "Alicia");
        assert_eq!(stored.email, "new@x.com");
        assert_eq!(stored.gpa.to_bits(), 3.8_f64.to_bits());
        assert_eq!(stored.course, "ECE");
    }

    #[test]
    fn test_update_missing() {
        let mut store = create_test_store();
        store.create(alice()).unwrap();

        let err = store.update("R2", fields("X", 1.0)).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.find_by_key("R1").unwrap(), alice());
    }

    #[test]
    fn test_delete_is_exact() {
        let mut store = create_test_store();
        for roll in ["R1", "R2", "R3", "R4"] {
            store
                .create(Student::new(roll, "N", "e", 1.0, "CSE"))
                .unwrap();
        }

        let removed = store.delete("R2").unwrap();
        assert_eq!(removed.roll_number, "R2");
        assert_eq!(roll_numbers(&store), ["R1", "R3", "R4"]);
    }

    #[test]
    fn test_delete_missing() {
        let mut store = create_test_store();
        store.create(alice()).unwrap();

        let err = store.delete("R2").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_average_gpa_empty() {
        let store = create_test_store();
        assert_eq!(store.average_gpa().to_bits(), 0.0_f64.to_bits());
    }

    #[test]
    fn test_average_gpa() {
        let mut store = create_test_store();
        for (roll, gpa) in [("R1", 3.0), ("R2", 4.0), ("R3", 2.0), ("R4", 3.5)] {
            store
                .create(Student::new(roll, "N", "e", gpa, "CSE"))
                .unwrap();
        }
        assert!((store.average_gpa() - 3.125).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stats_in_memory() {
        let mut store = create_test_store();
        store.create(alice()).unwrap();

        let stats = store.stats();
        assert_eq!(stats.total_students, 1);
        assert!((stats.average_gpa - 3.5).abs() < f64::EPSILON);
        assert!(stats.data_path.is_none());
        assert_eq!(stats.data_size_bytes, 0);
    }

    #[test]
    fn test_open_in_memory_outcome() {
        let store = create_test_store();
        assert_eq!(store.load_outcome(), &LoadOutcome::InMemory);
        assert!(store.path().is_none());
    }

    #[test]
    fn test_open_missing_file_is_fresh() {
        let (_dir, path) = scratch();
        let store = RecordStore::open(&path, StoreOptions::default());

        assert_eq!(store.load_outcome(), &LoadOutcome::Fresh);
        assert_eq!(store.count(), 0);
        assert_eq!(store.path(), Some(path.as_path()));
        // Opening alone never writes.
        assert!(!path.exists());
    }

    #[test]
    fn test_mutations_persist_across_reopen() {
        let (_dir, path) = scratch();

        let mut store = RecordStore::open(&path, StoreOptions::default());
        store.create(alice()).unwrap();
        store
            .create(Student::new("R2", "Bob", "b@x.com", 0.1 + 0.2, "ECE"))
            .unwrap();
        store
            .create(Student::new("R3", "Cara", "c@x.com", 2.5, "ME"))
            .unwrap();
        store.update("R1", fields("Alicia", 3.8)).unwrap();
        store.delete("R3").unwrap();
        let expected = store.list();
        drop(store);

        let reopened = RecordStore::open(&path, StoreOptions::default());
        assert_eq!(reopened.load_outcome(), &LoadOutcome::Loaded { records: 2 });
        assert_eq!(reopened.list(), expected);
    }

    #[test]
    fn test_roundtrip_empty_collection() {
        let (_dir, path) = scratch();

        let mut store = RecordStore::open(&path, StoreOptions::default());
        store.create(alice()).unwrap();
        store.delete("R1").unwrap();
        drop(store);

        let reopened = RecordStore::open(&path, StoreOptions::default());
        assert_eq!(reopened.load_outcome(), &LoadOutcome::Loaded { records: 0 });
        assert!(reopened.list().is_empty());
    }

    #[test]
    fn test_failed_create_not_persisted() {
        let (_dir, path) = scratch();

        let mut store = RecordStore::open(&path, StoreOptions::default());
        assert!(store.delete("R1").is_err());
        assert!(!path.exists());

        store.create(alice()).unwrap();
        assert!(store.create(alice()).is_err());
        drop(store);

        let reopened = RecordStore::open(&path, StoreOptions::default());
        assert_eq!(reopened.count(), 1);
    }

    #[test]
    fn test_open_corrupt_file_recovers_empty() {
        let (_dir, path) = scratch();
        std::fs::write(&path, "{ this is not a snapshot").unwrap();

        let mut store = RecordStore::open(&path, StoreOptions::default());
        assert!(matches!(
            store.load_outcome(),
            LoadOutcome::Recovered { .. }
        ));
        assert_eq!(store.count(), 0);

        // The store stays usable and the next write replaces the bad file.
        store.create(alice()).unwrap();
        let reopened = RecordStore::open(&path, StoreOptions::default());
        assert_eq!(reopened.list(), vec![alice()]);
    }

    #[test]
    fn test_open_repeated_roll_number_recovers_empty() {
        let (_dir, path) = scratch();
        std::fs::write(
            &path,
            r#"{"format_version": 1, "students": [
                {"roll_number": "R1", "name": "A", "email": "", "gpa": 2.0, "course": "CE"},
                {"roll_number": "R1", "name": "B", "email": "", "gpa": 3.0, "course": "CE"}
            ]}"#,
        )
        .unwrap();

        let mut store = RecordStore::open(&path, StoreOptions::default());
        assert!(matches!(
            store.load_outcome(),
            LoadOutcome::Recovered { .. }
        ));
        assert_eq!(store.count(), 0);

        store.create(alice()).unwrap();
        store.delete("R1").unwrap();
        assert!(store.find_by_key("R1").is_none());
    }

    #[test]
    fn test_write_failure_rolls_back_create() {
        let (mut store, _dir) = unwritable_store(true);

        let err = store.create(alice()).unwrap_err();
        assert!(matches!(err, Error::StorageWrite { .. }));
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_write_failure_rolls_back_update_and_delete() {
        let (mut store, _dir) = unwritable_store(false);
        store.create(alice()).unwrap();
        store
            .create(Student::new("R2", "Bob", "b@x.com", 3.0, "ECE"))
            .unwrap();
        store.options.rollback_on_write_failure = true;

        let err = store.update("R1", fields("Alicia", 3.8)).unwrap_err();
        assert!(matches!(err, Error::StorageWrite { .. }));
        assert_eq!(store.find_by_key("R1").unwrap(), alice());

        let err = store.delete("R1").unwrap_err();
        assert!(matches!(err, Error::StorageWrite { .. }));
        assert_eq!(roll_numbers(&store), ["R1", "R2"]);
    }

    #[test]
    fn test_write_failure_without_rollback_keeps_change() {
        let (mut store, _dir) = unwritable_store(false);

        store.create(alice()).unwrap();
        assert_eq!(store.count(), 1);
        store.update("R1", fields("Alicia", 3.8)).unwrap();
        assert_eq!(store.find_by_key("R1").unwrap().name, "Alicia");
    }

    #[test]
    fn test_stats_file_size() {
        let (_dir, path) = scratch();

        let mut store = RecordStore::open(&path, StoreOptions::default());
        store.create(alice()).unwrap();

        let stats = store.stats();
        assert_eq!(stats.data_path.as_deref(), Some(path.as_path()));
        assert!(stats.data_size_bytes > 0);
    }

    #[test]
    fn test_store_stats_clone() {
        let stats = StoreStats {
            total_students: 5,
            average_gpa: 3.0,
            data_path: None,
            data_size_bytes: 512,
        };
        let cloned = stats.clone();
        assert_eq!(stats, cloned);
    }
}
