//! Request/response layer over the record store.
//!
//! Every user-facing intent is a [`Request`]; [`RecordService::handle`]
//! runs it against the store and returns a display-ready [`Reply`]. No
//! error escapes this layer.

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Error;
use crate::storage::{RecordStore, StoreStats};
use crate::student::{Student, StudentFields};

/// Raw fields for a new record, as collected at the console.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    /// Roll number; must not be blank.
    pub roll_number: String,
    /// Name.
    pub name: String,
    /// Email.
    pub email: String,
    /// GPA.
    pub gpa: f64,
    /// Course.
    pub course: String,
}

/// A single user-facing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Add a record.
    Create(NewStudent),
    /// Show every record.
    List,
    /// Look up one record by roll number.
    Search {
        /// Roll number to find.
        roll_number: String,
    },
    /// Replace the mutable fields of a record.
    Update {
        /// Roll number of the record to change.
        roll_number: String,
        /// The new field values.
        fields: StudentFields,
    },
    /// Remove a record.
    Delete {
        /// Roll number of the record to remove.
        roll_number: String,
    },
    /// Show records in a course, ignoring case.
    FilterByCourse {
        /// Course to match.
        course: String,
    },
    /// Show totals and the average GPA.
    Statistics,
}

/// Outcome class of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The request did what was asked.
    Success,
    /// The request was refused or could not be saved.
    Failure,
    /// The roll number named by the request is not stored.
    NotFound,
}

/// Display-ready result of a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    /// Outcome class.
    pub status: Status,
    /// Human-readable summary.
    pub message: String,
    /// Records affected or matched, in store order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<Student>,
    /// Aggregate figures, for statistics requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<StoreStats>,
}

impl Reply {
    fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            records: Vec::new(),
            stats: None,
        }
    }

    fn success(message: impl Into<String>) -> Self {
        Self::new(Status::Success, message)
    }

    fn with_records(mut self, records: Vec<Student>) -> Self {
        self.records = records;
        self
    }

    fn from_error(err: &Error) -> Self {
        match err {
            Error::DuplicateKey { .. } => {
                Self::new(Status::Failure, "Student with Roll Number already exists!")
            }
            Error::NotFound { .. } => Self::new(Status::NotFound, "Student not found!"),
            other => {
                warn!("Request failed: {other}");
                Self::new(Status::Failure, format!("Error: {other}"))
            }
        }
    }

    /// Check if the request succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

/// Runs requests against a [`RecordStore`].
#[derive(Debug)]
pub struct RecordService {
    store: RecordStore,
}

impl RecordService {
    /// Wrap a store.
    #[must_use]
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// Read-only access to the underlying store.
    #[must_use]
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Run one request.
    pub fn handle(&mut self, request: Request) -> Reply {
        debug!("Handling {:?}", request);
        match request {
            Request::Create(new) => self.create_student(new),
            Request::List => self.all_students(),
            Request::Search { roll_number } => self.search_student(&roll_number),
            Request::Update {
                roll_number,
                fields,
            } => self.update_student(&roll_number, fields),
            Request::Delete { roll_number } => self.delete_student(&roll_number),
            Request::FilterByCourse { course } => self.filter_by_course(&course),
            Request::Statistics => self.statistics(),
        }
    }

    /// Add a record built from raw fields.
    pub fn create_student(&mut self, new: NewStudent) -> Reply {
        if new.roll_number.trim().is_empty() {
            return Reply::from_error(&Error::invalid_input(
                "roll number",
                "must not be blank",
            ));
        }

        let student = Student::new(new.roll_number, new.name, new.email, new.gpa, new.course);
        match self.store.create(student.clone()) {
            Ok(()) => Reply::success("Student added successfully!").with_records(vec![student]),
            Err(e) => Reply::from_error(&e),
        }
    }

    /// Every record, in insertion order.
    #[must_use]
    pub fn all_students(&self) -> Reply {
        let students = self.store.list();
        if students.is_empty() {
            return Reply::success("No students found.");
        }
        Reply::success(format!("{} student(s)", students.len())).with_records(students)
    }

    /// Look up one record.
    #[must_use]
    pub fn search_student(&self, roll_number: &str) -> Reply {
        match self.store.find_by_key(roll_number) {
            Some(student) => Reply::success("Student Found:").with_records(vec![student]),
            None => Reply::from_error(&Error::not_found(roll_number)),
        }
    }

    /// Replace the mutable fields of a record.
    pub fn update_student(&mut self, roll_number: &str, fields: StudentFields) -> Reply {
        match self.store.update(roll_number, fields) {
            Ok(updated) => {
                Reply::success("Student updated successfully!").with_records(vec![updated])
            }
            Err(e) => Reply::from_error(&e),
        }
    }

    /// Remove a record.
    pub fn delete_student(&mut self, roll_number: &str) -> Reply {
        match self.store.delete(roll_number) {
            Ok(removed) => {
                Reply::success("Student deleted successfully!").with_records(vec![removed])
            }
            Err(e) => Reply::from_error(&e),
        }
    }

    /// Records in a course, ignoring case.
    #[must_use]
    pub fn filter_by_course(&self, course: &str) -> Reply {
        let students = self.store.find_by_course(course);
        if students.is_empty() {
            return Reply::success(format!("No students found in course: {course}"));
        }
        Reply::success(format!("Students in course: {course}")).with_records(students)
    }

    /// Totals and average GPA.
    #[must_use]
    pub fn statistics(&self) -> Reply {
        let mut reply = Reply::success("Statistics");
        reply.stats = Some(self.store.stats());
        reply
    }
}
