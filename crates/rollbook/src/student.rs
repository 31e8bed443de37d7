//! Core record types for rollbook.
//!
//! This module defines the student record and the field sets used to
//! replace or partially edit one.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A stored student.
///
/// The roll number is the record's key: it is unique within a store and
/// never changes once the record has been created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Unique identifying key.
    pub roll_number: String,

    /// Full name.
    pub name: String,

    /// Contact email, stored as typed.
    pub email: String,

    /// Grade point average. No range is enforced.
    pub gpa: f64,

    /// Course code, compared case-insensitively when filtering.
    pub course: String,
}

impl Student {
    /// Create a new student record.
    #[must_use]
    pub fn new(
        roll_number: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        gpa: f64,
        course: impl Into<String>,
    ) -> Self {
        Self {
            roll_number: roll_number.into(),
            name: name.into(),
            email: email.into(),
            gpa,
            course: course.into(),
        }
    }

    /// Check if this record's course matches `course`, ignoring case.
    #[must_use]
    pub fn in_course(&self, course: &str) -> bool {
        self.course.to_lowercase() == course.to_lowercase()
    }

    /// The mutable fields of this record.
    #[must_use]
    pub fn fields(&self) -> StudentFields {
        StudentFields {
            name: self.name.clone(),
            email: self.email.clone(),
            gpa: self.gpa,
            course: self.course.clone(),
        }
    }

    /// Overwrite every mutable field, leaving the roll number alone.
    pub fn apply(&mut self, fields: StudentFields) {
        self.name = fields.name;
        self.email = fields.email;
        self.gpa = fields.gpa;
        self.course = fields.course;
    }
}

/// Replacement values for every mutable field of a [`Student`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentFields {
    /// New name.
    pub name: String,
    /// New email.
    pub email: String,
    /// New GPA.
    pub gpa: f64,
    /// New course.
    pub course: String,
}

/// A partial edit: `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentPatch {
    /// New name, if changing.
    pub name: Option<String>,
    /// New email, if changing.
    pub email: Option<String>,
    /// New GPA, if changing.
    pub gpa: Option<f64>,
    /// New course, if changing.
    pub course: Option<String>,
}

impl StudentPatch {
    /// Check if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.gpa.is_none() && self.course.is_none()
    }

    /// Resolve the patch against `current` into a full replacement set.
    #[must_use]
    pub fn resolve(self, current: &Student) -> StudentFields {
        StudentFields {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            email: self.email.unwrap_or_else(|| current.email.clone()),
            gpa: self.gpa.unwrap_or(current.gpa),
            course: self.course.unwrap_or_else(|| current.course.clone()),
        }
    }
}

/// Parse a GPA typed at the console.
///
/// Surrounding whitespace is ignored. Non-finite values are refused because
/// the data file cannot represent them.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the text is not a finite number.
pub fn parse_gpa(input: &str) -> Result<f64> {
    let input = input.trim();
    let gpa: f64 = input
        .parse()
        .map_err(|_| Error::invalid_input("gpa", format!("'{input}' is not a number")))?;
    if !gpa.is_finite() {
        return Err(Error::invalid_input("gpa", "must be a finite number"));
    }
    Ok(gpa)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Student {
        Student::new("R1", "Alice", "a@x.com", 3.5, "CSE")
    }

    #[test]
    fn test_student_new() {
        let student = alice();
        assert_eq!(student.roll_number, "R1");
        assert_eq!(student.name, "Alice");
        assert_eq!(student.email, "a@x.com");
        assert!((student.gpa - 3.5).abs() < f64::EPSILON);
        assert_eq!(student.course, "CSE");
    }

    #[test]
    fn test_in_course_ignores_case() {
        let student = alice();
        assert!(student.in_course("cse"));
        assert!(student.in_course("CSE"));
        assert!(student.in_course("Cse"));
        assert!(!student.in_course("ECE"));
        assert!(!student.in_course("CS"));
    }

    #[test]
    fn test_apply_keeps_roll_number() {
        let mut student = alice();
        student.apply(StudentFields {
            name: "Alicia".to_string(),
            email: "alicia@x.com".to_string(),
            gpa: 3.8,
            course: "ECE".to_string(),
        });

        assert_eq!(student.roll_number, "R1");
        assert_eq!(student.name, "Alicia");
        assert_eq!(student.email, "alicia@x.com");
        assert!((student.gpa - 3.8).abs() < f64::EPSILON);
        assert_eq!(student.course, "ECE");
    }

    #[test]
    fn test_fields_roundtrip_through_apply() {
        let original = alice();
        let mut copy = Student::new("R1", "", "", 0.0, "");
        copy.apply(original.fields());
        assert_eq!(copy, original);
    }

    #[test]
    fn test_patch_resolve_partial() {
        let patch = StudentPatch {
            name: Some("Alicia".to_string()),
            gpa: Some(3.8),
            ..StudentPatch::default()
        };
        let fields = patch.resolve(&alice());

        assert_eq!(fields.name, "Alicia");
        assert_eq!(fields.email, "a@x.com");
        assert!((fields.gpa - 3.8).abs() < f64::EPSILON);
        assert_eq!(fields.course, "CSE");
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(StudentPatch::default().is_empty());
        let patch = StudentPatch {
            course: Some("ME".to_string()),
            ..StudentPatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_parse_gpa() {
        assert_eq!(parse_gpa("3.5").unwrap().to_bits(), 3.5_f64.to_bits());
        assert_eq!(parse_gpa("  4 ").unwrap().to_bits(), 4.0_f64.to_bits());
        assert_eq!(parse_gpa("-0.5").unwrap().to_bits(), (-0.5_f64).to_bits());
    }

    #[test]
    fn test_parse_gpa_rejects_garbage() {
        let err = parse_gpa("three").unwrap_err();
        assert!(matches!(err, Error::InvalidInput { field: "gpa", .. }));
        assert!(parse_gpa("").is_err());
        assert!(parse_gpa("inf").is_err());
        assert!(parse_gpa("NaN").is_err());
    }

    #[test]
    fn test_student_serialization() {
        let student = alice();
        let json = serde_json::to_string(&student).unwrap();
        assert!(json.contains("\"roll_number\":\"R1\""));

        let deserialized: Student = serde_json::from_str(&json).unwrap();
        assert_eq!(student, deserialized);
    }
}
