// Copyright (C) 2026 Rollbook Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Account roles.
///
/// Roles gate mutation endpoints: only Admin accounts may create, update, or
/// delete records. The enumeration is closed; any role string that is not one
/// of the variants is rejected at parse time rather than compared ad hoc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Admin: full access, including all record mutations.
    Admin,
    /// Teacher: read/list access only.
    Teacher,
}

impl Role {
    /// Converts this role to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Teacher => "Teacher",
        }
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Self::Admin),
            "Teacher" => Ok(Self::Teacher),
            _ => Err(DomainError::InvalidRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Storage row identifier.
    pub id: i64,
    /// The student's first name.
    pub first_name: String,
    /// The student's last name.
    pub last_name: String,
    /// The institution-wide student number. Globally unique.
    pub student_id: String,
    /// Contact email address.
    pub email: String,
    /// Date the student was first entered, ISO 8601. Set once at creation
    /// and never updated afterwards.
    pub enrolled_date: String,
}

/// A persisted course record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Storage row identifier.
    pub id: i64,
    /// Course name.
    pub name: String,
    /// The course code (e.g. "CS101"). Globally unique.
    pub code: String,
    /// Optional teacher name. Free text, not a reference to an account.
    pub teacher: Option<String>,
}

/// A persisted enrollment record tying one student to one course.
///
/// Enrollments are owned by both referenced records: deleting the student or
/// the course deletes the enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    /// Storage row identifier.
    pub id: i64,
    /// Row id of the enrolled student.
    pub student_id: i64,
    /// Row id of the course.
    pub course_id: i64,
    /// Optional grade code, at most 2 characters (e.g. "A", "B+").
    pub grade: Option<String>,
}

/// An enrollment joined with the display fields of its student and course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentDetail {
    /// Storage row identifier of the enrollment.
    pub id: i64,
    /// First name of the enrolled student.
    pub student_first_name: String,
    /// Last name of the enrolled student.
    pub student_last_name: String,
    /// Name of the course.
    pub course_name: String,
    /// Code of the course.
    pub course_code: String,
    /// Optional grade code.
    pub grade: Option<String>,
}

/// Unvalidated student fields as submitted by a form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentDraft {
    pub first_name: String,
    pub last_name: String,
    pub student_id: String,
    pub email: String,
}

/// Unvalidated course fields as submitted by a form.
///
/// An empty `teacher` field is stored as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseDraft {
    pub name: String,
    pub code: String,
    pub teacher: String,
}

/// Unvalidated enrollment fields as submitted by a form.
///
/// The student and course are selected by row id; `None` means the field was
/// missing or not a valid integer. An empty `grade` is stored as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentDraft {
    pub student_id: Option<i64>,
    pub course_id: Option<i64>,
    pub grade: String,
}
