// Copyright (C) 2026 Rollbook Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Pure field validation over unvalidated drafts.
//!
//! These functions are deterministic and have no side effects, so they can be
//! unit tested without a database. They check required fields, length caps,
//! and the email shape. Uniqueness (student number, course code) and
//! referential existence (enrollment's student/course) need storage context
//! and are enforced in the api crate.

use crate::error::FieldError;
use crate::types::{CourseDraft, EnrollmentDraft, StudentDraft};

/// Maximum length of a student first or last name.
const NAME_MAX: usize = 50;
/// Maximum length of a student number.
const STUDENT_ID_MAX: usize = 20;
/// Maximum length of a student email address.
const EMAIL_MAX: usize = 100;
/// Maximum length of a course name or teacher name.
const COURSE_NAME_MAX: usize = 100;
/// Maximum length of a course code.
const COURSE_CODE_MAX: usize = 10;
/// Maximum length of a grade code.
const GRADE_MAX: usize = 2;

/// Checks a required text field for emptiness and length.
fn check_required(errors: &mut Vec<FieldError>, field: &str, value: &str, max: usize) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, "This field is required"));
    } else if value.chars().count() > max {
        errors.push(FieldError::new(
            field,
            &format!("Must be at most {max} characters"),
        ));
    }
}

/// Minimal structural check for an email address.
///
/// Requires exactly one '@' with a non-empty local part and a domain that
/// contains a dot. This intentionally stops well short of full RFC 5322.
fn looks_like_email(value: &str) -> bool {
    let mut parts = value.splitn(2, '@');
    let Some(local) = parts.next() else {
        return false;
    };
    let Some(domain) = parts.next() else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// Validates a student draft.
///
/// Returns one error per offending field; an empty vector means the draft is
/// acceptable for persistence (pending the uniqueness check on the student
/// number).
#[must_use]
pub fn validate_student(draft: &StudentDraft) -> Vec<FieldError> {
    let mut errors: Vec<FieldError> = Vec::new();

    check_required(&mut errors, "first_name", &draft.first_name, NAME_MAX);
    check_required(&mut errors, "last_name", &draft.last_name, NAME_MAX);
    check_required(&mut errors, "student_id", &draft.student_id, STUDENT_ID_MAX);
    check_required(&mut errors, "email", &draft.email, EMAIL_MAX);

    if !draft.email.trim().is_empty() && !looks_like_email(draft.email.trim()) {
        errors.push(FieldError::new("email", "Enter a valid email address"));
    }

    errors
}

/// Validates a course draft.
///
/// The teacher field is optional free text; only its length is checked.
#[must_use]
pub fn validate_course(draft: &CourseDraft) -> Vec<FieldError> {
    let mut errors: Vec<FieldError> = Vec::new();

    check_required(&mut errors, "name", &draft.name, COURSE_NAME_MAX);
    check_required(&mut errors, "code", &draft.code, COURSE_CODE_MAX);

    if draft.teacher.chars().count() > COURSE_NAME_MAX {
        errors.push(FieldError::new(
            "teacher",
            &format!("Must be at most {COURSE_NAME_MAX} characters"),
        ));
    }

    errors
}

/// Validates an enrollment draft.
///
/// The student and course selections must be present; whether the selected
/// rows exist is checked against storage by the caller. The grade is optional
/// but capped at two characters.
#[must_use]
pub fn validate_enrollment(draft: &EnrollmentDraft) -> Vec<FieldError> {
    let mut errors: Vec<FieldError> = Vec::new();

    if draft.student_id.is_none() {
        errors.push(FieldError::new("student", "This field is required"));
    }
    if draft.course_id.is_none() {
        errors.push(FieldError::new("course", "This field is required"));
    }
    if draft.grade.chars().count() > GRADE_MAX {
        errors.push(FieldError::new(
            "grade",
            &format!("Must be at most {GRADE_MAX} characters"),
        ));
    }

    errors
}
