// Copyright (C) 2026 Rollbook Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Record operations: students, courses, enrollments, and the dashboard
//! summary.
//!
//! Every operation takes the authenticated user explicitly and checks
//! authorization before touching storage. Mutations validate the submitted
//! draft first and collect every field error in one pass, so a form can be
//! re-rendered with all problems at once. Uniqueness conflicts reported by
//! storage are folded into the same field-error shape.

use serde::Serialize;
use time::OffsetDateTime;
use tracing::warn;

use rollbook_domain::{
    Course, CourseDraft, Enrollment, EnrollmentDetail, EnrollmentDraft, FieldError, Student,
    StudentDraft, validate_course, validate_enrollment, validate_student,
};
use rollbook_persistence::{Persistence, PersistenceError};

use crate::auth::{AuthenticatedUser, AuthorizationService};
use crate::error::{ApiError, translate_persistence_error};

/// Record counts shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    /// Total number of students.
    pub students: i64,
    /// Total number of courses.
    pub courses: i64,
    /// Total number of enrollments.
    pub enrollments: i64,
}

/// Returns `None` for a blank submission, `Some` of the trimmed text
/// otherwise. Used for the optional free-text fields (course teacher,
/// enrollment grade).
fn optional_text(value: &str) -> Option<&str> {
    let trimmed: &str = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

/// Today's date in ISO 8601 calendar form, for the enrolled-date stamp.
fn today() -> Result<String, ApiError> {
    OffsetDateTime::now_utc()
        .date()
        .format(time::macros::format_description!("[year]-[month]-[day]"))
        .map_err(|e| ApiError::Internal {
            message: format!("Failed to format date: {e}"),
        })
}

// ============================================================================
// Dashboard
// ============================================================================

/// Computes the record counts for the dashboard.
///
/// # Errors
///
/// Returns an error if any count query fails.
pub fn dashboard_summary(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
) -> Result<DashboardSummary, ApiError> {
    AuthorizationService::authorize_view_records(user)?;

    Ok(DashboardSummary {
        students: persistence
            .count_students()
            .map_err(|e| translate_persistence_error("Student", e))?,
        courses: persistence
            .count_courses()
            .map_err(|e| translate_persistence_error("Course", e))?,
        enrollments: persistence
            .count_enrollments()
            .map_err(|e| translate_persistence_error("Enrollment", e))?,
    })
}

// ============================================================================
// Students
// ============================================================================

fn map_student_storage_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::UniqueViolation(detail) => {
            warn!(detail, "Student number conflict");
            ApiError::Validation(vec![FieldError::new(
                "student_id",
                "A student with this student ID already exists",
            )])
        }
        other => translate_persistence_error("Student", other),
    }
}

/// Lists students, optionally filtered by a case-insensitive substring match
/// on the first name.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_students(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    query: Option<&str>,
) -> Result<Vec<Student>, ApiError> {
    AuthorizationService::authorize_view_records(user)?;
    persistence
        .list_students(query)
        .map_err(|e| translate_persistence_error("Student", e))
}

/// Retrieves a student by row id.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if the id does not resolve.
pub fn get_student(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    id: i64,
) -> Result<Student, ApiError> {
    AuthorizationService::authorize_view_records(user)?;
    persistence
        .get_student(id)
        .map_err(|e| translate_persistence_error("Student", e))?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Student"),
            message: format!("Student {id} does not exist"),
        })
}

/// Creates a student from a submitted draft.
///
/// The enrolled date is stamped with today's date and never changes
/// afterwards.
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` for non-Admin users,
/// `ApiError::Validation` if any field is rejected or the student number is
/// taken, or another error if the insert fails.
pub fn create_student(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    draft: &StudentDraft,
) -> Result<i64, ApiError> {
    AuthorizationService::authorize_manage_students(user)?;

    let errors: Vec<FieldError> = validate_student(draft);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let enrolled_date: String = today()?;
    persistence
        .create_student(
            draft.first_name.trim(),
            draft.last_name.trim(),
            draft.student_id.trim(),
            draft.email.trim(),
            &enrolled_date,
        )
        .map_err(map_student_storage_error)
}

/// Updates a student from a submitted draft. The enrolled date is preserved.
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` for non-Admin users,
/// `ApiError::Validation` on field rejections or a student number conflict,
/// or `ApiError::ResourceNotFound` if the id does not resolve.
pub fn update_student(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    id: i64,
    draft: &StudentDraft,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_manage_students(user)?;

    let errors: Vec<FieldError> = validate_student(draft);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    persistence
        .update_student(
            id,
            draft.first_name.trim(),
            draft.last_name.trim(),
            draft.student_id.trim(),
            draft.email.trim(),
        )
        .map_err(map_student_storage_error)
}

/// Deletes a student. Enrollments referencing the student go with it.
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` for non-Admin users, or
/// `ApiError::ResourceNotFound` if the id does not resolve.
pub fn delete_student(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    id: i64,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_manage_students(user)?;
    persistence
        .delete_student(id)
        .map_err(|e| translate_persistence_error("Student", e))
}

// ============================================================================
// Courses
// ============================================================================

fn map_course_storage_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::UniqueViolation(detail) => {
            warn!(detail, "Course code conflict");
            ApiError::Validation(vec![FieldError::new(
                "code",
                "A course with this code already exists",
            )])
        }
        other => translate_persistence_error("Course", other),
    }
}

/// Lists courses, optionally filtered by a case-insensitive substring match
/// on the course name.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_courses(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    query: Option<&str>,
) -> Result<Vec<Course>, ApiError> {
    AuthorizationService::authorize_view_records(user)?;
    persistence
        .list_courses(query)
        .map_err(|e| translate_persistence_error("Course", e))
}

/// Retrieves a course by row id.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if the id does not resolve.
pub fn get_course(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    id: i64,
) -> Result<Course, ApiError> {
    AuthorizationService::authorize_view_records(user)?;
    persistence
        .get_course(id)
        .map_err(|e| translate_persistence_error("Course", e))?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Course"),
            message: format!("Course {id} does not exist"),
        })
}

/// Creates a course from a submitted draft.
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` for non-Admin users,
/// `ApiError::Validation` if any field is rejected or the course code is
/// taken, or another error if the insert fails.
pub fn create_course(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    draft: &CourseDraft,
) -> Result<i64, ApiError> {
    AuthorizationService::authorize_manage_courses(user)?;

    let errors: Vec<FieldError> = validate_course(draft);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    persistence
        .create_course(
            draft.name.trim(),
            draft.code.trim(),
            optional_text(&draft.teacher),
        )
        .map_err(map_course_storage_error)
}

/// Updates a course from a submitted draft.
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` for non-Admin users,
/// `ApiError::Validation` on field rejections or a course code conflict, or
/// `ApiError::ResourceNotFound` if the id does not resolve.
pub fn update_course(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    id: i64,
    draft: &CourseDraft,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_manage_courses(user)?;

    let errors: Vec<FieldError> = validate_course(draft);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    persistence
        .update_course(
            id,
            draft.name.trim(),
            draft.code.trim(),
            optional_text(&draft.teacher),
        )
        .map_err(map_course_storage_error)
}

/// Deletes a course, cascading to its enrollments.
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` for non-Admin users, or
/// `ApiError::ResourceNotFound` if the id does not resolve.
pub fn delete_course(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    id: i64,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_manage_courses(user)?;
    persistence
        .delete_course(id)
        .map_err(|e| translate_persistence_error("Course", e))
}

// ============================================================================
// Enrollments
// ============================================================================

/// Checks that the draft's student and course selections resolve to existing
/// rows, appending a field error for each one that does not.
///
/// Duplicate (student, course) pairs are deliberately allowed; a student may
/// be enrolled in the same course more than once (e.g. a retake).
fn check_enrollment_references(
    persistence: &mut Persistence,
    draft: &EnrollmentDraft,
    errors: &mut Vec<FieldError>,
) -> Result<(), ApiError> {
    if let Some(student_id) = draft.student_id {
        let exists: bool = persistence
            .get_student(student_id)
            .map_err(|e| translate_persistence_error("Student", e))?
            .is_some();
        if !exists {
            errors.push(FieldError::new("student", "Select a valid choice"));
        }
    }
    if let Some(course_id) = draft.course_id {
        let exists: bool = persistence
            .get_course(course_id)
            .map_err(|e| translate_persistence_error("Course", e))?
            .is_some();
        if !exists {
            errors.push(FieldError::new("course", "Select a valid choice"));
        }
    }
    Ok(())
}

/// Lists enrollments with their joined student and course display fields,
/// optionally filtered by a case-insensitive substring match on the
/// student's first name.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_enrollments(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    query: Option<&str>,
) -> Result<Vec<EnrollmentDetail>, ApiError> {
    AuthorizationService::authorize_view_records(user)?;
    persistence
        .list_enrollments(query)
        .map_err(|e| translate_persistence_error("Enrollment", e))
}

/// Retrieves an enrollment by row id.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if the id does not resolve.
pub fn get_enrollment(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    id: i64,
) -> Result<Enrollment, ApiError> {
    AuthorizationService::authorize_view_records(user)?;
    persistence
        .get_enrollment(id)
        .map_err(|e| translate_persistence_error("Enrollment", e))?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Enrollment"),
            message: format!("Enrollment {id} does not exist"),
        })
}

/// Retrieves an enrollment with its joined display fields, for confirmation
/// pages.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if the id does not resolve.
pub fn get_enrollment_detail(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    id: i64,
) -> Result<EnrollmentDetail, ApiError> {
    AuthorizationService::authorize_view_records(user)?;
    persistence
        .get_enrollment_detail(id)
        .map_err(|e| translate_persistence_error("Enrollment", e))?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Enrollment"),
            message: format!("Enrollment {id} does not exist"),
        })
}

/// Creates an enrollment from a submitted draft.
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` for non-Admin users, or
/// `ApiError::Validation` if a selection is missing, does not resolve to an
/// existing row, or the grade is too long.
pub fn create_enrollment(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    draft: &EnrollmentDraft,
) -> Result<i64, ApiError> {
    AuthorizationService::authorize_manage_enrollments(user)?;

    let mut errors: Vec<FieldError> = validate_enrollment(draft);
    check_enrollment_references(persistence, draft, &mut errors)?;
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    // Both checked above.
    let (student_id, course_id) = match (draft.student_id, draft.course_id) {
        (Some(s), Some(c)) => (s, c),
        _ => return Err(ApiError::Validation(errors)),
    };

    persistence
        .create_enrollment(student_id, course_id, optional_text(&draft.grade))
        .map_err(|e| translate_persistence_error("Enrollment", e))
}

/// Updates an enrollment from a submitted draft.
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` for non-Admin users,
/// `ApiError::Validation` on a bad selection or grade, or
/// `ApiError::ResourceNotFound` if the id does not resolve.
pub fn update_enrollment(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    id: i64,
    draft: &EnrollmentDraft,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_manage_enrollments(user)?;

    let mut errors: Vec<FieldError> = validate_enrollment(draft);
    check_enrollment_references(persistence, draft, &mut errors)?;
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let (student_id, course_id) = match (draft.student_id, draft.course_id) {
        (Some(s), Some(c)) => (s, c),
        _ => return Err(ApiError::Validation(errors)),
    };

    persistence
        .update_enrollment(id, student_id, course_id, optional_text(&draft.grade))
        .map_err(|e| translate_persistence_error("Enrollment", e))
}

/// Deletes an enrollment. The student and course are untouched.
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` for non-Admin users, or
/// `ApiError::ResourceNotFound` if the id does not resolve.
pub fn delete_enrollment(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    id: i64,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_manage_enrollments(user)?;
    persistence
        .delete_enrollment(id)
        .map_err(|e| translate_persistence_error("Enrollment", e))
}
