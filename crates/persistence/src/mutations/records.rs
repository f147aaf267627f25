// Copyright (C) 2026 Rollbook Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Student, course, and enrollment mutations.
//!
//! Updates and deletes report `NotFound` when the row id does not resolve.
//! UNIQUE and FOREIGN KEY rejections come back as their dedicated error
//! variants via the `From<diesel::result::Error>` conversion, so callers can
//! turn a storage-level conflict into a validation error.

use diesel::prelude::*;
use tracing::info;

use crate::diesel_schema::{courses, enrollments, students};
use crate::error::PersistenceError;
use crate::sqlite;

/// Inserts a new student.
///
/// `enrolled_date` is fixed at this point and never changed by updates.
///
/// # Errors
///
/// Returns `PersistenceError::UniqueViolation` if the student number is
/// already taken, or another error if the insert fails.
pub fn insert_student(
    conn: &mut SqliteConnection,
    first_name: &str,
    last_name: &str,
    student_id: &str,
    email: &str,
    enrolled_date: &str,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(students::table)
        .values((
            students::first_name.eq(first_name),
            students::last_name.eq(last_name),
            students::student_id.eq(student_id),
            students::email.eq(email),
            students::enrolled_date.eq(enrolled_date),
        ))
        .execute(conn)?;

    let id: i64 = sqlite::get_last_insert_rowid(conn)?;
    info!(id, student_id, "Student created");

    Ok(id)
}

/// Updates a student in place. The enrolled date is not touched.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the id does not resolve, or
/// `PersistenceError::UniqueViolation` on a student number conflict.
pub fn update_student(
    conn: &mut SqliteConnection,
    id: i64,
    first_name: &str,
    last_name: &str,
    student_id: &str,
    email: &str,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(students::table)
        .filter(students::id.eq(id))
        .set((
            students::first_name.eq(first_name),
            students::last_name.eq(last_name),
            students::student_id.eq(student_id),
            students::email.eq(email),
        ))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("Student {id}")));
    }

    info!(id, "Student updated");
    Ok(())
}

/// Deletes a student. Enrollments referencing the student are removed by the
/// `ON DELETE CASCADE` constraint.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the id does not resolve.
pub fn delete_student(conn: &mut SqliteConnection, id: i64) -> Result<(), PersistenceError> {
    let deleted: usize = diesel::delete(students::table)
        .filter(students::id.eq(id))
        .execute(conn)?;

    if deleted == 0 {
        return Err(PersistenceError::NotFound(format!("Student {id}")));
    }

    info!(id, "Student deleted");
    Ok(())
}

/// Inserts a new course.
///
/// # Errors
///
/// Returns `PersistenceError::UniqueViolation` if the course code is already
/// taken, or another error if the insert fails.
pub fn insert_course(
    conn: &mut SqliteConnection,
    name: &str,
    code: &str,
    teacher: Option<&str>,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(courses::table)
        .values((
            courses::name.eq(name),
            courses::code.eq(code),
            courses::teacher.eq(teacher),
        ))
        .execute(conn)?;

    let id: i64 = sqlite::get_last_insert_rowid(conn)?;
    info!(id, code, "Course created");

    Ok(id)
}

/// Updates a course in place.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the id does not resolve, or
/// `PersistenceError::UniqueViolation` on a course code conflict.
pub fn update_course(
    conn: &mut SqliteConnection,
    id: i64,
    name: &str,
    code: &str,
    teacher: Option<&str>,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(courses::table)
        .filter(courses::id.eq(id))
        .set((
            courses::name.eq(name),
            courses::code.eq(code),
            courses::teacher.eq(teacher),
        ))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("Course {id}")));
    }

    info!(id, "Course updated");
    Ok(())
}

/// Deletes a course, cascading to its enrollments.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the id does not resolve.
pub fn delete_course(conn: &mut SqliteConnection, id: i64) -> Result<(), PersistenceError> {
    let deleted: usize = diesel::delete(courses::table)
        .filter(courses::id.eq(id))
        .execute(conn)?;

    if deleted == 0 {
        return Err(PersistenceError::NotFound(format!("Course {id}")));
    }

    info!(id, "Course deleted");
    Ok(())
}

/// Inserts a new enrollment.
///
/// # Errors
///
/// Returns `PersistenceError::ForeignKeyViolation` if the referenced student
/// or course does not exist, or another error if the insert fails.
pub fn insert_enrollment(
    conn: &mut SqliteConnection,
    student_id: i64,
    course_id: i64,
    grade: Option<&str>,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(enrollments::table)
        .values((
            enrollments::student_id.eq(student_id),
            enrollments::course_id.eq(course_id),
            enrollments::grade.eq(grade),
        ))
        .execute(conn)?;

    let id: i64 = sqlite::get_last_insert_rowid(conn)?;
    info!(id, student_id, course_id, "Enrollment created");

    Ok(id)
}

/// Updates an enrollment in place.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the id does not resolve, or
/// `PersistenceError::ForeignKeyViolation` if the new student or course
/// reference does not exist.
pub fn update_enrollment(
    conn: &mut SqliteConnection,
    id: i64,
    student_id: i64,
    course_id: i64,
    grade: Option<&str>,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(enrollments::table)
        .filter(enrollments::id.eq(id))
        .set((
            enrollments::student_id.eq(student_id),
            enrollments::course_id.eq(course_id),
            enrollments::grade.eq(grade),
        ))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("Enrollment {id}")));
    }

    info!(id, "Enrollment updated");
    Ok(())
}

/// Deletes an enrollment.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the id does not resolve.
pub fn delete_enrollment(conn: &mut SqliteConnection, id: i64) -> Result<(), PersistenceError> {
    let deleted: usize = diesel::delete(enrollments::table)
        .filter(enrollments::id.eq(id))
        .execute(conn)?;

    if deleted == 0 {
        return Err(PersistenceError::NotFound(format!("Enrollment {id}")));
    }

    info!(id, "Enrollment deleted");
    Ok(())
}
