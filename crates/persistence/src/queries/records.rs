// Copyright (C) 2026 Rollbook Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Student, course, and enrollment queries.
//!
//! List queries accept an optional search substring. The match is a SQL
//! `LIKE` on the record's designated display field, which on `SQLite` is
//! case-insensitive for ASCII. Results come back in storage order; no other
//! ordering is guaranteed.

use diesel::prelude::*;
use rollbook_domain::{Course, Enrollment, EnrollmentDetail, Student};

use crate::diesel_schema::{courses, enrollments, students};
use crate::error::PersistenceError;

/// Diesel Queryable struct for student rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = students)]
struct StudentRow {
    id: i64,
    first_name: String,
    last_name: String,
    student_id: String,
    email: String,
    enrolled_date: String,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            student_id: row.student_id,
            email: row.email,
            enrolled_date: row.enrolled_date,
        }
    }
}

/// Diesel Queryable struct for course rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = courses)]
struct CourseRow {
    id: i64,
    name: String,
    code: String,
    teacher: Option<String>,
}

impl From<CourseRow> for Course {
    fn from(row: CourseRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            code: row.code,
            teacher: row.teacher,
        }
    }
}

/// Diesel Queryable struct for enrollment rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = enrollments)]
struct EnrollmentRow {
    id: i64,
    student_id: i64,
    course_id: i64,
    grade: Option<String>,
}

impl From<EnrollmentRow> for Enrollment {
    fn from(row: EnrollmentRow) -> Self {
        Self {
            id: row.id,
            student_id: row.student_id,
            course_id: row.course_id,
            grade: row.grade,
        }
    }
}

/// Builds a LIKE pattern matching the query anywhere in the field.
///
/// LIKE wildcards in the user's input are escaped so they match literally.
fn contains_pattern(query: &str) -> String {
    let escaped: String = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Lists students, optionally filtered by a first-name substring.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_students(
    conn: &mut SqliteConnection,
    query: Option<&str>,
) -> Result<Vec<Student>, PersistenceError> {
    let rows: Vec<StudentRow> = match query {
        Some(q) if !q.is_empty() => students::table
            .filter(students::first_name.like(contains_pattern(q)).escape('\\'))
            .select(StudentRow::as_select())
            .load(conn)?,
        _ => students::table.select(StudentRow::as_select()).load(conn)?,
    };

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Retrieves a student by row id.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the student is not found.
pub fn get_student(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<Student>, PersistenceError> {
    let result: Result<StudentRow, diesel::result::Error> = students::table
        .filter(students::id.eq(id))
        .select(StudentRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(row.into())),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Counts all students.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_students(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    Ok(students::table.count().get_result(conn)?)
}

/// Lists courses, optionally filtered by a name substring.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_courses(
    conn: &mut SqliteConnection,
    query: Option<&str>,
) -> Result<Vec<Course>, PersistenceError> {
    let rows: Vec<CourseRow> = match query {
        Some(q) if !q.is_empty() => courses::table
            .filter(courses::name.like(contains_pattern(q)).escape('\\'))
            .select(CourseRow::as_select())
            .load(conn)?,
        _ => courses::table.select(CourseRow::as_select()).load(conn)?,
    };

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Retrieves a course by row id.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the course is not found.
pub fn get_course(conn: &mut SqliteConnection, id: i64) -> Result<Option<Course>, PersistenceError> {
    let result: Result<CourseRow, diesel::result::Error> = courses::table
        .filter(courses::id.eq(id))
        .select(CourseRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(row.into())),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Counts all courses.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_courses(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    Ok(courses::table.count().get_result(conn)?)
}

/// Lists enrollments joined with student and course display fields,
/// optionally filtered by a substring of the student's first name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_enrollment_details(
    conn: &mut SqliteConnection,
    query: Option<&str>,
) -> Result<Vec<EnrollmentDetail>, PersistenceError> {
    let selection = (
        enrollments::id,
        students::first_name,
        students::last_name,
        courses::name,
        courses::code,
        enrollments::grade,
    );

    let rows: Vec<(i64, String, String, String, String, Option<String>)> = match query {
        Some(q) if !q.is_empty() => enrollments::table
            .inner_join(students::table)
            .inner_join(courses::table)
            .filter(students::first_name.like(contains_pattern(q)).escape('\\'))
            .select(selection)
            .load(conn)?,
        _ => enrollments::table
            .inner_join(students::table)
            .inner_join(courses::table)
            .select(selection)
            .load(conn)?,
    };

    Ok(rows
        .into_iter()
        .map(
            |(id, student_first_name, student_last_name, course_name, course_code, grade)| {
                EnrollmentDetail {
                    id,
                    student_first_name,
                    student_last_name,
                    course_name,
                    course_code,
                    grade,
                }
            },
        )
        .collect())
}

/// Retrieves an enrollment by row id.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the enrollment is not found.
pub fn get_enrollment(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<Enrollment>, PersistenceError> {
    let result: Result<EnrollmentRow, diesel::result::Error> = enrollments::table
        .filter(enrollments::id.eq(id))
        .select(EnrollmentRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(row.into())),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Retrieves an enrollment with its joined display fields.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the enrollment is not found.
pub fn get_enrollment_detail(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<EnrollmentDetail>, PersistenceError> {
    let result: Result<(i64, String, String, String, String, Option<String>), diesel::result::Error> =
        enrollments::table
            .inner_join(students::table)
            .inner_join(courses::table)
            .filter(enrollments::id.eq(id))
            .select((
                enrollments::id,
                students::first_name,
                students::last_name,
                courses::name,
                courses::code,
                enrollments::grade,
            ))
            .first(conn);

    match result {
        Ok((id, student_first_name, student_last_name, course_name, course_code, grade)) => {
            Ok(Some(EnrollmentDetail {
                id,
                student_first_name,
                student_last_name,
                course_name,
                course_code,
                grade,
            }))
        }
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Counts all enrollments.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_enrollments(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    Ok(enrollments::table.count().get_result(conn)?)
}
