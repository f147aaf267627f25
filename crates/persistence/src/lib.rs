// Copyright (C) 2026 Rollbook Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! SQLite persistence layer for Rollbook.
//!
//! This crate provides database persistence for accounts, sessions, and the
//! three tracked record types (students, courses, enrollments). It is built
//! on Diesel with embedded migrations.
//!
//! Storage is the sole concurrency boundary of the application: uniqueness
//! of the student number and course code is enforced by UNIQUE constraints,
//! and the enrollment ownership invariant by `ON DELETE CASCADE` foreign
//! keys. Both are surfaced as typed errors rather than faults, so racing
//! writers lose cleanly.
//!
//! In-memory databases (used by tests and the default server configuration)
//! receive unique names via an atomic counter, ensuring deterministic test
//! isolation.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use rollbook_domain::{Course, Enrollment, EnrollmentDetail, Role, Student};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
mod sqlite;

#[cfg(test)]
mod tests;

pub use data_models::{AccountData, SessionData};
pub use error::PersistenceError;

/// Atomic counter for generating unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter owning a single `SQLite` connection.
///
/// Handlers share one adapter behind a mutex; each method runs a single
/// query or write against the connection.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter,
    /// ensuring deterministic test isolation without time-based collisions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url = format!("file:rollbook_memdb_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = sqlite::initialize_database(&shared_memory_url)?;
        sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = sqlite::initialize_database(path_str)?;
        sqlite::enable_wal_mode(&mut conn)?;
        sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    // ========================================================================
    // Accounts & sessions
    // ========================================================================

    /// Creates a new account with a bcrypt-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::UniqueViolation` if the login name is
    /// taken, or another error if the insert fails.
    pub fn create_account(
        &mut self,
        login_name: &str,
        display_name: &str,
        password: &str,
        role: Role,
    ) -> Result<i64, PersistenceError> {
        mutations::accounts::create_account(&mut self.conn, login_name, display_name, password, role)
    }

    /// Retrieves an account by login name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails; `Ok(None)` if absent.
    pub fn get_account_by_login(
        &mut self,
        login_name: &str,
    ) -> Result<Option<AccountData>, PersistenceError> {
        queries::accounts::get_account_by_login(&mut self.conn, login_name)
    }

    /// Retrieves an account by row id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails; `Ok(None)` if absent.
    pub fn get_account_by_id(
        &mut self,
        account_id: i64,
    ) -> Result<Option<AccountData>, PersistenceError> {
        queries::accounts::get_account_by_id(&mut self.conn, account_id)
    }

    /// Counts all accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_accounts(&mut self) -> Result<i64, PersistenceError> {
        queries::accounts::count_accounts(&mut self.conn)
    }

    /// Updates the last login timestamp for an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn update_last_login(&mut self, account_id: i64) -> Result<(), PersistenceError> {
        mutations::accounts::update_last_login(&mut self.conn, account_id)
    }

    /// Verifies a password against a stored bcrypt hash.
    ///
    /// # Errors
    ///
    /// Returns an error if hash parsing fails.
    pub fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, PersistenceError> {
        queries::accounts::verify_password(password, password_hash)
    }

    /// Creates a session row for an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_session(
        &mut self,
        session_token: &str,
        account_id: i64,
        expires_at: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::accounts::create_session(&mut self.conn, session_token, account_id, expires_at)
    }

    /// Retrieves a session by its token.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails; `Ok(None)` if absent.
    pub fn get_session_by_token(
        &mut self,
        session_token: &str,
    ) -> Result<Option<SessionData>, PersistenceError> {
        queries::accounts::get_session_by_token(&mut self.conn, session_token)
    }

    /// Deletes a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_session(&mut self, session_token: &str) -> Result<(), PersistenceError> {
        mutations::accounts::delete_session(&mut self.conn, session_token)
    }

    /// Deletes all sessions that expired before `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_expired_sessions(&mut self, now: &str) -> Result<usize, PersistenceError> {
        mutations::accounts::delete_expired_sessions(&mut self.conn, now)
    }

    // ========================================================================
    // Students
    // ========================================================================

    /// Lists students, optionally filtered by a first-name substring.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_students(&mut self, query: Option<&str>) -> Result<Vec<Student>, PersistenceError> {
        queries::records::list_students(&mut self.conn, query)
    }

    /// Retrieves a student by row id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails; `Ok(None)` if absent.
    pub fn get_student(&mut self, id: i64) -> Result<Option<Student>, PersistenceError> {
        queries::records::get_student(&mut self.conn, id)
    }

    /// Counts all students.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_students(&mut self) -> Result<i64, PersistenceError> {
        queries::records::count_students(&mut self.conn)
    }

    /// Inserts a new student.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::UniqueViolation` on a student number
    /// conflict, or another error if the insert fails.
    pub fn create_student(
        &mut self,
        first_name: &str,
        last_name: &str,
        student_id: &str,
        email: &str,
        enrolled_date: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::records::insert_student(
            &mut self.conn,
            first_name,
            last_name,
            student_id,
            email,
            enrolled_date,
        )
    }

    /// Updates a student in place. The enrolled date is not touched.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the id does not resolve, or
    /// `PersistenceError::UniqueViolation` on a student number conflict.
    pub fn update_student(
        &mut self,
        id: i64,
        first_name: &str,
        last_name: &str,
        student_id: &str,
        email: &str,
    ) -> Result<(), PersistenceError> {
        mutations::records::update_student(
            &mut self.conn,
            id,
            first_name,
            last_name,
            student_id,
            email,
        )
    }

    /// Deletes a student, cascading to its enrollments.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the id does not resolve.
    pub fn delete_student(&mut self, id: i64) -> Result<(), PersistenceError> {
        mutations::records::delete_student(&mut self.conn, id)
    }

    // ========================================================================
    // Courses
    // ========================================================================

    /// Lists courses, optionally filtered by a name substring.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_courses(&mut self, query: Option<&str>) -> Result<Vec<Course>, PersistenceError> {
        queries::records::list_courses(&mut self.conn, query)
    }

    /// Retrieves a course by row id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails; `Ok(None)` if absent.
    pub fn get_course(&mut self, id: i64) -> Result<Option<Course>, PersistenceError> {
        queries::records::get_course(&mut self.conn, id)
    }

    /// Counts all courses.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_courses(&mut self) -> Result<i64, PersistenceError> {
        queries::records::count_courses(&mut self.conn)
    }

    /// Inserts a new course.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::UniqueViolation` on a course code
    /// conflict, or another error if the insert fails.
    pub fn create_course(
        &mut self,
        name: &str,
        code: &str,
        teacher: Option<&str>,
    ) -> Result<i64, PersistenceError> {
        mutations::records::insert_course(&mut self.conn, name, code, teacher)
    }

    /// Updates a course in place.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the id does not resolve, or
    /// `PersistenceError::UniqueViolation` on a course code conflict.
    pub fn update_course(
        &mut self,
        id: i64,
        name: &str,
        code: &str,
        teacher: Option<&str>,
    ) -> Result<(), PersistenceError> {
        mutations::records::update_course(&mut self.conn, id, name, code, teacher)
    }

    /// Deletes a course, cascading to its enrollments.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the id does not resolve.
    pub fn delete_course(&mut self, id: i64) -> Result<(), PersistenceError> {
        mutations::records::delete_course(&mut self.conn, id)
    }

    // ========================================================================
    // Enrollments
    // ========================================================================

    /// Lists enrollments with joined student/course display fields,
    /// optionally filtered by a substring of the student's first name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_enrollments(
        &mut self,
        query: Option<&str>,
    ) -> Result<Vec<EnrollmentDetail>, PersistenceError> {
        queries::records::list_enrollment_details(&mut self.conn, query)
    }

    /// Retrieves an enrollment by row id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails; `Ok(None)` if absent.
    pub fn get_enrollment(&mut self, id: i64) -> Result<Option<Enrollment>, PersistenceError> {
        queries::records::get_enrollment(&mut self.conn, id)
    }

    /// Retrieves an enrollment with its joined display fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails; `Ok(None)` if absent.
    pub fn get_enrollment_detail(
        &mut self,
        id: i64,
    ) -> Result<Option<EnrollmentDetail>, PersistenceError> {
        queries::records::get_enrollment_detail(&mut self.conn, id)
    }

    /// Counts all enrollments.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_enrollments(&mut self) -> Result<i64, PersistenceError> {
        queries::records::count_enrollments(&mut self.conn)
    }

    /// Inserts a new enrollment.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::ForeignKeyViolation` if the referenced
    /// student or course does not exist.
    pub fn create_enrollment(
        &mut self,
        student_id: i64,
        course_id: i64,
        grade: Option<&str>,
    ) -> Result<i64, PersistenceError> {
        mutations::records::insert_enrollment(&mut self.conn, student_id, course_id, grade)
    }

    /// Updates an enrollment in place.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the id does not resolve, or
    /// `PersistenceError::ForeignKeyViolation` on a dangling reference.
    pub fn update_enrollment(
        &mut self,
        id: i64,
        student_id: i64,
        course_id: i64,
        grade: Option<&str>,
    ) -> Result<(), PersistenceError> {
        mutations::records::update_enrollment(&mut self.conn, id, student_id, course_id, grade)
    }

    /// Deletes an enrollment.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the id does not resolve.
    pub fn delete_enrollment(&mut self, id: i64) -> Result<(), PersistenceError> {
        mutations::records::delete_enrollment(&mut self.conn, id)
    }
}
