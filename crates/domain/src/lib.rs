// Copyright (C) 2026 Rollbook Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

//! Domain types and field validation for Rollbook.
//!
//! This crate holds the record types (students, courses, enrollments), the
//! closed role enumeration, and pure validation functions over unvalidated
//! drafts. It performs no I/O and knows nothing about storage; uniqueness and
//! referential checks that require context live above it.

mod error;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use error::{DomainError, FieldError};
pub use types::{
    Course, CourseDraft, Enrollment, EnrollmentDetail, EnrollmentDraft, Role, Student,
    StudentDraft,
};
pub use validation::{validate_course, validate_enrollment, validate_student};
