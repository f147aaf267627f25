// Copyright (C) 2026 Rollbook Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Application services for Rollbook.
//!
//! This crate sits between the HTTP layer and storage. It owns
//! authentication (login, session validation, logout), role-based
//! authorization, and the record operations the server exposes. Handlers
//! never talk to the persistence crate directly.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

pub mod auth;
pub mod error;
pub mod records;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedUser, AuthenticationService, AuthorizationService};
pub use error::{ApiError, AuthError, translate_persistence_error};
pub use records::{
    DashboardSummary, create_course, create_enrollment, create_student, dashboard_summary,
    delete_course, delete_enrollment, delete_student, get_course, get_enrollment,
    get_enrollment_detail, get_student, list_courses, list_enrollments, list_students,
    update_course, update_enrollment, update_student,
};
