// Copyright (C) 2026 Rollbook Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

mod authorization_tests;

use rollbook_domain::{CourseDraft, Role, StudentDraft};
use rollbook_persistence::Persistence;

use crate::auth::AuthenticatedUser;

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("Failed to create in-memory persistence")
}

pub fn admin_user() -> AuthenticatedUser {
    AuthenticatedUser::new(
        1,
        String::from("admin"),
        String::from("Site Admin"),
        Role::Admin,
    )
}

pub fn teacher_user() -> AuthenticatedUser {
    AuthenticatedUser::new(
        2,
        String::from("ghopper"),
        String::from("Grace Hopper"),
        Role::Teacher,
    )
}

pub fn student_draft(student_id: &str) -> StudentDraft {
    StudentDraft {
        first_name: String::from("Ada"),
        last_name: String::from("Lovelace"),
        student_id: String::from(student_id),
        email: String::from("ada@example.com"),
    }
}

pub fn course_draft(code: &str) -> CourseDraft {
    CourseDraft {
        name: String::from("Intro to Computing"),
        code: String::from(code),
        teacher: String::from("Grace Hopper"),
    }
}

/// Collects the field names out of a `Validation` error, in order.
pub fn validation_fields(err: &crate::error::ApiError) -> Vec<String> {
    match err {
        crate::error::ApiError::Validation(errors) => {
            errors.iter().map(|e| e.field.clone()).collect()
        }
        other => panic!("Expected a validation error, got: {other:?}"),
    }
}
