// Copyright (C) 2026 Rollbook Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

mod account_tests;

use crate::Persistence;

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("Failed to create in-memory persistence")
}

/// Inserts a student with defaults and returns its row id.
pub fn insert_test_student(persistence: &mut Persistence, student_id: &str) -> i64 {
    persistence
        .create_student("Ada", "Lovelace", student_id, "ada@example.com", "2026-02-01")
        .expect("Failed to insert test student")
}

/// Inserts a course with defaults and returns its row id.
pub fn insert_test_course(persistence: &mut Persistence, code: &str) -> i64 {
    persistence
        .create_course("Intro to Computing", code, Some("Grace Hopper"))
        .expect("Failed to insert test course")
}
