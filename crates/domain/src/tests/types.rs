// Copyright (C) 2026 Rollbook Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{DomainError, Role};
use std::str::FromStr;

#[test]
fn test_role_round_trips_through_string_form() {
    for role in [Role::Admin, Role::Teacher] {
        let parsed: Role = Role::from_str(role.as_str()).unwrap();
        assert_eq!(parsed, role);
    }
}

#[test]
fn test_role_display_matches_as_str() {
    assert_eq!(Role::Admin.to_string(), "Admin");
    assert_eq!(Role::Teacher.to_string(), "Teacher");
}

#[test]
fn test_unknown_role_string_is_rejected() {
    let result: Result<Role, DomainError> = Role::from_str("superuser");
    assert_eq!(
        result,
        Err(DomainError::InvalidRole(String::from("superuser")))
    );
}

#[test]
fn test_role_parse_is_case_sensitive() {
    // Stored role strings are written by us, so lowercase input means
    // corruption, not a user typo.
    assert!(Role::from_str("admin").is_err());
    assert!(Role::from_str("TEACHER").is_err());
}
