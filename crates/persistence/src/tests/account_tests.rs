// Copyright (C) 2026 Rollbook Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Account and session storage tests.

use rollbook_domain::Role;

use crate::tests::create_test_persistence;
use crate::{AccountData, Persistence, PersistenceError, SessionData};

#[test]
fn test_create_and_fetch_account() {
    let mut persistence: Persistence = create_test_persistence();
    let id: i64 = persistence
        .create_account("admin", "Site Admin", "hunter2", Role::Admin)
        .unwrap();

    let account: AccountData = persistence.get_account_by_login("admin").unwrap().unwrap();
    assert_eq!(account.account_id, id);
    assert_eq!(account.display_name, "Site Admin");
    assert_eq!(account.role, "Admin");

    let by_id: AccountData = persistence.get_account_by_id(id).unwrap().unwrap();
    assert_eq!(by_id.login_name, "admin");
}

#[test]
fn test_password_is_stored_hashed_and_verifies() {
    let mut persistence: Persistence = create_test_persistence();
    persistence
        .create_account("admin", "Site Admin", "hunter2", Role::Admin)
        .unwrap();

    let account: AccountData = persistence.get_account_by_login("admin").unwrap().unwrap();
    assert_ne!(account.password_hash, "hunter2");
    assert!(persistence
        .verify_password("hunter2", &account.password_hash)
        .unwrap());
    assert!(!persistence
        .verify_password("wrong", &account.password_hash)
        .unwrap());
}

#[test]
fn test_duplicate_login_name_is_a_unique_violation() {
    let mut persistence: Persistence = create_test_persistence();
    persistence
        .create_account("admin", "Site Admin", "hunter2", Role::Admin)
        .unwrap();

    let result: Result<i64, PersistenceError> =
        persistence.create_account("admin", "Other Admin", "secret", Role::Teacher);

    assert!(matches!(result, Err(PersistenceError::UniqueViolation(_))));
    assert_eq!(persistence.count_accounts().unwrap(), 1);
}

#[test]
fn test_unknown_account_lookup_returns_none() {
    let mut persistence: Persistence = create_test_persistence();
    assert!(persistence.get_account_by_login("ghost").unwrap().is_none());
    assert!(persistence.get_account_by_id(42).unwrap().is_none());
}

#[test]
fn test_session_round_trip_and_deletion() {
    let mut persistence: Persistence = create_test_persistence();
    let account_id: i64 = persistence
        .create_account("admin", "Site Admin", "hunter2", Role::Admin)
        .unwrap();

    persistence
        .create_session("token-1", account_id, "2099-01-01T00:00:00Z")
        .unwrap();

    let session: SessionData = persistence.get_session_by_token("token-1").unwrap().unwrap();
    assert_eq!(session.account_id, account_id);
    assert_eq!(session.expires_at, "2099-01-01T00:00:00Z");

    persistence.delete_session("token-1").unwrap();
    assert!(persistence.get_session_by_token("token-1").unwrap().is_none());

    // Deleting again is not an error.
    persistence.delete_session("token-1").unwrap();
}

#[test]
fn test_expired_session_sweep_only_removes_past_expirations() {
    let mut persistence: Persistence = create_test_persistence();
    let account_id: i64 = persistence
        .create_account("admin", "Site Admin", "hunter2", Role::Admin)
        .unwrap();

    persistence
        .create_session("stale", account_id, "2020-01-01T00:00:00Z")
        .unwrap();
    persistence
        .create_session("fresh", account_id, "2099-01-01T00:00:00Z")
        .unwrap();

    let removed: usize = persistence
        .delete_expired_sessions("2026-01-01T00:00:00Z")
        .unwrap();

    assert_eq!(removed, 1);
    assert!(persistence.get_session_by_token("stale").unwrap().is_none());
    assert!(persistence.get_session_by_token("fresh").unwrap().is_some());
}
