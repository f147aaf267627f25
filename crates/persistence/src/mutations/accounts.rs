// Copyright (C) 2026 Rollbook Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Account and session mutations.

use diesel::prelude::*;
use rollbook_domain::Role;
use tracing::{debug, info};

use crate::diesel_schema::{accounts, sessions};
use crate::error::PersistenceError;
use crate::sqlite;

/// Creates a new account.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `login_name` - The login name (unique)
/// * `display_name` - The display name
/// * `password` - The plain-text password (will be hashed)
/// * `role` - The account role
///
/// # Errors
///
/// Returns `PersistenceError::UniqueViolation` if the login name is taken,
/// or another error if hashing or the insert fails.
pub fn create_account(
    conn: &mut SqliteConnection,
    login_name: &str,
    display_name: &str,
    password: &str,
    role: Role,
) -> Result<i64, PersistenceError> {
    info!(
        "Creating account with login_name: {}, role: {}",
        login_name, role
    );

    let password_hash: String = bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| PersistenceError::Other(format!("Failed to hash password: {e}")))?;

    diesel::insert_into(accounts::table)
        .values((
            accounts::login_name.eq(login_name),
            accounts::display_name.eq(display_name),
            accounts::password_hash.eq(&password_hash),
            accounts::role.eq(role.as_str()),
        ))
        .execute(conn)?;

    let account_id: i64 = sqlite::get_last_insert_rowid(conn)?;

    info!(account_id, "Account created successfully");

    Ok(account_id)
}

/// Updates the last login timestamp for an account.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_last_login(
    conn: &mut SqliteConnection,
    account_id: i64,
) -> Result<(), PersistenceError> {
    debug!("Updating last_login_at for account ID: {}", account_id);

    diesel::update(accounts::table)
        .filter(accounts::account_id.eq(account_id))
        .set(accounts::last_login_at.eq(diesel::dsl::sql::<
            diesel::sql_types::Nullable<diesel::sql_types::Text>,
        >("CURRENT_TIMESTAMP")))
        .execute(conn)?;

    Ok(())
}

/// Creates a session row for an account.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_session(
    conn: &mut SqliteConnection,
    session_token: &str,
    account_id: i64,
    expires_at: &str,
) -> Result<i64, PersistenceError> {
    debug!("Creating session for account ID: {}", account_id);

    diesel::insert_into(sessions::table)
        .values((
            sessions::session_token.eq(session_token),
            sessions::account_id.eq(account_id),
            sessions::expires_at.eq(expires_at),
        ))
        .execute(conn)?;

    sqlite::get_last_insert_rowid(conn)
}

/// Deletes a session by token. Deleting an absent token is not an error.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_session(
    conn: &mut SqliteConnection,
    session_token: &str,
) -> Result<(), PersistenceError> {
    diesel::delete(sessions::table)
        .filter(sessions::session_token.eq(session_token))
        .execute(conn)?;

    Ok(())
}

/// Deletes all sessions whose expiration timestamp has passed.
///
/// Returns the number of sessions removed.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_expired_sessions(
    conn: &mut SqliteConnection,
    now: &str,
) -> Result<usize, PersistenceError> {
    let deleted: usize = diesel::delete(sessions::table)
        .filter(sessions::expires_at.lt(now))
        .execute(conn)?;

    if deleted > 0 {
        info!(deleted, "Removed expired sessions");
    }

    Ok(deleted)
}
