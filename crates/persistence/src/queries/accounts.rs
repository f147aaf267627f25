// Copyright (C) 2026 Rollbook Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Account and session queries.

use diesel::prelude::*;
use tracing::debug;

use crate::data_models::{AccountData, SessionData};
use crate::diesel_schema::{accounts, sessions};
use crate::error::PersistenceError;

/// Diesel Queryable struct for account rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = accounts)]
struct AccountRow {
    account_id: i64,
    login_name: String,
    display_name: String,
    password_hash: String,
    role: String,
    created_at: String,
    last_login_at: Option<String>,
}

impl From<AccountRow> for AccountData {
    fn from(row: AccountRow) -> Self {
        Self {
            account_id: row.account_id,
            login_name: row.login_name,
            display_name: row.display_name,
            password_hash: row.password_hash,
            role: row.role,
            created_at: row.created_at,
            last_login_at: row.last_login_at,
        }
    }
}

/// Diesel Queryable struct for session rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = sessions)]
struct SessionRow {
    session_id: i64,
    session_token: String,
    account_id: i64,
    created_at: String,
    expires_at: String,
}

impl From<SessionRow> for SessionData {
    fn from(row: SessionRow) -> Self {
        Self {
            session_id: row.session_id,
            session_token: row.session_token,
            account_id: row.account_id,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

/// Retrieves an account by login name.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the account is not found.
pub fn get_account_by_login(
    conn: &mut SqliteConnection,
    login_name: &str,
) -> Result<Option<AccountData>, PersistenceError> {
    debug!("Looking up account by login_name: {}", login_name);

    let result: Result<AccountRow, diesel::result::Error> = accounts::table
        .filter(accounts::login_name.eq(login_name))
        .select(AccountRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(row.into())),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Retrieves an account by row id.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the account is not found.
pub fn get_account_by_id(
    conn: &mut SqliteConnection,
    account_id: i64,
) -> Result<Option<AccountData>, PersistenceError> {
    let result: Result<AccountRow, diesel::result::Error> = accounts::table
        .filter(accounts::account_id.eq(account_id))
        .select(AccountRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(row.into())),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Counts all accounts.
///
/// Used at startup to decide whether the bootstrap admin must be created.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_accounts(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    Ok(accounts::table.count().get_result(conn)?)
}

/// Retrieves a session by its token.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if no session holds this token.
pub fn get_session_by_token(
    conn: &mut SqliteConnection,
    session_token: &str,
) -> Result<Option<SessionData>, PersistenceError> {
    let result: Result<SessionRow, diesel::result::Error> = sessions::table
        .filter(sessions::session_token.eq(session_token))
        .select(SessionRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(row.into())),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Verifies a password against a stored bcrypt hash.
///
/// # Errors
///
/// Returns an error if hash parsing fails.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, PersistenceError> {
    bcrypt::verify(password, password_hash)
        .map_err(|e| PersistenceError::Other(format!("Failed to verify password: {e}")))
}
