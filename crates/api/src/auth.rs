// Copyright (C) 2026 Rollbook Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization services.

use std::str::FromStr;

use time::{Duration, OffsetDateTime};

use rollbook_domain::Role;
use rollbook_persistence::{AccountData, Persistence, SessionData};

use crate::error::AuthError;

/// An authenticated account with an associated role.
///
/// Every API operation takes the authenticated account explicitly; there is
/// no ambient "current user" state anywhere in the crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Storage row id of the account.
    pub account_id: i64,
    /// The login name used to authenticate.
    pub login_name: String,
    /// Human-readable name for display.
    pub display_name: String,
    /// The role assigned to this account.
    pub role: Role,
}

impl AuthenticatedUser {
    /// Creates a new authenticated user.
    #[must_use]
    pub const fn new(account_id: i64, login_name: String, display_name: String, role: Role) -> Self {
        Self {
            account_id,
            login_name,
            display_name,
            role,
        }
    }

    fn from_account(account: &AccountData) -> Result<Self, AuthError> {
        let role: Role =
            Role::from_str(&account.role).map_err(|e| AuthError::AuthenticationFailed {
                reason: e.to_string(),
            })?;
        Ok(Self::new(
            account.account_id,
            account.login_name.clone(),
            account.display_name.clone(),
            role,
        ))
    }
}

/// Authorization service for enforcing role-based access control.
///
/// Record mutations are Admin-only; any authenticated account may read.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks that an account holds the Admin role before `action`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthorized` for any other role.
    pub fn require_admin(user: &AuthenticatedUser, action: &str) -> Result<(), AuthError> {
        match user.role {
            Role::Admin => Ok(()),
            Role::Teacher => Err(AuthError::Unauthorized {
                action: String::from(action),
                required_role: String::from("Admin"),
            }),
        }
    }

    /// Checks that an account holds the Teacher role before `action`.
    ///
    /// No current route is teacher-only; every mutation goes through
    /// [`Self::require_admin`] and reads need only a session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthorized` for any other role.
    pub fn require_teacher(user: &AuthenticatedUser, action: &str) -> Result<(), AuthError> {
        match user.role {
            Role::Teacher => Ok(()),
            Role::Admin => Err(AuthError::Unauthorized {
                action: String::from(action),
                required_role: String::from("Teacher"),
            }),
        }
    }

    /// Checks if an account may create, update, or delete students.
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not have the Admin role.
    pub fn authorize_manage_students(user: &AuthenticatedUser) -> Result<(), AuthError> {
        Self::require_admin(user, "manage_students")
    }

    /// Checks if an account may create, update, or delete courses.
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not have the Admin role.
    pub fn authorize_manage_courses(user: &AuthenticatedUser) -> Result<(), AuthError> {
        Self::require_admin(user, "manage_courses")
    }

    /// Checks if an account may create, update, or delete enrollments.
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not have the Admin role.
    pub fn authorize_manage_enrollments(user: &AuthenticatedUser) -> Result<(), AuthError> {
        Self::require_admin(user, "manage_enrollments")
    }

    /// Checks if an account may list and view records.
    ///
    /// Every authenticated account may read; authentication itself is the
    /// gate.
    ///
    /// # Errors
    ///
    /// Never fails; the `Result` keeps the call shape uniform with the
    /// mutation checks.
    pub const fn authorize_view_records(_user: &AuthenticatedUser) -> Result<(), AuthError> {
        Ok(())
    }
}

/// Authentication service for session-based authentication.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Default session expiration duration (30 days).
    const DEFAULT_SESSION_EXPIRATION: Duration = Duration::days(30);

    /// Reason string for every credential failure. Deliberately does not
    /// reveal whether the login name or the password was wrong.
    const BAD_CREDENTIALS: &'static str = "Invalid login name or password";

    /// Authenticates an account by login name and password and creates a
    /// session.
    ///
    /// # Returns
    ///
    /// A tuple of (`session_token`, `authenticated_user`)
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AuthenticationFailed` on unknown login names and
    /// wrong passwords alike, with a reason that does not distinguish the
    /// two cases.
    pub fn login(
        persistence: &mut Persistence,
        login_name: &str,
        password: &str,
    ) -> Result<(String, AuthenticatedUser), AuthError> {
        let account: AccountData = persistence
            .get_account_by_login(login_name)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Database error: {e}"),
            })?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from(Self::BAD_CREDENTIALS),
            })?;

        let password_matches: bool = persistence
            .verify_password(password, &account.password_hash)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Password verification error: {e}"),
            })?;
        if !password_matches {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from(Self::BAD_CREDENTIALS),
            });
        }

        let user: AuthenticatedUser = AuthenticatedUser::from_account(&account)?;

        let session_token: String = Self::generate_session_token();
        let expires_at: OffsetDateTime =
            OffsetDateTime::now_utc() + Self::DEFAULT_SESSION_EXPIRATION;
        let expires_at_str: String = expires_at
            .format(&time::format_description::well_known::Iso8601::DEFAULT)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to format expiration time: {e}"),
            })?;

        persistence
            .create_session(&session_token, account.account_id, &expires_at_str)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to create session: {e}"),
            })?;

        persistence
            .update_last_login(account.account_id)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to update last login: {e}"),
            })?;

        Ok((session_token, user))
    }

    /// Validates a session token and returns the authenticated user.
    ///
    /// Expired sessions are deleted on sight before the failure is reported.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown, expired, or refers to an
    /// account that no longer exists.
    pub fn validate_session(
        persistence: &mut Persistence,
        session_token: &str,
    ) -> Result<AuthenticatedUser, AuthError> {
        let session: SessionData = persistence
            .get_session_by_token(session_token)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Database error: {e}"),
            })?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        let expires_at: OffsetDateTime = OffsetDateTime::parse(
            &session.expires_at,
            &time::format_description::well_known::Iso8601::DEFAULT,
        )
        .map_err(|e| AuthError::AuthenticationFailed {
            reason: format!("Failed to parse session expiration: {e}"),
        })?;

        if OffsetDateTime::now_utc() > expires_at {
            persistence.delete_session(session_token).map_err(|e| {
                AuthError::AuthenticationFailed {
                    reason: format!("Failed to delete expired session: {e}"),
                }
            })?;
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let account: AccountData = persistence
            .get_account_by_id(session.account_id)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Database error: {e}"),
            })?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Account not found"),
            })?;

        AuthenticatedUser::from_account(&account)
    }

    /// Logs out by deleting the session.
    ///
    /// Unknown tokens are not an error; logout is idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the session deletion fails.
    pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), AuthError> {
        persistence
            .delete_session(session_token)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to delete session: {e}"),
            })?;

        Ok(())
    }

    /// Deletes every stored session that has already expired.
    ///
    /// Run once at server startup; steady-state cleanup happens in
    /// [`Self::validate_session`], which deletes expired sessions as they are
    /// presented. Returns the number of sessions removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn sweep_expired_sessions(persistence: &mut Persistence) -> Result<usize, AuthError> {
        let now: String = OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Iso8601::DEFAULT)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to format current time: {e}"),
            })?;
        persistence
            .delete_expired_sessions(&now)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to delete expired sessions: {e}"),
            })
    }

    /// Generates a session token.
    ///
    /// In a production system, this would use a cryptographically secure
    /// random number generator. For simplicity, we use a timestamp-based
    /// approach here.
    fn generate_session_token() -> String {
        use std::time::{SystemTime, UNIX_EPOCH};
        let timestamp: u128 = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Time went backwards")
            .as_nanos();
        format!("session_{timestamp}_{}", rand::random::<u64>())
    }
}
