// Copyright (C) 2026 Rollbook Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session extraction for the server.
//!
//! This module provides the Axum extractor that turns the session cookie
//! into an authenticated user at the handler boundary. Anything without a
//! valid session is redirected to the login page instead of receiving an
//! API-style 401, since every route here serves a browser.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, warn};

use rollbook_api::{AuthenticatedUser, AuthenticationService};

use crate::AppState;

/// Name of the session cookie set at login.
pub const SESSION_COOKIE: &str = "session";

/// Extractor for authenticated users.
///
/// Reads the session cookie, validates the token, and hands the handler the
/// authenticated user along with the raw token (logout needs the token to
/// delete the session).
///
/// # Authentication Flow
///
/// 1. Extract the `session` cookie from the `Cookie` header
/// 2. Validate the token via `AuthenticationService::validate_session`
/// 3. Return the `AuthenticatedUser` and the token
///
/// # Errors
///
/// Redirects to `/login` if the cookie is missing or the session is invalid
/// or expired.
pub struct SessionUser {
    /// The authenticated account.
    pub user: AuthenticatedUser,
    /// The raw session token from the cookie.
    pub token: String,
}

/// Finds the named cookie in a `Cookie` header value.
fn cookie_value<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    cookie_header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        if key == name { Some(value) } else { None }
    })
}

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = SessionRedirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookie_header: &str = parts
            .headers
            .get(header::COOKIE)
            .ok_or_else(|| {
                debug!("No cookie header on request");
                SessionRedirect
            })?
            .to_str()
            .map_err(|_| {
                warn!("Invalid cookie header encoding");
                SessionRedirect
            })?;

        let token: &str = cookie_value(cookie_header, SESSION_COOKIE).ok_or_else(|| {
            debug!("No session cookie on request");
            SessionRedirect
        })?;

        let mut persistence = state.persistence.lock().await;
        let user: AuthenticatedUser =
            AuthenticationService::validate_session(&mut persistence, token).map_err(|e| {
                warn!(error = %e, "Session validation failed");
                SessionRedirect
            })?;
        drop(persistence);

        debug!(
            login_name = %user.login_name,
            role = %user.role,
            "Session validated successfully"
        );

        Ok(Self {
            user,
            token: token.to_string(),
        })
    }
}

/// Rejection for a missing or invalid session: bounce to the login page.
#[derive(Debug)]
pub struct SessionRedirect;

impl IntoResponse for SessionRedirect {
    fn into_response(self) -> Response {
        Redirect::to("/login").into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::cookie_value;

    #[test]
    fn test_cookie_value_finds_the_named_cookie() {
        let header = "csrftoken=abc; session=session_123_456; theme=dark";
        assert_eq!(cookie_value(header, "session"), Some("session_123_456"));
        assert_eq!(cookie_value(header, "theme"), Some("dark"));
        assert_eq!(cookie_value(header, "missing"), None);
    }

    #[test]
    fn test_cookie_value_ignores_name_prefixes() {
        let header = "oldsession=nope; session=yes";
        assert_eq!(cookie_value(header, "session"), Some("yes"));
    }
}
