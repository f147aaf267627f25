// Copyright (C) 2026 Rollbook Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};

/// A stored login account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountData {
    pub account_id: i64,
    pub login_name: String,
    pub display_name: String,
    pub password_hash: String,
    /// Stored role string; parsed into `rollbook_domain::Role` by the api
    /// crate when the account is authenticated.
    pub role: String,
    pub created_at: String,
    pub last_login_at: Option<String>,
}

/// A stored browser session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub session_id: i64,
    pub session_token: String,
    pub account_id: i64,
    pub created_at: String,
    /// Expiration timestamp, ISO 8601.
    pub expires_at: String,
}
