// Copyright (C) 2026 Rollbook Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};

/// Errors that can occur while constructing domain values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The role string does not name a known role.
    InvalidRole(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRole(s) => {
                write!(f, "Invalid role: '{s}'. Must be 'Admin' or 'Teacher'")
            }
        }
    }
}

impl std::error::Error for DomainError {}

/// A single validation failure attributed to one form field.
///
/// Validation functions return a list of these so that every problem with a
/// submission is reported at once, next to the field it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// The field the error belongs to.
    pub field: String,
    /// A human-readable message suitable for display next to the field.
    pub message: String,
}

impl FieldError {
    /// Creates a new field error.
    #[must_use]
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
