// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for detection operations

use thiserror::Error;

/// Result type alias for detection operations
pub type Result<T> = std::result::Result<T, DetectError>;

/// Errors that can occur during floor/component detection
#[derive(Error, Debug)]
pub enum DetectError {
    /// Configuration rejected at setup time
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A component-type pattern failed to compile
    #[error("Invalid pattern for component type '{key}': {message}")]
    InvalidPattern { key: String, message: String },
}

impl DetectError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        DetectError::InvalidConfig(msg.into())
    }

    /// Create a new pattern error
    pub fn pattern(key: impl Into<String>, msg: impl Into<String>) -> Self {
        DetectError::InvalidPattern {
            key: key.into(),
            message: msg.into(),
        }
    }
}
