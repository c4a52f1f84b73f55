// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors raised while registering screens and loading configuration.

use thiserror::Error;

/// Navigation setup errors
#[derive(Debug, Error)]
pub enum NavigationError {
    /// No registered screen has this name
    #[error("Unknown screen: {0}")]
    UnknownScreen(String),

    /// A primary screen was expected
    #[error("Screen '{0}' is not a primary screen")]
    NotAPrimary(String),

    /// A section names a parent that is not registered
    #[error("Section '{section}' has no registered parent screen")]
    UnknownParent {
        /// Section being registered
        section: String,
    },

    /// Configuration file is newer than this build understands
    #[error("Config version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version found in the file
        found: u32,
        /// Highest supported version
        supported: u32,
    },

    /// RON parse error
    #[error("Config error: {0}")]
    Config(#[from] ron::error::SpannedError),

    /// RON serialization error
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for navigation setup
pub type Result<T> = std::result::Result<T, NavigationError>;
