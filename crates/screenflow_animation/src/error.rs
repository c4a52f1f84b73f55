// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors raised while loading authored sequences.

use thiserror::Error;

/// Sequence loading errors
#[derive(Debug, Error)]
pub enum SequenceError {
    /// A sequence chains back to itself, directly or transitively
    #[error("Sequence chain forms a cycle: {}", .0.join(" -> "))]
    ChainCycle(Vec<String>),

    /// A chain names a sequence that does not exist
    #[error("Sequence '{sequence}' chains to unknown sequence '{chain}'")]
    UnknownChain {
        /// Sequence holding the chain
        sequence: String,
        /// Missing chain target
        chain: String,
    },

    /// Two sequences share a name
    #[error("Duplicate sequence name: {0}")]
    DuplicateName(String),

    /// RON parse error
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sequence loading
pub type Result<T> = std::result::Result<T, SequenceError>;
