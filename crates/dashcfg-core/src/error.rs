//! Error Types
//!
//! Errors raised while decoding stored tab and color snapshots.

use thiserror::Error;

/// A stored snapshot could not be decoded into the typed model.
///
/// Historical rows are validated on read; malformed data fails fast
/// instead of being passed along as untyped JSON.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// The JSON did not match the tab/color structure.
    #[error("malformed {field}: {message}")]
    Malformed {
        /// Which snapshot field failed (`tabs` or `colors`).
        field: &'static str,
        /// Decoder message.
        message: String,
    },

    /// A tab was stored without an id.
    #[error("tab at position {position} has an empty id")]
    EmptyTabId {
        /// Zero-based index of the offending tab.
        position: usize,
    },

    /// Two tabs share the same id.
    #[error("duplicate tab id '{0}'")]
    DuplicateTabId(String),
}

impl SnapshotError {
    pub(crate) fn malformed(field: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Malformed {
            field,
            message: err.to_string(),
        }
    }
}
