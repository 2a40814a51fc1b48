//! Error types for the causality ledger.
//!
//! "No prior event" is not an error anywhere in this crate: lookups return
//! `Ok(None)`. The variants below cover the two failure kinds that must
//! reach the caller — storage that cannot be reached, and storage that
//! exists but cannot be trusted.

use std::io;
use std::path::PathBuf;

/// Errors that can occur during ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The ledger directory or store file could not be created or opened
    /// (permissions, a non-directory in the path, medium failure).
    #[error("ledger storage unavailable at {}: {source}", path.display())]
    Unavailable {
        /// The path that could not be created or opened.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The store exists but a query against it failed, or its content
    /// could not be parsed. Distinct from "no prior event": coercing a
    /// corrupted store to an empty result would break the causal chain
    /// with no visible signal.
    #[error("ledger store error: {0}")]
    Store(#[from] rusqlite::Error),
}
