//! Event causality ledger for the Causeway event chain.
//!
//! Every event Causeway emits carries a causal link to the most recent
//! prior event of the same lineage, so downstream consumers can reconstruct
//! an unbroken chain per project. This crate is the subsystem that durably
//! records, looks up, and atomically updates the "last emitted event id"
//! per lineage key.
//!
//! # Storage layout
//!
//! One SQLite file per project, located at
//! `<root>/<parent-segments>/<tail>.db` where the project name is split at
//! its last `/`. Each file holds two independent key-value tables, one per
//! [`Lineage`](causeway_types::Lineage):
//!
//! | Table | Lineage | Key |
//! |-------|---------|-----|
//! | `submitted_events` | branch-scoped | branch name |
//! | `created_events` | change-scoped | change identifier |
//!
//! A project's ledger file is created lazily on the first write; its
//! absence is the normal "no event recorded yet" state, never an error.
//!
//! # Usage
//!
//! ```rust,ignore
//! use causeway_ledger::Ledger;
//! use causeway_types::Lineage;
//!
//! let ledger = Ledger::new("/var/lib/causeway");
//!
//! // Annotate an outgoing event with its causal predecessor.
//! let previous = ledger.last_event_id("team/service", "master", Lineage::Branch)?;
//!
//! // After successful publication, record the new head of the chain.
//! ledger.set_last_event_id("team/service", "master", &event_id, Lineage::Branch)?;
//! ```

mod error;
mod ledger;
mod paths;
mod schema;
mod store;

pub use error::LedgerError;
pub use ledger::Ledger;
pub use store::{LedgerStore, LedgerTable};
