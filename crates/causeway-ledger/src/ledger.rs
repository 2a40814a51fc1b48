//! Ledger facade: the single entry point used by event producers.
//!
//! Hides store lifecycle and table selection. A producer asks for the last
//! event id along a lineage to annotate an outgoing event, and records the
//! new id once the event has been published.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use causeway_types::{ChangeEvent, Lineage};

use crate::error::LedgerError;
use crate::paths;
use crate::store::{LedgerStore, LedgerTable};

/// Per-project event causality ledger.
///
/// Construct once and share (behind `Arc`) across the event production
/// pipeline; there is no global instance. Each project's store is an
/// independent, locally-persisted unit, created the first time an event is
/// recorded for that project.
#[derive(Debug)]
pub struct Ledger {
    /// Root directory for per-project store files. `None` disables state
    /// handling entirely.
    root: Option<PathBuf>,
    /// One lock per physical store, keyed by resolved store path. Guards
    /// the read-decide-write sequence in [`Ledger::set_last_event_id`]:
    /// without it, two concurrent first-writers can both observe "absent"
    /// and both take the insert path.
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl Ledger {
    /// Creates a ledger rooted at `root`.
    ///
    /// The directory itself is created lazily, on the first write of the
    /// first project that needs it.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a disabled ledger.
    ///
    /// Lookups report no prior event and writes are dropped with a debug
    /// log. Used when the host runs without a state directory configured.
    pub fn disabled() -> Self {
        Self {
            root: None,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the last recorded event id for a lineage key.
    ///
    /// `Ok(None)` means "first event in this lineage": the project has no
    /// ledger yet, or the key is unset. A store that exists but cannot be
    /// read is an error — silently treating corruption as "no prior event"
    /// would break the causal chain without any visible signal.
    ///
    /// Bare reads take no lock; WAL mode guarantees a consistent,
    /// last-completed-write view.
    pub fn last_event_id(
        &self,
        project: &str,
        key: &str,
        lineage: Lineage,
    ) -> Result<Option<String>, LedgerError> {
        let Some(root) = &self.root else {
            return Ok(None);
        };

        let path = paths::store_path(root, project);
        if !path.exists() {
            return Ok(None);
        }

        let store = LedgerStore::open(&path)?;
        let event_id = store.get(LedgerTable::from(lineage), key)?;
        tracing::debug!(project, %lineage, key, event_id = ?event_id, "fetched last event id");
        Ok(event_id)
    }

    /// Records `event_id` as the last event for a lineage key.
    ///
    /// Creates the project's directories and store on first write, then
    /// reads the current value and inserts or updates accordingly. The
    /// whole sequence runs under the store's lock, so concurrent writers
    /// to the same project serialise and a retried write re-derives the
    /// insert-vs-update decision from current state.
    pub fn set_last_event_id(
        &self,
        project: &str,
        key: &str,
        event_id: &str,
        lineage: Lineage,
    ) -> Result<(), LedgerError> {
        let Some(root) = &self.root else {
            tracing::debug!(project, key, event_id, "state handling disabled, dropping event id");
            return Ok(());
        };

        let path = paths::store_path(root, project);
        let lock = self.store_lock(&path);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        paths::ensure_parent_dirs(&path)?;
        let store = LedgerStore::create(&path)?;
        let table = LedgerTable::from(lineage);

        match store.get(table, key)? {
            Some(old_event_id) => {
                store.update(table, key, event_id)?;
                tracing::info!(
                    project,
                    %lineage,
                    key,
                    %old_event_id,
                    new_event_id = event_id,
                    "replaced last event id"
                );
            }
            None => {
                store.insert(table, key, event_id)?;
                tracing::info!(project, %lineage, key, event_id, "recorded first event id for lineage");
            }
        }

        Ok(())
    }

    /// Returns the causal predecessor for an event about to be produced:
    /// the last recorded id along the event's own lineage.
    pub fn predecessor_of(&self, event: &ChangeEvent) -> Result<Option<String>, LedgerError> {
        self.last_event_id(event.project(), event.lineage_key(), event.lineage())
    }

    /// Records a published event as the new head of its chain.
    ///
    /// Project, lineage, and key are derived from the event payload's own
    /// fields, so the stored key always matches what was actually
    /// produced.
    pub fn record_event(&self, event_id: &str, event: &ChangeEvent) -> Result<(), LedgerError> {
        self.set_last_event_id(
            event.project(),
            event.lineage_key(),
            event_id,
            event.lineage(),
        )
    }

    fn store_lock(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(path.to_path_buf()).or_default().clone()
    }
}
