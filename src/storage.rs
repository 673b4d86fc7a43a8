/// The single undo slot in chrome.storage.local, and capture of the layout that goes in it
use crate::config::Settings;
use crate::error::{CollapseError, HostContext};
use crate::host::{KeyValueStore, TabHost};
use crate::snapshot::Snapshot;
use crate::tab_data::WindowId;
use log::{debug, info, warn};
use uuid::Uuid;

/// Claim on the pending undo point
///
/// Handed out by a capture or by [`SnapshotStore::claim`], and consumed by a
/// restore. Not `Clone`: one ticket restores one snapshot.
#[derive(Debug)]
pub struct UndoTicket {
    snapshot: Snapshot,
}

impl UndoTicket {
    pub fn id(&self) -> Uuid {
        self.snapshot.ticket
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

/// Last-write-wins storage for one [`Snapshot`]
pub struct SnapshotStore<K> {
    kv: K,
    key: String,
}

impl<K: KeyValueStore> SnapshotStore<K> {
    pub fn new(kv: K, settings: &Settings) -> Self {
        SnapshotStore {
            kv,
            key: settings.storage_key.clone(),
        }
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    /// Persist `snapshot` in one write, replacing whatever was there
    pub async fn save(&self, snapshot: Snapshot) -> Result<UndoTicket, CollapseError> {
        let value = serde_json::to_value(&snapshot)?;
        self.kv
            .set(&self.key, value)
            .await
            .map_err(|source| self.storage_error(source))?;

        debug!(
            "Saved {} snapshot {} ({} tabs)",
            snapshot.scope(),
            snapshot.ticket,
            snapshot.tab_count()
        );
        Ok(UndoTicket { snapshot })
    }

    /// Read the stored snapshot without consuming it
    pub async fn load(&self) -> Result<Option<Snapshot>, CollapseError> {
        let value = self
            .kv
            .get(&self.key)
            .await
            .map_err(|source| self.storage_error(source))?;

        match value {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| CollapseError::MalformedState(e.to_string())),
        }
    }

    pub async fn has_state(&self) -> Result<bool, CollapseError> {
        let value = self
            .kv
            .get(&self.key)
            .await
            .map_err(|source| self.storage_error(source))?;
        Ok(!matches!(value, None | Some(serde_json::Value::Null)))
    }

    /// Take a ticket for the stored snapshot, if there is one
    pub async fn claim(&self) -> Result<Option<UndoTicket>, CollapseError> {
        Ok(self.load().await?.map(|snapshot| UndoTicket { snapshot }))
    }

    /// Consume `ticket`, clearing the slot if it still holds that ticket's snapshot
    ///
    /// Returns false when the slot was already empty or has since been
    /// overwritten by a newer capture, which is left in place.
    pub async fn release(&self, ticket: UndoTicket) -> Result<bool, CollapseError> {
        let current = match self.load().await {
            Ok(current) => current,
            Err(CollapseError::MalformedState(reason)) => {
                warn!("Leaving unreadable undo state in place: {}", reason);
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        match current {
            Some(stored) if stored.ticket == ticket.id() => {
                self.remove().await?;
                debug!("Released snapshot {}", ticket.id());
                Ok(true)
            }
            Some(stored) => {
                warn!(
                    "Snapshot {} was replaced by {} before it was released",
                    ticket.id(),
                    stored.ticket
                );
                Ok(false)
            }
            None => Ok(false),
        }
    }

    /// Drop any stored snapshot unconditionally
    pub async fn discard(&self) -> Result<(), CollapseError> {
        self.remove().await?;
        debug!("Discarded undo state");
        Ok(())
    }

    /// Capture one window's tabs and groups
    ///
    /// Nothing is written unless both queries succeed.
    pub async fn capture_window<H: TabHost>(
        &self,
        host: &H,
        window_id: WindowId,
        timestamp: f64,
    ) -> Result<UndoTicket, CollapseError> {
        let tabs = host
            .tabs_in_window(window_id)
            .await
            .context("capturing tabs")?;
        let groups = host
            .groups_in_window(window_id)
            .await
            .context("capturing tab groups")?;

        let ticket = self
            .save(Snapshot::of_window(window_id, &tabs, &groups, timestamp))
            .await?;
        info!(
            "Captured window {}: {} tabs, {} groups",
            window_id,
            tabs.len(),
            groups.len()
        );
        Ok(ticket)
    }

    /// Capture the tabs of every open window
    pub async fn capture_all<H: TabHost>(
        &self,
        host: &H,
        timestamp: f64,
    ) -> Result<UndoTicket, CollapseError> {
        let windows = host.windows().await.context("capturing windows")?;

        let ticket = self.save(Snapshot::of_windows(&windows, timestamp)).await?;
        info!(
            "Captured {} windows, {} tabs",
            windows.len(),
            ticket.snapshot().tab_count()
        );
        Ok(ticket)
    }

    async fn remove(&self) -> Result<(), CollapseError> {
        self.kv
            .remove(&self.key)
            .await
            .map_err(|source| self.storage_error(source))
    }

    fn storage_error(&self, source: crate::error::HostError) -> CollapseError {
        CollapseError::Storage {
            key: self.key.clone(),
            source,
        }
    }
}
