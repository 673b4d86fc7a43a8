/// Undo: rebuild the layout recorded in a snapshot.
///
/// Restoring is best-effort. Tabs closed since the capture are skipped, a tab
/// that refuses to move does not stop the others, and groups that shrank
/// below the minimum size are not rebuilt. The snapshot is released only once
/// every step has run; an earlier failure leaves it in place for another try
/// (moves already made are not rolled back).
use crate::config::Settings;
use crate::error::{CollapseError, HostContext};
use crate::host::{KeyValueStore, TabHost};
use crate::report::{Report, Step, Subject};
use crate::snapshot::{GroupRecord, Layout, TabRecord, WindowRecord};
use crate::storage::{SnapshotStore, UndoTicket};
use crate::tab_data::{GroupId, GroupUpdate, TabId, TabSpec, WindowId, WindowSpec};
use log::{debug, info};
use std::collections::HashSet;

pub struct Restorer<'a, H, K> {
    host: &'a H,
    store: &'a SnapshotStore<K>,
    settings: &'a Settings,
}

impl<'a, H: TabHost, K: KeyValueStore> Restorer<'a, H, K> {
    pub fn new(host: &'a H, store: &'a SnapshotStore<K>, settings: &'a Settings) -> Self {
        Restorer {
            host,
            store,
            settings,
        }
    }

    /// Restore the snapshot behind `ticket`, consuming it
    pub async fn restore(&self, ticket: UndoTicket) -> Result<Report, CollapseError> {
        let mut report = Report::new();

        match &ticket.snapshot().layout {
            Layout::Window {
                window_id,
                tabs,
                groups,
            } => {
                self.restore_window(*window_id, tabs, groups, &mut report)
                    .await?
            }
            Layout::All { windows } => self.restore_all(windows, &mut report).await?,
        }

        self.store.release(ticket).await?;
        info!("Undo finished: {}", report.summary());
        Ok(report)
    }

    async fn restore_window(
        &self,
        window_id: WindowId,
        records: &[TabRecord],
        groups: &[GroupRecord],
        report: &mut Report,
    ) -> Result<(), CollapseError> {
        let current = self
            .host
            .tabs_in_window(window_id)
            .await
            .context("reading tabs to restore")?;
        let grouped: Vec<TabId> = current
            .iter()
            .filter(|tab| tab.is_grouped())
            .map(|tab| tab.id)
            .collect();
        if !grouped.is_empty() {
            self.host
                .ungroup_tabs(&grouped)
                .await
                .context("clearing groups before restore")?;
        }

        let mut survivors = Vec::with_capacity(records.len());
        for record in records {
            match self.host.get_tab(record.id).await {
                Ok(Some(_)) => survivors.push(record),
                Ok(None) => {
                    debug!("Tab {} was closed since the capture", record.id);
                    report.skipped(Step::Move, Subject::Tab(record.id), "tab no longer exists");
                }
                Err(e) => report.failed(Step::Move, Subject::Tab(record.id), &e),
            }
        }
        survivors.sort_by_key(|record| record.index);

        for (position, record) in survivors.iter().enumerate() {
            let result = self
                .host
                .move_tab(record.id, window_id, position as i32)
                .await;
            report.record(Step::Move, Subject::Tab(record.id), result);
        }

        let present: HashSet<TabId> = self
            .host
            .tabs_in_window(window_id)
            .await
            .context("reading tabs after reordering")?
            .iter()
            .map(|tab| tab.id)
            .collect();

        for (original_id, members) in partition_by_group(records) {
            let tab_ids: Vec<TabId> = members
                .into_iter()
                .filter(|id| present.contains(id))
                .collect();
            if tab_ids.len() < self.settings.min_group_size {
                report.skipped(
                    Step::Group,
                    Subject::Group(original_id),
                    format!("only {} tab(s) left", tab_ids.len()),
                );
                continue;
            }

            let group_id = match self.host.group_tabs(&tab_ids).await {
                Ok(group_id) => {
                    report.applied(Step::Group, Subject::Group(original_id));
                    group_id
                }
                Err(e) => {
                    report.failed(Step::Group, Subject::Group(original_id), &e);
                    continue;
                }
            };

            if let Some(meta) = groups.iter().find(|g| g.id == original_id) {
                let update = GroupUpdate {
                    title: Some(meta.title.clone()),
                    color: Some(meta.color),
                    collapsed: Some(meta.collapsed),
                };
                let result = self.host.update_group(group_id, &update).await;
                report.record(Step::UpdateGroup, Subject::Group(group_id), result);
            }
        }

        if let Some(active) = records.iter().find(|record| record.active) {
            if survivors.iter().any(|record| record.id == active.id) {
                let result = self.host.activate_tab(active.id).await;
                report.record(Step::Activate, Subject::Tab(active.id), result);
            } else {
                report.skipped(
                    Step::Activate,
                    Subject::Tab(active.id),
                    "tab no longer exists",
                );
            }
        }

        Ok(())
    }

    /// Replace every open window with the captured ones
    ///
    /// Only urls and pinned flags come back: neither groups nor the active
    /// tab are recorded in this scope.
    async fn restore_all(
        &self,
        records: &[WindowRecord],
        report: &mut Report,
    ) -> Result<(), CollapseError> {
        let open = self
            .host
            .windows()
            .await
            .context("listing windows to replace")?;
        for window in &open {
            let result = self.host.remove_window(window.id).await;
            report.record(Step::CloseWindow, Subject::Window(window.id), result);
        }

        for record in records {
            let spec = WindowSpec {
                url: None,
                focused: record.focused,
                state: None,
            };
            let created = match self.host.create_window(&spec).await {
                Ok(created) => {
                    report.applied(Step::CreateWindow, Subject::Window(record.id));
                    created
                }
                Err(e) => {
                    report.failed(Step::CreateWindow, Subject::Window(record.id), &e);
                    continue;
                }
            };

            let mut tabs: Vec<&TabRecord> = record.tabs.iter().collect();
            tabs.sort_by_key(|tab| tab.index);

            let mut recreated = 0;
            for tab in tabs {
                let spec = TabSpec {
                    window_id: created.id,
                    url: tab.url.clone(),
                    pinned: tab.pinned,
                    active: false,
                };
                match self.host.create_tab(&spec).await {
                    Ok(_) => {
                        report.applied(Step::CreateTab, Subject::Tab(tab.id));
                        recreated += 1;
                    }
                    Err(e) => report.failed(Step::CreateTab, Subject::Tab(tab.id), &e),
                }
            }

            // A new window opens on a blank tab of its own
            if recreated > 0 {
                for placeholder in &created.tabs {
                    let result = self.host.remove_tab(placeholder.id).await;
                    report.record(Step::RemoveTab, Subject::Tab(placeholder.id), result);
                }
            }
        }

        Ok(())
    }
}

/// Group captured tabs by their original group, in order of first appearance
///
/// Ungrouped and pinned tabs are left out: pinned tabs cannot join a group.
pub fn partition_by_group(records: &[TabRecord]) -> Vec<(GroupId, Vec<TabId>)> {
    let mut partitions: Vec<(GroupId, Vec<TabId>)> = Vec::new();

    for record in records.iter().filter(|r| r.is_grouped() && !r.pinned) {
        match partitions.iter_mut().find(|(id, _)| *id == record.group_id) {
            Some((_, members)) => members.push(record.id),
            None => partitions.push((record.group_id, vec![record.id])),
        }
    }

    partitions
}
