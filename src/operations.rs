/// Tab operations: collapse by domain, across windows, and the fresh-start reset
use crate::config::Settings;
use crate::domain::{domain_key, DomainClassifier};
use crate::error::{CollapseError, HostContext, HostError};
use crate::host::{KeyValueStore, TabHost};
use crate::report::{Report, Step, Subject};
use crate::storage::SnapshotStore;
use crate::tab_data::{GroupUpdate, TabId, TabInfo, WindowId, WindowSpec, WindowState, TAB_ID_NONE};
use log::{debug, info};

/// Tabs sharing a domain key, in the order they were found
#[derive(Debug, Clone, PartialEq)]
pub struct DomainPartition {
    pub domain: String,
    pub tabs: Vec<TabInfo>,
}

/// Partition tabs by domain key, keeping first-seen order of domains and tabs
pub fn partition_by_domain<'t>(tabs: impl IntoIterator<Item = &'t TabInfo>) -> Vec<DomainPartition> {
    let mut partitions: Vec<DomainPartition> = Vec::new();

    for tab in tabs {
        let domain = domain_key(&tab.url);
        match partitions.iter_mut().find(|p| p.domain == domain) {
            Some(partition) => partition.tabs.push(tab.clone()),
            None => partitions.push(DomainPartition {
                domain,
                tabs: vec![tab.clone()],
            }),
        }
    }

    partitions
}

pub struct Collapser<'a, H, K> {
    host: &'a H,
    store: &'a SnapshotStore<K>,
    classifier: &'a DomainClassifier,
    settings: &'a Settings,
}

impl<'a, H: TabHost, K: KeyValueStore> Collapser<'a, H, K> {
    pub fn new(
        host: &'a H,
        store: &'a SnapshotStore<K>,
        classifier: &'a DomainClassifier,
        settings: &'a Settings,
    ) -> Self {
        Collapser {
            host,
            store,
            classifier,
            settings,
        }
    }

    /// Group the current window's tabs by domain
    ///
    /// The window is captured first; if that fails nothing is touched.
    pub async fn collapse_current_window(&self, timestamp: f64) -> Result<Report, CollapseError> {
        let mut report = Report::new();
        let Some(window_id) = self
            .host
            .current_window()
            .await
            .context("finding the current window")?
        else {
            info!("No current window, nothing to collapse");
            return Ok(report);
        };

        self.store
            .capture_window(self.host, window_id, timestamp)
            .await?;

        let tabs = self
            .host
            .tabs_in_window(window_id)
            .await
            .context("reading tabs to collapse")?;
        self.ungroup(window_id, &tabs)
            .await
            .context("clearing groups before collapse")?;
        report.applied(Step::Ungroup, Subject::Window(window_id));

        self.group_by_domain(&tabs, &mut report).await;

        info!("Collapsed window {}: {}", window_id, report.summary());
        Ok(report)
    }

    /// Pull every domain with several tabs into the focused window and group it there
    pub async fn collapse_all_windows(&self, timestamp: f64) -> Result<Report, CollapseError> {
        let mut report = Report::new();
        self.store.capture_all(self.host, timestamp).await?;

        let windows = self
            .host
            .windows()
            .await
            .context("listing windows to collapse")?;
        let Some(focused) = windows
            .iter()
            .find(|w| w.focused)
            .or_else(|| windows.first())
            .map(|w| w.id)
        else {
            info!("No windows open, nothing to collapse");
            return Ok(report);
        };

        let mut partitions = partition_by_domain(
            windows
                .iter()
                .flat_map(|w| w.tabs.iter())
                .filter(|tab| tab.id != TAB_ID_NONE),
        );
        for partition in &mut partitions {
            partition.tabs.sort_by_key(|tab| (tab.window_id, tab.index));
        }

        for partition in partitions
            .iter()
            .filter(|p| p.tabs.len() >= self.settings.min_group_size)
        {
            for tab in partition.tabs.iter().filter(|tab| tab.window_id != focused) {
                let result = self.host.move_tab(tab.id, focused, -1).await;
                report.record(Step::Move, Subject::Tab(tab.id), result);
            }
        }

        let gathered = self
            .host
            .tabs_in_window(focused)
            .await
            .context("reading the focused window")?;
        self.ungroup(focused, &gathered)
            .await
            .context("clearing groups in the focused window")?;
        report.applied(Step::Ungroup, Subject::Window(focused));

        self.group_by_domain(&gathered, &mut report).await;

        for window in windows.iter().filter(|w| w.id != focused) {
            match self.host.tabs_in_window(window.id).await {
                Ok(remaining) if remaining.is_empty() => {
                    let result = self.host.remove_window(window.id).await;
                    report.record(Step::CloseWindow, Subject::Window(window.id), result);
                }
                Ok(_) => {}
                Err(e) => debug!("Window {} is already gone: {}", window.id, e),
            }
        }

        let remaining = self
            .host
            .tabs_in_window(focused)
            .await
            .context("reading the focused window")?;
        if !remaining.iter().any(|tab| tab.active) {
            if let Some(first) = remaining.first() {
                let result = self.host.activate_tab(first.id).await;
                report.record(Step::Activate, Subject::Tab(first.id), result);
            }
        }

        info!("Collapsed all windows into {}: {}", focused, report.summary());
        Ok(report)
    }

    /// Throw away every window for one fresh window on the landing page
    ///
    /// Clears the undo slot first: this action cannot be undone.
    pub async fn close_everything(&self) -> Result<Report, CollapseError> {
        let mut report = Report::new();
        self.store.discard().await?;

        let windows = self
            .host
            .windows()
            .await
            .context("listing windows to reset")?;
        for window in &windows {
            let result = self.ungroup(window.id, &window.tabs).await;
            report.record(Step::Ungroup, Subject::Window(window.id), result);
        }

        let spec = WindowSpec {
            url: Some(self.host.extension_url(&self.settings.landing_page)),
            focused: true,
            state: Some(WindowState::Maximized),
        };
        let fresh = self
            .host
            .create_window(&spec)
            .await
            .context("opening the fresh start window")?;
        report.applied(Step::CreateWindow, Subject::Window(fresh.id));

        for window in windows.iter().filter(|w| w.id != fresh.id) {
            match self.host.remove_window(window.id).await {
                Ok(()) => report.applied(Step::CloseWindow, Subject::Window(window.id)),
                Err(e) => {
                    debug!("Window {} was already closed: {}", window.id, e);
                    report.skipped(
                        Step::CloseWindow,
                        Subject::Window(window.id),
                        "already closed",
                    );
                }
            }
        }

        info!("Started fresh in window {}: {}", fresh.id, report.summary());
        Ok(report)
    }

    async fn ungroup(&self, window_id: WindowId, tabs: &[TabInfo]) -> Result<(), HostError> {
        let grouped: Vec<TabId> = tabs
            .iter()
            .filter(|tab| tab.is_grouped())
            .map(|tab| tab.id)
            .collect();
        if grouped.is_empty() {
            return Ok(());
        }
        debug!("Ungrouping {} tabs in window {}", grouped.len(), window_id);
        self.host.ungroup_tabs(&grouped).await
    }

    /// Group unpinned tabs by domain, one collapsed group per domain with enough tabs
    async fn group_by_domain(&self, tabs: &[TabInfo], report: &mut Report) {
        let groupable = tabs
            .iter()
            .filter(|tab| tab.id != TAB_ID_NONE && !tab.pinned);

        for partition in partition_by_domain(groupable) {
            if partition.tabs.len() < self.settings.min_group_size {
                continue;
            }

            let subject = Subject::Domain(partition.domain.clone());
            let tab_ids: Vec<TabId> = partition.tabs.iter().map(|tab| tab.id).collect();
            let group_id = match self.host.group_tabs(&tab_ids).await {
                Ok(group_id) => {
                    report.applied(Step::Group, subject);
                    group_id
                }
                Err(e) => {
                    report.failed(Step::Group, subject, &e);
                    continue;
                }
            };

            let update = GroupUpdate {
                title: Some(partition.domain.clone()),
                color: Some(self.classifier.color_for(&partition.domain)),
                collapsed: Some(self.settings.collapse_new_groups),
            };
            let result = self.host.update_group(group_id, &update).await;
            report.record(Step::UpdateGroup, Subject::Group(group_id), result);
        }
    }
}
