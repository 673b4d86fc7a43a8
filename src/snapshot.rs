/// Snapshot records: the persisted layout of tabs, groups and windows taken before a collapse
use crate::tab_data::{
    GroupColor, GroupId, GroupInfo, TabId, TabInfo, WindowId, WindowInfo, GROUP_ID_NONE,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// One captured tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabRecord {
    pub id: TabId,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub pinned: bool,
    pub index: i32,
    #[serde(default = "ungrouped")]
    pub group_id: GroupId,
    #[serde(default)]
    pub active: bool,
    /// Owning window, recorded only in the all-windows scope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_id: Option<WindowId>,
}

fn ungrouped() -> GroupId {
    GROUP_ID_NONE
}

impl TabRecord {
    pub fn is_grouped(&self) -> bool {
        self.group_id != GROUP_ID_NONE
    }
}

impl From<&TabInfo> for TabRecord {
    fn from(tab: &TabInfo) -> Self {
        TabRecord {
            id: tab.id,
            url: tab.url.clone(),
            pinned: tab.pinned,
            index: tab.index,
            group_id: tab.group_id,
            active: tab.active,
            window_id: None,
        }
    }
}

/// One captured tab group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRecord {
    pub id: GroupId,
    #[serde(default)]
    pub title: String,
    pub color: GroupColor,
    #[serde(default)]
    pub collapsed: bool,
}

impl From<&GroupInfo> for GroupRecord {
    fn from(group: &GroupInfo) -> Self {
        GroupRecord {
            id: group.id,
            title: group.title.clone(),
            color: group.color,
            collapsed: group.collapsed,
        }
    }
}

/// One captured window with its tabs, in tab order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowRecord {
    pub id: WindowId,
    #[serde(default)]
    pub focused: bool,
    #[serde(default)]
    pub tabs: Vec<TabRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Window,
    All,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Window => f.write_str("window"),
            Scope::All => f.write_str("all"),
        }
    }
}

/// What a snapshot covers, discriminated by `scope` in the stored JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "lowercase")]
pub enum Layout {
    Window {
        #[serde(rename = "windowId")]
        window_id: WindowId,
        tabs: Vec<TabRecord>,
        #[serde(default)]
        groups: Vec<GroupRecord>,
    },
    All { windows: Vec<WindowRecord> },
}

/// The persisted undo point
///
/// `ticket` identifies this particular capture. Snapshots written before
/// tickets existed read back with the nil id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default = "Uuid::nil")]
    pub ticket: Uuid,
    pub timestamp: f64,
    #[serde(flatten)]
    pub layout: Layout,
}

impl Snapshot {
    pub fn of_window(
        window_id: WindowId,
        tabs: &[TabInfo],
        groups: &[GroupInfo],
        timestamp: f64,
    ) -> Snapshot {
        Snapshot {
            ticket: Uuid::new_v4(),
            timestamp,
            layout: Layout::Window {
                window_id,
                tabs: tabs.iter().map(TabRecord::from).collect(),
                groups: groups.iter().map(GroupRecord::from).collect(),
            },
        }
    }

    /// Tabs only: group identity does not survive the all-windows scope
    pub fn of_windows(windows: &[WindowInfo], timestamp: f64) -> Snapshot {
        let windows = windows
            .iter()
            .map(|window| WindowRecord {
                id: window.id,
                focused: window.focused,
                tabs: window
                    .tabs
                    .iter()
                    .map(|tab| TabRecord {
                        window_id: Some(tab.window_id),
                        ..TabRecord::from(tab)
                    })
                    .collect(),
            })
            .collect();

        Snapshot {
            ticket: Uuid::new_v4(),
            timestamp,
            layout: Layout::All { windows },
        }
    }

    pub fn scope(&self) -> Scope {
        match self.layout {
            Layout::Window { .. } => Scope::Window,
            Layout::All { .. } => Scope::All,
        }
    }

    pub fn tab_count(&self) -> usize {
        match &self.layout {
            Layout::Window { tabs, .. } => tabs.len(),
            Layout::All { windows } => windows.iter().map(|w| w.tabs.len()).sum(),
        }
    }
}
