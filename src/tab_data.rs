/// Data structures describing what the browser reports about tabs, groups and windows
use serde::{Deserialize, Serialize};
use std::fmt;

pub type TabId = i32;
pub type WindowId = i32;
pub type GroupId = i32;

/// Tab id the browser assigns to tabs that are not real tabs (devtools etc.)
pub const TAB_ID_NONE: TabId = -1;

/// Group id carried by tabs that are not in any group
pub const GROUP_ID_NONE: GroupId = -1;

/// Information about a browser tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub id: TabId,
    pub window_id: WindowId,
    pub index: i32,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub active: bool,
    #[serde(default = "ungrouped")]
    pub group_id: GroupId,
}

fn ungrouped() -> GroupId {
    GROUP_ID_NONE
}

impl TabInfo {
    pub fn new(id: TabId, window_id: WindowId, index: i32, url: String) -> TabInfo {
        TabInfo {
            id,
            window_id,
            index,
            url,
            pinned: false,
            active: false,
            group_id: GROUP_ID_NONE,
        }
    }

    pub fn is_grouped(&self) -> bool {
        self.group_id != GROUP_ID_NONE
    }
}

/// Information about a tab group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupInfo {
    pub id: GroupId,
    pub window_id: WindowId,
    #[serde(default)]
    pub title: String,
    pub color: GroupColor,
    #[serde(default)]
    pub collapsed: bool,
}

/// Information about a browser window, optionally populated with its tabs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowInfo {
    pub id: WindowId,
    #[serde(default)]
    pub focused: bool,
    #[serde(default)]
    pub tabs: Vec<TabInfo>,
}

/// The fixed palette of tab group colors, in hash order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupColor {
    Grey,
    Blue,
    Red,
    Yellow,
    Green,
    Pink,
    Purple,
    Cyan,
    Orange,
}

impl GroupColor {
    pub const PALETTE: [GroupColor; 9] = [
        GroupColor::Grey,
        GroupColor::Blue,
        GroupColor::Red,
        GroupColor::Yellow,
        GroupColor::Green,
        GroupColor::Pink,
        GroupColor::Purple,
        GroupColor::Cyan,
        GroupColor::Orange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupColor::Grey => "grey",
            GroupColor::Blue => "blue",
            GroupColor::Red => "red",
            GroupColor::Yellow => "yellow",
            GroupColor::Green => "green",
            GroupColor::Pink => "pink",
            GroupColor::Purple => "purple",
            GroupColor::Cyan => "cyan",
            GroupColor::Orange => "orange",
        }
    }
}

impl fmt::Display for GroupColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata change applied to an existing group. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<GroupColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowState {
    Normal,
    Maximized,
}

/// Parameters for opening a new window
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub focused: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<WindowState>,
}

/// Parameters for opening a new tab
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSpec {
    pub window_id: WindowId,
    pub url: String,
    pub pinned: bool,
    pub active: bool,
}
