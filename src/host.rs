/// The browser surfaces the extension drives: tabs/windows/groups and local storage
///
/// Every call may suspend. Implementations report rejections as [`HostError`]
/// and never panic.
use crate::error::HostError;
use crate::tab_data::{
    GroupId, GroupInfo, GroupUpdate, TabId, TabInfo, TabSpec, WindowId, WindowInfo, WindowSpec,
};
use serde_json::Value;

#[allow(async_fn_in_trait)]
pub trait TabHost {
    /// The window the user is currently working in, if any
    async fn current_window(&self) -> Result<Option<WindowId>, HostError>;

    /// Every open window, populated with its tabs
    async fn windows(&self) -> Result<Vec<WindowInfo>, HostError>;

    async fn tabs_in_window(&self, window_id: WindowId) -> Result<Vec<TabInfo>, HostError>;

    async fn groups_in_window(&self, window_id: WindowId) -> Result<Vec<GroupInfo>, HostError>;

    /// Look up a tab by id; `None` when it no longer exists
    async fn get_tab(&self, tab_id: TabId) -> Result<Option<TabInfo>, HostError>;

    /// Move a tab to `index` in `window_id`; `-1` appends
    async fn move_tab(&self, tab_id: TabId, window_id: WindowId, index: i32)
        -> Result<(), HostError>;

    async fn group_tabs(&self, tab_ids: &[TabId]) -> Result<GroupId, HostError>;

    async fn ungroup_tabs(&self, tab_ids: &[TabId]) -> Result<(), HostError>;

    async fn update_group(&self, group_id: GroupId, update: &GroupUpdate)
        -> Result<(), HostError>;

    async fn activate_tab(&self, tab_id: TabId) -> Result<(), HostError>;

    async fn create_window(&self, spec: &WindowSpec) -> Result<WindowInfo, HostError>;

    async fn create_tab(&self, spec: &TabSpec) -> Result<TabInfo, HostError>;

    async fn remove_tab(&self, tab_id: TabId) -> Result<(), HostError>;

    async fn remove_window(&self, window_id: WindowId) -> Result<(), HostError>;

    /// Absolute URL of a page packaged with the extension
    fn extension_url(&self, path: &str) -> String;
}

/// Durable local key-value storage
#[allow(async_fn_in_trait)]
pub trait KeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, HostError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), HostError>;

    async fn remove(&self, key: &str) -> Result<(), HostError>;
}
