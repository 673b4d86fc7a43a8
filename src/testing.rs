/// In-memory browser and storage used by the unit tests
use crate::error::HostError;
use crate::host::{KeyValueStore, TabHost};
use crate::tab_data::{
    GroupColor, GroupId, GroupInfo, GroupUpdate, TabId, TabInfo, TabSpec, WindowId, WindowInfo,
    WindowSpec, GROUP_ID_NONE,
};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

const NEW_TAB_URL: &str = "chrome://newtab/";

struct FakeTab {
    id: TabId,
    url: String,
    pinned: bool,
    active: bool,
    group_id: GroupId,
}

struct FakeWindow {
    id: WindowId,
    focused: bool,
    tabs: Vec<FakeTab>,
}

#[derive(Default)]
struct FakeState {
    windows: Vec<FakeWindow>,
    groups: Vec<GroupInfo>,
    next_id: i32,
    failing_moves: HashSet<TabId>,
    failing_window_removals: HashSet<WindowId>,
    reject_group_queries: bool,
    reject_grouping: bool,
    reject_group_updates: bool,
    mutations: usize,
}

impl FakeState {
    fn allocate_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn window(&self, window_id: WindowId) -> Result<&FakeWindow, HostError> {
        self.windows
            .iter()
            .find(|w| w.id == window_id)
            .ok_or_else(|| HostError::new(format!("No window with id: {}.", window_id)))
    }

    fn window_mut(&mut self, window_id: WindowId) -> Result<&mut FakeWindow, HostError> {
        self.windows
            .iter_mut()
            .find(|w| w.id == window_id)
            .ok_or_else(|| HostError::new(format!("No window with id: {}.", window_id)))
    }

    fn locate(&self, tab_id: TabId) -> Option<(usize, usize)> {
        self.windows.iter().enumerate().find_map(|(w, window)| {
            window
                .tabs
                .iter()
                .position(|t| t.id == tab_id)
                .map(|position| (w, position))
        })
    }

    fn tab_mut(&mut self, tab_id: TabId) -> Result<&mut FakeTab, HostError> {
        let (w, position) = self
            .locate(tab_id)
            .ok_or_else(|| HostError::new(format!("No tab with id: {}.", tab_id)))?;
        Ok(&mut self.windows[w].tabs[position])
    }

    fn tab_info(&self, w: usize, position: usize) -> TabInfo {
        let window = &self.windows[w];
        let tab = &window.tabs[position];
        TabInfo {
            id: tab.id,
            window_id: window.id,
            index: position as i32,
            url: tab.url.clone(),
            pinned: tab.pinned,
            active: tab.active,
            group_id: tab.group_id,
        }
    }

    fn window_info(&self, w: usize) -> WindowInfo {
        let window = &self.windows[w];
        WindowInfo {
            id: window.id,
            focused: window.focused,
            tabs: (0..window.tabs.len()).map(|p| self.tab_info(w, p)).collect(),
        }
    }

    /// The browser drops windows without tabs and groups without members
    fn tidy(&mut self) {
        self.windows.retain(|w| !w.tabs.is_empty());
        let live: HashSet<GroupId> = self
            .windows
            .iter()
            .flat_map(|w| w.tabs.iter().map(|t| t.group_id))
            .collect();
        self.groups.retain(|g| live.contains(&g.id));
    }
}

/// A browser with windows, tabs and groups held in memory
#[derive(Default)]
pub struct FakeBrowser {
    state: RefCell<FakeState>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        FakeBrowser::default()
    }

    pub fn add_window(&self, focused: bool) -> WindowId {
        let mut state = self.state.borrow_mut();
        let id = state.allocate_id();
        if focused {
            state.windows.iter_mut().for_each(|w| w.focused = false);
        }
        state.windows.push(FakeWindow {
            id,
            focused,
            tabs: Vec::new(),
        });
        id
    }

    pub fn add_tab(&self, window_id: WindowId, url: &str) -> TabId {
        let mut state = self.state.borrow_mut();
        let id = state.allocate_id();
        let window = state
            .windows
            .iter_mut()
            .find(|w| w.id == window_id)
            .expect("window exists");
        let active = window.tabs.is_empty();
        window.tabs.push(FakeTab {
            id,
            url: url.to_string(),
            pinned: false,
            active,
            group_id: GROUP_ID_NONE,
        });
        id
    }

    /// Pinned tabs sit in front of unpinned ones
    pub fn add_pinned_tab(&self, window_id: WindowId, url: &str) -> TabId {
        let id = self.add_tab(window_id, url);
        let mut state = self.state.borrow_mut();
        let window = state.window_mut(window_id).expect("window exists");
        let tab = window.tabs.pop().expect("tab just added");
        let first_unpinned = window.tabs.iter().position(|t| !t.pinned).unwrap_or(window.tabs.len());
        window.tabs.insert(first_unpinned, FakeTab { pinned: true, ..tab });
        id
    }

    /// Simulate the user closing a tab
    pub fn close_tab(&self, tab_id: TabId) {
        let mut state = self.state.borrow_mut();
        if let Some((w, position)) = state.locate(tab_id) {
            state.windows[w].tabs.remove(position);
            state.tidy();
        }
    }

    /// Simulate the user clicking a tab
    pub fn click_tab(&self, tab_id: TabId) {
        let mut state = self.state.borrow_mut();
        if let Some((w, position)) = state.locate(tab_id) {
            for (p, tab) in state.windows[w].tabs.iter_mut().enumerate() {
                tab.active = p == position;
            }
        }
    }

    pub fn fail_moves_for(&self, tab_id: TabId) {
        self.state.borrow_mut().failing_moves.insert(tab_id);
    }

    pub fn reject_group_queries(&self) {
        self.state.borrow_mut().reject_group_queries = true;
    }

    pub fn fail_grouping(&self) {
        self.state.borrow_mut().reject_grouping = true;
    }

    pub fn fail_group_updates(&self) {
        self.state.borrow_mut().reject_group_updates = true;
    }

    /// The window disappears on its own before the call lands
    pub fn fail_window_removal(&self, window_id: WindowId) {
        self.state.borrow_mut().failing_window_removals.insert(window_id);
    }

    /// Number of mutating calls made through the host interface
    pub fn mutations(&self) -> usize {
        self.state.borrow().mutations
    }

    pub fn window_ids(&self) -> Vec<WindowId> {
        self.state.borrow().windows.iter().map(|w| w.id).collect()
    }

    pub fn focused_window(&self) -> Option<WindowId> {
        self.state.borrow().windows.iter().find(|w| w.focused).map(|w| w.id)
    }

    pub fn tabs(&self, window_id: WindowId) -> Vec<TabInfo> {
        let state = self.state.borrow();
        state
            .windows
            .iter()
            .position(|w| w.id == window_id)
            .map(|w| state.window_info(w).tabs)
            .unwrap_or_default()
    }

    pub fn tab_order(&self, window_id: WindowId) -> Vec<TabId> {
        self.tabs(window_id).iter().map(|t| t.id).collect()
    }

    pub fn urls(&self, window_id: WindowId) -> Vec<String> {
        self.tabs(window_id).into_iter().map(|t| t.url).collect()
    }

    pub fn active_tab(&self, window_id: WindowId) -> Option<TabId> {
        self.tabs(window_id).iter().find(|t| t.active).map(|t| t.id)
    }

    pub fn groups(&self) -> Vec<GroupInfo> {
        self.state.borrow().groups.clone()
    }

    pub fn group_of(&self, tab_id: TabId) -> Option<GroupInfo> {
        let state = self.state.borrow();
        let (w, position) = state.locate(tab_id)?;
        let group_id = state.windows[w].tabs[position].group_id;
        state.groups.iter().find(|g| g.id == group_id).cloned()
    }

    pub fn members(&self, group_id: GroupId) -> Vec<TabId> {
        let state = self.state.borrow();
        state
            .windows
            .iter()
            .flat_map(|w| w.tabs.iter())
            .filter(|t| t.group_id == group_id)
            .map(|t| t.id)
            .collect()
    }

    /// Put tabs into a group the way a user would, titled and colored
    pub fn make_group(&self, tab_ids: &[TabId], title: &str, color: GroupColor) -> GroupId {
        let mut state = self.state.borrow_mut();
        let id = state.allocate_id();
        let (w, _) = state.locate(tab_ids[0]).expect("tab exists");
        let window_id = state.windows[w].id;
        for tab_id in tab_ids {
            state.tab_mut(*tab_id).expect("tab exists").group_id = id;
        }
        state.groups.push(GroupInfo {
            id,
            window_id,
            title: title.to_string(),
            color,
            collapsed: false,
        });
        state.tidy();
        id
    }
}

impl TabHost for FakeBrowser {
    async fn current_window(&self) -> Result<Option<WindowId>, HostError> {
        let state = self.state.borrow();
        let focused = state.windows.iter().find(|w| w.focused);
        Ok(focused.or_else(|| state.windows.first()).map(|w| w.id))
    }

    async fn windows(&self) -> Result<Vec<WindowInfo>, HostError> {
        let state = self.state.borrow();
        Ok((0..state.windows.len()).map(|w| state.window_info(w)).collect())
    }

    async fn tabs_in_window(&self, window_id: WindowId) -> Result<Vec<TabInfo>, HostError> {
        let state = self.state.borrow();
        state.window(window_id)?;
        Ok(self.tabs(window_id))
    }

    async fn groups_in_window(&self, window_id: WindowId) -> Result<Vec<GroupInfo>, HostError> {
        let state = self.state.borrow();
        if state.reject_group_queries {
            return Err(HostError::new("tabGroups permission unavailable"));
        }
        state.window(window_id)?;
        Ok(state
            .groups
            .iter()
            .filter(|g| g.window_id == window_id)
            .cloned()
            .collect())
    }

    async fn get_tab(&self, tab_id: TabId) -> Result<Option<TabInfo>, HostError> {
        let state = self.state.borrow();
        Ok(state.locate(tab_id).map(|(w, p)| state.tab_info(w, p)))
    }

    async fn move_tab(&self, tab_id: TabId, window_id: WindowId, index: i32) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        state.mutations += 1;
        if state.failing_moves.contains(&tab_id) {
            return Err(HostError::new(format!("Tabs cannot be edited right now: {}", tab_id)));
        }
        state.window(window_id)?;
        let (w, position) = state
            .locate(tab_id)
            .ok_or_else(|| HostError::new(format!("No tab with id: {}.", tab_id)))?;
        let source = state.windows[w].id;
        let mut tab = state.windows[w].tabs.remove(position);
        if source != window_id {
            tab.group_id = GROUP_ID_NONE;
            tab.active = false;
        }
        let target = state.window_mut(window_id)?;
        let index = if index < 0 || index as usize > target.tabs.len() {
            target.tabs.len()
        } else {
            index as usize
        };
        target.tabs.insert(index, tab);
        state.tidy();
        Ok(())
    }

    async fn group_tabs(&self, tab_ids: &[TabId]) -> Result<GroupId, HostError> {
        let mut state = self.state.borrow_mut();
        state.mutations += 1;
        if state.reject_grouping {
            return Err(HostError::new("Tabs cannot be edited right now (user may be dragging a tab)."));
        }
        let mut window_ids = HashSet::new();
        for tab_id in tab_ids {
            let (w, position) = state
                .locate(*tab_id)
                .ok_or_else(|| HostError::new(format!("No tab with id: {}.", tab_id)))?;
            if state.windows[w].tabs[position].pinned {
                return Err(HostError::new("Cannot group pinned tabs"));
            }
            window_ids.insert(state.windows[w].id);
        }
        if window_ids.len() != 1 {
            return Err(HostError::new("Tabs must be in exactly one window"));
        }
        let window_id = window_ids.into_iter().next().unwrap_or_default();
        let id = state.allocate_id();
        for tab_id in tab_ids {
            state.tab_mut(*tab_id)?.group_id = id;
        }
        state.groups.push(GroupInfo {
            id,
            window_id,
            title: String::new(),
            color: GroupColor::Grey,
            collapsed: false,
        });
        state.tidy();
        Ok(id)
    }

    async fn ungroup_tabs(&self, tab_ids: &[TabId]) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        state.mutations += 1;
        if let Some(missing) = tab_ids.iter().find(|id| state.locate(**id).is_none()) {
            return Err(HostError::new(format!("No tab with id: {}.", missing)));
        }
        for tab_id in tab_ids {
            state.tab_mut(*tab_id)?.group_id = GROUP_ID_NONE;
        }
        state.tidy();
        Ok(())
    }

    async fn update_group(&self, group_id: GroupId, update: &GroupUpdate) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        state.mutations += 1;
        if state.reject_group_updates {
            return Err(HostError::new(format!("Cannot update group {}.", group_id)));
        }
        let group = state
            .groups
            .iter_mut()
            .find(|g| g.id == group_id)
            .ok_or_else(|| HostError::new(format!("No group with id: {}.", group_id)))?;
        if let Some(title) = &update.title {
            group.title = title.clone();
        }
        if let Some(color) = update.color {
            group.color = color;
        }
        if let Some(collapsed) = update.collapsed {
            group.collapsed = collapsed;
        }
        Ok(())
    }

    async fn activate_tab(&self, tab_id: TabId) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        state.mutations += 1;
        let (w, position) = state
            .locate(tab_id)
            .ok_or_else(|| HostError::new(format!("No tab with id: {}.", tab_id)))?;
        for (p, tab) in state.windows[w].tabs.iter_mut().enumerate() {
            tab.active = p == position;
        }
        Ok(())
    }

    async fn create_window(&self, spec: &WindowSpec) -> Result<WindowInfo, HostError> {
        let mut state = self.state.borrow_mut();
        state.mutations += 1;
        let id = state.allocate_id();
        let tab_id = state.allocate_id();
        if spec.focused {
            state.windows.iter_mut().for_each(|w| w.focused = false);
        }
        state.windows.push(FakeWindow {
            id,
            focused: spec.focused,
            tabs: vec![FakeTab {
                id: tab_id,
                url: spec.url.clone().unwrap_or_else(|| NEW_TAB_URL.to_string()),
                pinned: false,
                active: true,
                group_id: GROUP_ID_NONE,
            }],
        });
        Ok(state.window_info(state.windows.len() - 1))
    }

    async fn create_tab(&self, spec: &TabSpec) -> Result<TabInfo, HostError> {
        let mut state = self.state.borrow_mut();
        state.mutations += 1;
        let id = state.allocate_id();
        let window = state.window_mut(spec.window_id)?;
        if spec.active {
            window.tabs.iter_mut().for_each(|t| t.active = false);
        }
        window.tabs.push(FakeTab {
            id,
            url: spec.url.clone(),
            pinned: spec.pinned,
            active: spec.active,
            group_id: GROUP_ID_NONE,
        });
        let (w, position) = state.locate(id).ok_or_else(|| HostError::new("tab vanished"))?;
        Ok(state.tab_info(w, position))
    }

    async fn remove_tab(&self, tab_id: TabId) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        state.mutations += 1;
        let (w, position) = state
            .locate(tab_id)
            .ok_or_else(|| HostError::new(format!("No tab with id: {}.", tab_id)))?;
        state.windows[w].tabs.remove(position);
        state.tidy();
        Ok(())
    }

    async fn remove_window(&self, window_id: WindowId) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        state.mutations += 1;
        if state.failing_window_removals.contains(&window_id) {
            state.windows.retain(|w| w.id != window_id);
            return Err(HostError::new(format!("No window with id: {}.", window_id)));
        }
        state.window(window_id)?;
        state.windows.retain(|w| w.id != window_id);
        state.tidy();
        Ok(())
    }

    fn extension_url(&self, path: &str) -> String {
        format!("chrome-extension://fake/{}", path)
    }
}

/// `chrome.storage.local` stand-in
#[derive(Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, Value>>,
    reject_writes: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn reject_writes(&self) {
        self.reject_writes.set(true);
    }

    pub fn raw(&self, key: &str) -> Option<Value> {
        self.values.borrow().get(key).cloned()
    }

    pub fn put_raw(&self, key: &str, value: Value) {
        self.values.borrow_mut().insert(key.to_string(), value);
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, HostError> {
        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), HostError> {
        if self.reject_writes.get() {
            return Err(HostError::new("QUOTA_BYTES quota exceeded"));
        }
        self.put_raw(key, value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), HostError> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}
