/// Chrome implementations of the host traits, over the JS bridge in chrome_bridge.js
use crate::error::HostError;
use crate::host::{KeyValueStore, TabHost};
use crate::tab_data::{
    GroupId, GroupInfo, GroupUpdate, TabId, TabInfo, TabSpec, WindowId, WindowInfo, WindowSpec,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/chrome_bridge.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getCurrentWindowId() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getAllWindows() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryWindowTabs(window_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryWindowGroups(window_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getTab(tab_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn moveTab(tab_id: i32, window_id: i32, index: i32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn groupTabs(tab_ids: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn ungroupTabs(tab_ids: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn updateGroup(group_id: i32, update: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn activateTab(tab_id: i32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn createWindow(spec: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn createTab(spec: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn removeTab(tab_id: i32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn removeWindow(window_id: i32) -> Result<(), JsValue>;

    fn extensionUrl(path: &str) -> String;

    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(key: &str, value: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn removeStorage(key: &str) -> Result<(), JsValue>;
}

fn rejected(what: &str, e: JsValue) -> HostError {
    HostError(format!("{} failed: {:?}", what, e))
}

fn from_js<T: DeserializeOwned>(what: &str, value: JsValue) -> Result<T, HostError> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| HostError(format!("Failed to parse {}: {:?}", what, e)))
}

/// Objects must arrive as plain JS objects, not `Map`s
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, HostError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| HostError(format!("Failed to serialize: {:?}", e)))
}

/// `chrome.tabs`, `chrome.tabGroups` and `chrome.windows`
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromeHost;

impl TabHost for ChromeHost {
    async fn current_window(&self) -> Result<Option<WindowId>, HostError> {
        let id = getCurrentWindowId()
            .await
            .map_err(|e| rejected("windows.getCurrent", e))?;
        from_js("window id", id)
    }

    async fn windows(&self) -> Result<Vec<WindowInfo>, HostError> {
        let windows = getAllWindows()
            .await
            .map_err(|e| rejected("windows.getAll", e))?;
        from_js("windows", windows)
    }

    async fn tabs_in_window(&self, window_id: WindowId) -> Result<Vec<TabInfo>, HostError> {
        let tabs = queryWindowTabs(window_id)
            .await
            .map_err(|e| rejected("tabs.query", e))?;
        from_js("tabs", tabs)
    }

    async fn groups_in_window(&self, window_id: WindowId) -> Result<Vec<GroupInfo>, HostError> {
        let groups = queryWindowGroups(window_id)
            .await
            .map_err(|e| rejected("tabGroups.query", e))?;
        from_js("tab groups", groups)
    }

    async fn get_tab(&self, tab_id: TabId) -> Result<Option<TabInfo>, HostError> {
        let tab = getTab(tab_id).await.map_err(|e| rejected("tabs.get", e))?;
        from_js("tab", tab)
    }

    async fn move_tab(&self, tab_id: TabId, window_id: WindowId, index: i32) -> Result<(), HostError> {
        moveTab(tab_id, window_id, index)
            .await
            .map_err(|e| rejected("tabs.move", e))
    }

    async fn group_tabs(&self, tab_ids: &[TabId]) -> Result<GroupId, HostError> {
        let group = groupTabs(to_js(tab_ids)?)
            .await
            .map_err(|e| rejected("tabs.group", e))?;
        from_js("group id", group)
    }

    async fn ungroup_tabs(&self, tab_ids: &[TabId]) -> Result<(), HostError> {
        ungroupTabs(to_js(tab_ids)?)
            .await
            .map_err(|e| rejected("tabs.ungroup", e))
    }

    async fn update_group(&self, group_id: GroupId, update: &GroupUpdate) -> Result<(), HostError> {
        updateGroup(group_id, to_js(update)?)
            .await
            .map_err(|e| rejected("tabGroups.update", e))
    }

    async fn activate_tab(&self, tab_id: TabId) -> Result<(), HostError> {
        activateTab(tab_id)
            .await
            .map_err(|e| rejected("tabs.update", e))
    }

    async fn create_window(&self, spec: &WindowSpec) -> Result<WindowInfo, HostError> {
        let window = createWindow(to_js(spec)?)
            .await
            .map_err(|e| rejected("windows.create", e))?;
        from_js("window", window)
    }

    async fn create_tab(&self, spec: &TabSpec) -> Result<TabInfo, HostError> {
        let tab = createTab(to_js(spec)?)
            .await
            .map_err(|e| rejected("tabs.create", e))?;
        from_js("tab", tab)
    }

    async fn remove_tab(&self, tab_id: TabId) -> Result<(), HostError> {
        removeTab(tab_id)
            .await
            .map_err(|e| rejected("tabs.remove", e))
    }

    async fn remove_window(&self, window_id: WindowId) -> Result<(), HostError> {
        removeWindow(window_id)
            .await
            .map_err(|e| rejected("windows.remove", e))
    }

    fn extension_url(&self, path: &str) -> String {
        extensionUrl(path)
    }
}

/// `chrome.storage.local`
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromeStorage;

impl KeyValueStore for ChromeStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>, HostError> {
        let value = getStorage(key)
            .await
            .map_err(|e| rejected("storage.local.get", e))?;

        if value.is_null() || value.is_undefined() {
            Ok(None)
        } else {
            from_js("stored value", value).map(Some)
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), HostError> {
        setStorage(key, to_js(&value)?)
            .await
            .map_err(|e| rejected("storage.local.set", e))
    }

    async fn remove(&self, key: &str) -> Result<(), HostError> {
        removeStorage(key)
            .await
            .map_err(|e| rejected("storage.local.remove", e))
    }
}
