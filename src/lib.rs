/// Collapse - Chrome Extension that groups tabs by domain, with undo
/// Built with Rust + WASM

mod background;
mod chrome;
mod config;
mod domain;
mod error;
mod host;
mod landing;
mod messages;
mod operations;
mod report;
mod restore;
mod snapshot;
mod storage;
mod tab_data;

#[cfg(test)]
mod testing;

pub use background::Background;
pub use chrome::{ChromeHost, ChromeStorage};
pub use config::Settings;
pub use domain::{domain_key, DomainClassifier};
pub use error::{CollapseError, HostError};
pub use host::{KeyValueStore, TabHost};
pub use messages::{CollapseMode, Request, Response};
pub use report::{Outcome, Report, Step, Subject};
pub use snapshot::{GroupRecord, Layout, Scope, Snapshot, TabRecord, WindowRecord};
pub use storage::{SnapshotStore, UndoTicket};
pub use tab_data::GroupColor;

use std::rc::Rc;
use wasm_bindgen::prelude::*;

thread_local! {
    static BACKGROUND: Rc<Background<ChromeHost, ChromeStorage>> = Rc::new(Background::new(
        ChromeHost,
        ChromeStorage,
        Settings::default(),
        js_sys::Date::now,
    ));
}

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Answer a message from the popup: collapse, closeEverything, undo or hasUndoState
#[wasm_bindgen]
pub async fn handle_message(request: JsValue) -> Result<JsValue, JsValue> {
    let request: Request = serde_wasm_bindgen::from_value(request)
        .map_err(|e| JsValue::from_str(&format!("Unrecognized request: {}", e)))?;

    let background = BACKGROUND.with(Rc::clone);
    let response = background.handle(request).await;

    serde_wasm_bindgen::to_value(&response)
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize response: {}", e)))
}

// Re-export domain helpers for JavaScript access
#[wasm_bindgen(js_name = domain_key)]
pub fn domain_key_js(url: &str) -> String {
    domain::domain_key(url)
}

#[wasm_bindgen]
pub fn domain_color(domain: &str) -> String {
    BACKGROUND.with(|background| background.classifier().color_for(domain).to_string())
}

// Quote shown on the fresh-start page
#[wasm_bindgen]
pub fn fresh_start_quote() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&landing::random_quote())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
