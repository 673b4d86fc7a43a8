/// Requests the popup sends to the background worker, and the replies it gets
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollapseMode {
    #[default]
    Current,
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    Collapse {
        #[serde(default)]
        mode: CollapseMode,
    },
    CloseEverything,
    Undo,
    HasUndoState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Done {
        success: bool,
    },
    UndoState {
        #[serde(rename = "hasState")]
        has_state: bool,
    },
}
