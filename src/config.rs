/// Storage key of the single undo slot
pub const LAST_STATE_KEY: &str = "lastState";
/// Page packaged with the extension that the reset window opens on
pub const LANDING_PAGE: &str = "new-timeline.html";
/// Fewer tabs than this never form a group
pub const MIN_GROUP_SIZE: usize = 2;

/// Settings shared by the collapse, undo and reset operations
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub storage_key: String,
    pub landing_page: String,
    pub min_group_size: usize,
    /// Whether groups made by a collapse start out contracted
    pub collapse_new_groups: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage_key: LAST_STATE_KEY.to_string(),
            landing_page: LANDING_PAGE.to_string(),
            min_group_size: MIN_GROUP_SIZE,
            collapse_new_groups: true,
        }
    }
}
