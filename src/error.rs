/// Error types for collapse, undo and reset operations.
///
/// Only operation-level failures travel through these types. Failures of a
/// single tab or group during a best-effort pass are recorded in a
/// [`Report`](crate::report::Report) instead.
use thiserror::Error;

/// A call into the browser (tabs, windows, groups or storage) was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HostError(pub String);

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        HostError(message.into())
    }
}

#[derive(Debug, Error)]
pub enum CollapseError {
    /// Querying or mutating tabs/windows failed as a whole.
    #[error("Browser call failed while {context}: {source}")]
    Host {
        /// What the operation was doing when the call failed.
        context: &'static str,
        #[source]
        source: HostError,
    },

    /// Reading or writing the undo slot failed.
    #[error("Storage failed for '{key}': {source}")]
    Storage {
        key: String,
        #[source]
        source: HostError,
    },

    /// A snapshot could not be converted to or from JSON.
    #[error("Snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The undo slot holds something that is not a usable snapshot.
    #[error("Stored undo state is malformed: {0}")]
    MalformedState(String),
}

/// Attach a description of the failing step to a host result.
pub(crate) trait HostContext<T> {
    fn context(self, context: &'static str) -> Result<T, CollapseError>;
}

impl<T> HostContext<T> for Result<T, HostError> {
    fn context(self, context: &'static str) -> Result<T, CollapseError> {
        self.map_err(|source| CollapseError::Host { context, source })
    }
}
