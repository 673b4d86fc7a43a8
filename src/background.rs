/// Background worker: owns the browser handles and answers popup requests.
///
/// Every failure is logged here and reduced to `success: false`; the popup
/// only ever learns whether an action worked.
use crate::config::Settings;
use crate::domain::DomainClassifier;
use crate::host::{KeyValueStore, TabHost};
use crate::messages::{CollapseMode, Request, Response};
use crate::operations::Collapser;
use crate::restore::Restorer;
use crate::storage::SnapshotStore;
use log::{error, info, warn};

pub struct Background<H, K> {
    host: H,
    store: SnapshotStore<K>,
    classifier: DomainClassifier,
    settings: Settings,
    clock: fn() -> f64,
}

impl<H: TabHost, K: KeyValueStore> Background<H, K> {
    /// `clock` returns milliseconds since the epoch, used to stamp snapshots
    pub fn new(host: H, kv: K, settings: Settings, clock: fn() -> f64) -> Self {
        Background {
            host,
            store: SnapshotStore::new(kv, &settings),
            classifier: DomainClassifier::new(),
            settings,
            clock,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn store(&self) -> &SnapshotStore<K> {
        &self.store
    }

    pub fn classifier(&self) -> &DomainClassifier {
        &self.classifier
    }

    pub async fn handle(&self, request: Request) -> Response {
        match request {
            Request::Collapse { mode } => Response::Done {
                success: self.collapse(mode).await,
            },
            Request::CloseEverything => Response::Done {
                success: self.close_everything().await,
            },
            Request::Undo => Response::Done {
                success: self.undo().await,
            },
            Request::HasUndoState => Response::UndoState {
                has_state: self.has_undo_state().await,
            },
        }
    }

    fn collapser(&self) -> Collapser<'_, H, K> {
        Collapser::new(&self.host, &self.store, &self.classifier, &self.settings)
    }

    async fn collapse(&self, mode: CollapseMode) -> bool {
        let timestamp = (self.clock)();
        let result = match mode {
            CollapseMode::Current => self.collapser().collapse_current_window(timestamp).await,
            CollapseMode::All => self.collapser().collapse_all_windows(timestamp).await,
        };

        match result {
            Ok(_) => true,
            Err(e) => {
                error!("Collapse failed: {}", e);
                false
            }
        }
    }

    async fn close_everything(&self) -> bool {
        match self.collapser().close_everything().await {
            Ok(_) => true,
            Err(e) => {
                error!("Reset failed: {}", e);
                false
            }
        }
    }

    async fn undo(&self) -> bool {
        let ticket = match self.store.claim().await {
            Ok(Some(ticket)) => ticket,
            Ok(None) => {
                info!("Nothing to undo");
                return false;
            }
            Err(e) => {
                warn!("Cannot undo: {}", e);
                return false;
            }
        };

        let restorer = Restorer::new(&self.host, &self.store, &self.settings);
        match restorer.restore(ticket).await {
            Ok(_) => true,
            Err(e) => {
                error!("Undo failed: {}", e);
                false
            }
        }
    }

    async fn has_undo_state(&self) -> bool {
        self.store.has_state().await.unwrap_or_else(|e| {
            warn!("Cannot read undo state: {}", e);
            false
        })
    }
}
