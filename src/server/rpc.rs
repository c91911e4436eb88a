//! Parks in-flight RPC requests until the client responds.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use uuid::Uuid;

/// What a pending RPC resolves to: the handler's response, or its error text
pub type RpcOutcome = Result<String, String>;

type PendingMap = Mutex<HashMap<Uuid, tokio::sync::oneshot::Sender<RpcOutcome>>>;

/// Correlates outbound RPC requests with inbound responses by id
#[derive(Default)]
pub struct RpcManager {
    pending: Arc<PendingMap>,
}

impl RpcManager {
    /// Create a new `RpcManager`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new pending request; returns a receiver that resolves when
    /// the response arrives
    #[must_use]
    pub fn register(&self, id: Uuid) -> tokio::sync::oneshot::Receiver<RpcOutcome> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, tx);
        rx
    }

    /// Resolve a pending request with the client's response.
    ///
    /// Unknown ids are ignored silently; the client may respond after the
    /// caller's time box already expired and dropped the receiver.
    pub fn respond(&self, id: Uuid, outcome: RpcOutcome) {
        let tx = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        if let Some(tx) = tx {
            let _ = tx.send(outcome);
        }
    }

    /// Drop every pending request, used on disconnect
    pub fn cancel_all(&self) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
