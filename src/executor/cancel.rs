//! Cooperative cancellation shared between the signal handler and the scheduler

use std::sync::Arc;
use tokio::sync::watch;

/// Create a connected handle/signal pair
pub fn cancellation_pair() -> (CancellationHandle, CancellationSignal) {
    let (tx, rx) = watch::channel(false);
    (
        CancellationHandle { sender: Arc::new(tx) },
        CancellationSignal { receiver: rx },
    )
}

/// Triggers cancellation; cheap to clone into signal handlers
#[derive(Debug, Clone)]
pub struct CancellationHandle {
    sender: Arc<watch::Sender<bool>>,
}

impl CancellationHandle {
    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }
}

/// Observes cancellation requests
#[derive(Debug, Clone)]
pub struct CancellationSignal {
    receiver: watch::Receiver<bool>,
}

impl CancellationSignal {
    /// A signal that never fires
    pub fn never() -> Self {
        let (_, signal) = cancellation_pair();
        signal
    }

    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolve once cancellation has been requested
    ///
    /// Pends forever if every handle is dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        loop {
            if *receiver.borrow_and_update() {
                return;
            }
            if receiver.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}
