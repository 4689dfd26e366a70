//! Fire-and-forget user notifications ("toasts").
//!
//! A notification replaces the previous one immediately and is
//! auto-dismissed after a fixed interval unless a newer one superseded
//! it in the meantime.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

pub const DEFAULT_TOAST_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub severity: Severity,
}

/// Seam between the sync engine and whatever surfaces messages to the
/// user. The engine only ever calls `notify`; tests plug in a recorder.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, severity: Severity);
}

/// Watch-channel backed notification hub. UI consumers subscribe and
/// re-render on change; `None` means no toast is currently visible.
pub struct ToastHub {
    tx: watch::Sender<Option<Toast>>,
    generation: Arc<AtomicU64>,
    ttl: Duration,
}

impl ToastHub {
    pub fn new(ttl: Duration) -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            tx,
            generation: Arc::new(AtomicU64::new(0)),
            ttl,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Toast>> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Option<Toast> {
        self.tx.borrow().clone()
    }

    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let _ = self.tx.send(None);
    }
}

impl Default for ToastHub {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_TTL)
    }
}

impl Notifier for ToastHub {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Error => warn!(message, "toast"),
            _ => info!(message, severity = severity.as_str(), "toast"),
        }

        let shown = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.tx.send(Some(Toast {
            message: message.to_string(),
            severity,
        }));

        // Auto-dismiss, unless a newer toast replaced this one first.
        let tx = self.tx.clone();
        let generation = Arc::clone(&self.generation);
        let ttl = self.ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if generation.load(Ordering::SeqCst) == shown {
                let _ = tx.send(None);
            }
        });
    }
}
