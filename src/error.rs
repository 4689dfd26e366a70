use thiserror::Error;

/// Error taxonomy of the sync engine.
///
/// `Validation` is raised before any optimistic apply or network call.
/// `Sync` means the remote call failed after a successful optimistic
/// apply; by the time the caller sees it the local state has already
/// been rolled back and a notification emitted.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("sync failed: {0}")]
    Sync(anyhow::Error),
}

impl EngineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, EngineError::Validation(_))
    }
}
