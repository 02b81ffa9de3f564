use thiserror::Error;

use saledash_core::DomainError;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum HostError {
    /// The record's default transition rejected the command.
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("{model} {id} not found")]
    RecordNotFound { model: &'static str, id: u64 },

    #[error(transparent)]
    Store(#[from] StoreError),

    /// An extension hook or session augmenter failed after the default
    /// behavior completed.
    #[error("extension hook failed: {0}")]
    Hook(anyhow::Error),
}

impl HostError {
    pub fn not_found(model: &'static str, id: impl Into<u64>) -> Self {
        Self::RecordNotFound {
            model,
            id: id.into(),
        }
    }

    /// The hook's own error, when this is a hook failure.
    pub fn hook_error(&self) -> Option<&anyhow::Error> {
        match self {
            HostError::Hook(e) => Some(e),
            _ => None,
        }
    }
}
