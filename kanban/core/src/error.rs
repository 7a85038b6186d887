use crate::card::{BoardId, CardId, CardStatus};
use thiserror::Error;

/// Errors reported by a [`CardStore`](crate::store::CardStore) implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No card with this id exists in the store.
    #[error("Card with ID {0} not found")]
    NotFound(CardId),
    /// A conditional update found a different `updated_at` than expected.
    #[error("Card with ID {0} was modified concurrently")]
    VersionMismatch(CardId),
    /// The underlying storage failed.
    #[error("Card store failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        StoreError::Backend(error.into())
    }
}

/// Error type for CardService operations.
///
/// Every variant is scoped to the single requested operation. None of them is
/// retried by the service.
#[derive(Error, Debug)]
pub enum CardServiceError {
    /// A required field was missing or empty.
    #[error("Missing required field: {field}")]
    ValidationFailed { field: &'static str },
    /// The card does not exist.
    #[error("Card with ID {0} not found")]
    NotFound(CardId),
    /// The move skips a column or leaves the terminal column.
    #[error("Cannot move card from {from} to {to}")]
    InvalidTransition { from: CardStatus, to: CardStatus },
    /// The board already has the maximum number of cards in DOING.
    #[error("Board {board_id} already has {limit} cards in DOING")]
    WipLimitExceeded { board_id: BoardId, limit: usize },
    /// The caller's `updated_at` no longer matches the stored card.
    #[error("Card with ID {0} has been modified by another user")]
    Conflict(CardId),
    /// The store failed for a reason unrelated to the card's state.
    #[error("Card store error: {0}")]
    Store(#[source] StoreError),
}

impl From<StoreError> for CardServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(id) => CardServiceError::NotFound(id),
            StoreError::VersionMismatch(id) => CardServiceError::Conflict(id),
            backend @ StoreError::Backend(_) => CardServiceError::Store(backend),
        }
    }
}
