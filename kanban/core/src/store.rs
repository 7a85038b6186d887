//! The persistence contract the card engine depends on.

use crate::card::{Card, CardDraft, CardId, CardStatus, Version};
use crate::error::StoreError;
use async_trait::async_trait;
use std::sync::Arc;

/// A set of field changes to apply to a stored card.
///
/// `updated_at` is always written. When `expected_updated_at` is set, the store
/// must only apply the changes if the stored token still equals it, and report
/// `StoreError::VersionMismatch` otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<CardStatus>,
    pub updated_at: Version,
    pub expected_updated_at: Option<Version>,
}

impl CardChanges {
    /// Changes that only refresh the card's token.
    pub fn new(updated_at: Version) -> Self {
        Self {
            title: None,
            description: None,
            status: None,
            updated_at,
            expected_updated_at: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_status(mut self, status: CardStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Makes the write conditional on the stored token still being `expected`.
    pub fn if_unmodified_since(mut self, expected: Version) -> Self {
        self.expected_updated_at = Some(expected);
        self
    }

    /// Applies the changes to an in-memory card, ignoring the precondition.
    pub fn apply_to(&self, card: &mut Card) {
        if let Some(title) = &self.title {
            card.title = title.clone();
        }
        if let Some(description) = &self.description {
            card.description = description.clone();
        }
        if let Some(status) = self.status {
            card.status = status;
        }
        card.updated_at = self.updated_at;
    }
}

/// Storage for cards.
///
/// Implementations own card lifetime. No multi-row transaction is assumed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CardStore: Send + Sync {
    /// Loads every card on a board, in no particular order.
    async fn list_by_board(&self, board_id: &str) -> Result<Vec<Card>, StoreError>;

    /// Loads a single card, or `None` if it does not exist.
    async fn get_by_id(&self, id: CardId) -> Result<Option<Card>, StoreError>;

    /// Persists a new card, assigning its id, `created_at` and `updated_at`.
    async fn insert(&self, draft: CardDraft) -> Result<Card, StoreError>;

    /// Applies `changes` to an existing card and returns the stored result.
    ///
    /// # Returns
    ///
    /// `NotFound` if the card does not exist, `VersionMismatch` if the changes
    /// carry a precondition the stored card no longer meets.
    async fn update(&self, id: CardId, changes: CardChanges) -> Result<Card, StoreError>;

    /// Removes a card. `NotFound` if it does not exist.
    async fn delete(&self, id: CardId) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: CardStore + ?Sized> CardStore for Arc<T> {
    async fn list_by_board(&self, board_id: &str) -> Result<Vec<Card>, StoreError> {
        (**self).list_by_board(board_id).await
    }

    async fn get_by_id(&self, id: CardId) -> Result<Option<Card>, StoreError> {
        (**self).get_by_id(id).await
    }

    async fn insert(&self, draft: CardDraft) -> Result<Card, StoreError> {
        (**self).insert(draft).await
    }

    async fn update(&self, id: CardId, changes: CardChanges) -> Result<Card, StoreError> {
        (**self).update(id, changes).await
    }

    async fn delete(&self, id: CardId) -> Result<(), StoreError> {
        (**self).delete(id).await
    }
}
