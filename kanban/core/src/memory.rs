//! In-memory card store.
//!
//! Cards live in a `HashMap` behind a tokio `Mutex`. The handle is cheap to
//! clone and every clone sees the same cards. Conditional updates are checked
//! and applied under the lock, so they are atomic with respect to each other.

use crate::card::{Card, CardDraft, CardId};
use crate::concurrency;
use crate::error::StoreError;
use crate::store::{CardChanges, CardStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct InMemoryCardStore {
    cards: Arc<Mutex<HashMap<CardId, Card>>>,
}

impl InMemoryCardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `cards`, keeping their ids and timestamps.
    pub fn with_cards(cards: impl IntoIterator<Item = Card>) -> Self {
        let cards = cards.into_iter().map(|card| (card.id, card)).collect();
        Self {
            cards: Arc::new(Mutex::new(cards)),
        }
    }

    /// Number of cards across all boards.
    pub async fn len(&self) -> usize {
        self.cards.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cards.lock().await.is_empty()
    }
}

#[async_trait]
impl CardStore for InMemoryCardStore {
    async fn list_by_board(&self, board_id: &str) -> Result<Vec<Card>, StoreError> {
        let cards = self.cards.lock().await;
        Ok(cards
            .values()
            .filter(|card| card.board_id == board_id)
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: CardId) -> Result<Option<Card>, StoreError> {
        Ok(self.cards.lock().await.get(&id).cloned())
    }

    async fn insert(&self, draft: CardDraft) -> Result<Card, StoreError> {
        let now = concurrency::now();
        let card = Card {
            id: Uuid::new_v4(),
            title: draft.title,
            description: draft.description,
            status: draft.status,
            board_id: draft.board_id,
            created_at: now,
            updated_at: now,
        };
        self.cards.lock().await.insert(card.id, card.clone());
        Ok(card)
    }

    async fn update(&self, id: CardId, changes: CardChanges) -> Result<Card, StoreError> {
        let mut cards = self.cards.lock().await;
        let card = cards.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if let Some(expected) = changes.expected_updated_at {
            if card.updated_at != expected {
                return Err(StoreError::VersionMismatch(id));
            }
        }
        changes.apply_to(card);
        Ok(card.clone())
    }

    async fn delete(&self, id: CardId) -> Result<(), StoreError> {
        self.cards
            .lock()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}
