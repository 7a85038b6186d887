use crate::card::{BoardId, Card, CardDraft, CardId, CardPatch, CardStatus, Version};
use crate::concurrency::{check_version, next_version};
use crate::error::CardServiceError;
use crate::store::{CardChanges, CardStore};
use crate::transition::check_transition;
use crate::wip::admit_into_doing;

/// Entry point for every card operation.
///
/// Combines the transition rules, the `DOING` work-in-progress limit and the
/// optimistic concurrency check on top of a [`CardStore`].
pub struct CardService<S> {
    store: S,
}

impl<S: CardStore> CardService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Retrieves all cards on a board.
    #[tracing::instrument(skip(self))]
    pub async fn list_by_board(&self, board_id: &str) -> Result<Vec<Card>, CardServiceError> {
        Ok(self.store.list_by_board(board_id).await?)
    }

    /// Retrieves a card by its ID, or `None` if it does not exist.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_id(&self, id: CardId) -> Result<Option<Card>, CardServiceError> {
        Ok(self.store.get_by_id(id).await?)
    }

    /// Creates a new card on a board.
    ///
    /// # Arguments
    ///
    /// * `title` - The card title. Must not be blank.
    /// * `description` - The card description. Must not be blank.
    /// * `status` - The column the card starts in.
    /// * `board_id` - The board the card belongs to. Must not be blank.
    ///
    /// # Returns
    ///
    /// The stored card, `ValidationFailed` naming the first blank field, or
    /// `WipLimitExceeded` if the card would start in a full `DOING` column.
    #[tracing::instrument(skip(self))]
    pub async fn create(
        &self,
        title: String,
        description: String,
        status: CardStatus,
        board_id: BoardId,
    ) -> Result<Card, CardServiceError> {
        require_non_blank("title", &title)?;
        require_non_blank("description", &description)?;
        require_non_blank("board_id", &board_id)?;

        if status == CardStatus::Doing {
            admit_into_doing(&self.store, &board_id, None).await?;
        }

        let card = self
            .store
            .insert(CardDraft {
                title,
                description,
                status,
                board_id,
            })
            .await?;
        tracing::info!(
            "Created card {} in {} on board {}",
            card.id,
            card.status,
            card.board_id
        );
        Ok(card)
    }

    /// Updates a card's title and/or description.
    ///
    /// Only fields that are present and non-empty overwrite the stored ones.
    /// The card's `updated_at` is refreshed even if nothing else changes. No
    /// version check is made, so concurrent edits are last-write-wins per field.
    #[tracing::instrument(skip(self))]
    pub async fn update_fields(
        &self,
        id: CardId,
        patch: CardPatch,
    ) -> Result<Card, CardServiceError> {
        let current = self
            .store
            .get_by_id(id)
            .await?
            .ok_or(CardServiceError::NotFound(id))?;

        let mut changes = CardChanges::new(next_version(current.updated_at));
        if let Some(title) = patch.title.filter(|title| !title.is_empty()) {
            changes = changes.with_title(title);
        }
        if let Some(description) = patch.description.filter(|text| !text.is_empty()) {
            changes = changes.with_description(description);
        }

        let updated = self.store.update(id, changes).await?;
        tracing::info!("Updated card {}", id);
        Ok(updated)
    }

    /// Deletes a card. Deletion is not guarded by `updated_at`.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: CardId) -> Result<(), CardServiceError> {
        self.store.delete(id).await?;
        tracing::info!("Deleted card {}", id);
        Ok(())
    }

    /// Moves a card to an adjacent column.
    ///
    /// The checks run in a fixed order, and nothing is written unless all of
    /// them pass:
    /// 1. the card exists (`NotFound`)
    /// 2. it is not `DONE` and `new_status` is one column away (`InvalidTransition`)
    /// 3. if entering `DOING`, the board has room (`WipLimitExceeded`)
    /// 4. `expected_updated_at` equals the stored token (`Conflict`)
    ///
    /// The write itself is conditional on the token as well, so a concurrent
    /// move that lands between the read and the write also yields `Conflict`.
    #[tracing::instrument(skip(self))]
    pub async fn move_card(
        &self,
        id: CardId,
        new_status: CardStatus,
        expected_updated_at: Version,
    ) -> Result<Card, CardServiceError> {
        let current = self
            .store
            .get_by_id(id)
            .await?
            .ok_or(CardServiceError::NotFound(id))?;

        check_transition(current.status, new_status)
            .inspect_err(|e| tracing::warn!("Rejected move: {}", e))?;

        if new_status == CardStatus::Doing {
            admit_into_doing(&self.store, &current.board_id, Some(id)).await?;
        }

        check_version(&current, expected_updated_at)
            .inspect_err(|e| tracing::warn!("Rejected move: {}", e))?;

        let changes = CardChanges::new(next_version(current.updated_at))
            .with_status(new_status)
            .if_unmodified_since(expected_updated_at);
        let moved = self.store.update(id, changes).await?;
        tracing::info!("Moved card {} from {} to {}", id, current.status, moved.status);
        Ok(moved)
    }
}

fn require_non_blank(field: &'static str, value: &str) -> Result<(), CardServiceError> {
    if value.trim().is_empty() {
        return Err(CardServiceError::ValidationFailed { field });
    }
    Ok(())
}
