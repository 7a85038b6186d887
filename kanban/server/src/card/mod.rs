use crate::entities::card;
use async_trait::async_trait;
use kanban_core::{
    Card, CardChanges, CardDraft, CardId, CardService, CardStatus, CardStore, StoreError,
};
use sea_orm::*;
use std::sync::Arc;

pub mod api;

/// Card service shared by the HTTP handlers, independent of the backing store.
pub type SharedCardService = CardService<Arc<dyn CardStore>>;

pub struct CardState {
    pub service: SharedCardService,
}

impl CardState {
    pub fn new(store: Arc<dyn CardStore>) -> Self {
        Self {
            service: CardService::new(store),
        }
    }
}

impl From<card::Status> for CardStatus {
    fn from(status: card::Status) -> Self {
        match status {
            card::Status::Backlog => CardStatus::Backlog,
            card::Status::Todo => CardStatus::Todo,
            card::Status::Doing => CardStatus::Doing,
            card::Status::Done => CardStatus::Done,
        }
    }
}

impl From<CardStatus> for card::Status {
    fn from(status: CardStatus) -> Self {
        match status {
            CardStatus::Backlog => card::Status::Backlog,
            CardStatus::Todo => card::Status::Todo,
            CardStatus::Doing => card::Status::Doing,
            CardStatus::Done => card::Status::Done,
        }
    }
}

impl From<card::Model> for Card {
    fn from(model: card::Model) -> Self {
        Card {
            id: model.id,
            title: model.title,
            description: model.description,
            status: model.status.into(),
            board_id: model.board_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Card store backed by the `cards` table.
#[derive(Clone)]
pub struct SeaOrmCardStore {
    db: Arc<sea_orm::DatabaseConnection>,
}

impl SeaOrmCardStore {
    pub fn new(db: Arc<sea_orm::DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Works out why an update matched no row: the card is gone, or its
    /// `updated_at` moved on.
    async fn missed_update(&self, id: CardId) -> StoreError {
        match card::Entity::find_by_id(id).one(self.db.as_ref()).await {
            Ok(Some(_)) => StoreError::VersionMismatch(id),
            Ok(None) => StoreError::NotFound(id),
            Err(e) => StoreError::backend(e),
        }
    }
}

#[async_trait]
impl CardStore for SeaOrmCardStore {
    #[tracing::instrument(skip(self))]
    async fn list_by_board(&self, board_id: &str) -> Result<Vec<Card>, StoreError> {
        let cards = card::Entity::find()
            .filter(card::Column::BoardId.eq(board_id))
            .all(self.db.as_ref())
            .await
            .map_err(StoreError::backend)?
            .into_iter()
            .map(Card::from)
            .collect();
        Ok(cards)
    }

    #[tracing::instrument(skip(self))]
    async fn get_by_id(&self, id: CardId) -> Result<Option<Card>, StoreError> {
        let card_model = card::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(StoreError::backend)?;
        Ok(card_model.map(Card::from))
    }

    #[tracing::instrument(skip(self))]
    async fn insert(&self, draft: CardDraft) -> Result<Card, StoreError> {
        let now = kanban_core::concurrency::now();
        let active_model = card::ActiveModel {
            id: ActiveValue::Set(uuid::Uuid::new_v4()),
            title: ActiveValue::Set(draft.title),
            description: ActiveValue::Set(draft.description),
            status: ActiveValue::Set(draft.status.into()),
            board_id: ActiveValue::Set(draft.board_id),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };
        let created_model = active_model
            .insert(self.db.as_ref())
            .await
            .map_err(StoreError::backend)?;
        Ok(Card::from(created_model))
    }

    #[tracing::instrument(skip(self))]
    async fn update(&self, id: CardId, changes: CardChanges) -> Result<Card, StoreError> {
        let card_to_update = card::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(StoreError::backend)?
            .ok_or(StoreError::NotFound(id))?;

        let mut active_model: card::ActiveModel = card_to_update.into();
        if let Some(title) = changes.title {
            active_model.title = ActiveValue::Set(title);
        }
        if let Some(description) = changes.description {
            active_model.description = ActiveValue::Set(description);
        }
        if let Some(status) = changes.status {
            active_model.status = ActiveValue::Set(status.into());
        }
        active_model.updated_at = ActiveValue::Set(changes.updated_at);

        let mut update = card::Entity::update(active_model);
        if let Some(expected) = changes.expected_updated_at {
            update = update.filter(card::Column::UpdatedAt.eq(expected));
        }

        match update.exec(self.db.as_ref()).await {
            Ok(updated_model) => Ok(Card::from(updated_model)),
            Err(DbErr::RecordNotUpdated) => Err(self.missed_update(id).await),
            Err(e) => Err(StoreError::backend(e)),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: CardId) -> Result<(), StoreError> {
        let result = card::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(StoreError::backend)?;
        if result.rows_affected == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn can_map_every_status_both_ways() {
        for status in CardStatus::ALL {
            let stored: card::Status = status.into();
            assert_eq!(CardStatus::from(stored), status);
        }
    }

    #[test]
    fn can_convert_a_row_into_a_card() {
        let now = Utc::now();
        let model = card::Model {
            id: uuid::Uuid::new_v4(),
            title: "Write docs".to_string(),
            description: "Explain the move rules".to_string(),
            status: card::Status::Doing,
            board_id: "main".to_string(),
            created_at: now,
            updated_at: now,
        };

        let card = Card::from(model.clone());

        assert_eq!(card.id, model.id);
        assert_eq!(card.status, CardStatus::Doing);
        assert_eq!(card.board_id, "main");
        assert_eq!(card.updated_at, now);
    }
}
