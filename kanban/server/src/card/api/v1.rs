use crate::card::CardState;
use crate::web::api::v1::ErrorResponse;
use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use kanban_core::{Card, CardId, CardPatch, CardServiceError, CardStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

/// JSON representation of a Card for API responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CardJson {
    /// Unique identifier for the card
    pub id: Uuid,
    /// Short title shown on the board
    pub title: String,
    /// Longer free-text description
    pub description: String,
    /// Column the card is in: BACKLOG, TODO, DOING or DONE
    #[schema(value_type = String, example = "TODO")]
    pub status: CardStatus,
    /// Board the card belongs to
    pub board_id: String,
    /// When the card was created
    pub created_at: DateTime<Utc>,
    /// When the card last changed. Send it back with a move request.
    pub updated_at: DateTime<Utc>,
}

impl From<Card> for CardJson {
    fn from(card: Card) -> Self {
        Self {
            id: card.id,
            title: card.title,
            description: card.description,
            status: card.status,
            board_id: card.board_id,
            created_at: card.created_at,
            updated_at: card.updated_at,
        }
    }
}

/// API response for listing the cards of a board.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CardsResponse {
    /// Cards on the board, in no particular order
    pub cards: Vec<CardJson>,
    /// Total number of cards
    pub count: usize,
}

/// Query parameters for listing cards.
#[derive(Debug, Deserialize)]
pub struct CardsQuery {
    #[serde(default)]
    board_id: Option<String>,
}

/// Request body for creating a card.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCardRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[schema(value_type = String, example = "BACKLOG")]
    pub status: CardStatus,
    #[serde(default)]
    pub board_id: String,
}

/// Request body for editing a card. Missing or empty fields keep their value.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCardRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<UpdateCardRequest> for CardPatch {
    fn from(request: UpdateCardRequest) -> Self {
        CardPatch {
            title: request.title,
            description: request.description,
        }
    }
}

/// Request body for moving a card to an adjacent column.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MoveCardRequest {
    pub card_id: Uuid,
    #[schema(value_type = String, example = "DOING")]
    pub new_status: CardStatus,
    /// The card's `updated_at` as last seen by the caller
    pub updated_at: DateTime<Utc>,
}

/// Error returned by the card handlers.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] CardServiceError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, code) = match &self.0 {
            CardServiceError::ValidationFailed { .. } => {
                (StatusCode::BAD_REQUEST, "VALIDATION_FAILED")
            }
            CardServiceError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            CardServiceError::InvalidTransition { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_TRANSITION")
            }
            CardServiceError::WipLimitExceeded { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "WIP_LIMIT_EXCEEDED")
            }
            CardServiceError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            CardServiceError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let message = if status_code == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Card request failed: {}", self.0);
            "An unexpected error occurred while processing your request. Please try again later."
                .to_string()
        } else {
            self.0.to_string()
        };

        (status_code, Json(ErrorResponse::new(code, message))).into_response()
    }
}

/// Handler for GET /api/v1/cards - Returns the cards of a board.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/v1/cards",
    params(
        ("board_id" = String, Query, description = "Board to list the cards of")
    ),
    responses(
        (status = 200, description = "Successfully retrieved cards", body = CardsResponse),
        (status = 400, description = "Missing board_id", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Cards"
)]
pub async fn list_cards_handler(
    State(state): State<Arc<CardState>>,
    Query(query): Query<CardsQuery>,
) -> Result<Json<CardsResponse>, ApiError> {
    let board_id = query
        .board_id
        .filter(|board_id| !board_id.trim().is_empty())
        .ok_or(CardServiceError::ValidationFailed { field: "board_id" })?;

    let cards: Vec<CardJson> = state
        .service
        .list_by_board(&board_id)
        .await?
        .into_iter()
        .map(CardJson::from)
        .collect();
    let count = cards.len();

    Ok(Json(CardsResponse { cards, count }))
}

/// Handler for POST /api/v1/cards - Creates a card.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/api/v1/cards",
    request_body = CreateCardRequest,
    responses(
        (status = 201, description = "Card created", body = CardJson),
        (status = 400, description = "Missing required field", body = ErrorResponse),
        (status = 422, description = "DOING column is full", body = ErrorResponse)
    ),
    tag = "Cards"
)]
pub async fn create_card_handler(
    State(state): State<Arc<CardState>>,
    Json(request): Json<CreateCardRequest>,
) -> Result<(StatusCode, Json<CardJson>), ApiError> {
    let card = state
        .service
        .create(
            request.title,
            request.description,
            request.status,
            request.board_id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(CardJson::from(card))))
}

/// Handler for GET /api/v1/cards/{id} - Returns a single card.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/v1/cards/{id}",
    params(("id" = Uuid, Path, description = "Card ID")),
    responses(
        (status = 200, description = "Card found", body = CardJson),
        (status = 404, description = "Card not found", body = ErrorResponse)
    ),
    tag = "Cards"
)]
pub async fn get_card_handler(
    State(state): State<Arc<CardState>>,
    Path(id): Path<CardId>,
) -> Result<Json<CardJson>, ApiError> {
    let card = state
        .service
        .get_by_id(id)
        .await?
        .ok_or(CardServiceError::NotFound(id))?;
    Ok(Json(CardJson::from(card)))
}

/// Handler for PUT /api/v1/cards/{id} - Edits a card's title and description.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    put,
    path = "/api/v1/cards/{id}",
    params(("id" = Uuid, Path, description = "Card ID")),
    request_body = UpdateCardRequest,
    responses(
        (status = 200, description = "Card updated", body = CardJson),
        (status = 404, description = "Card not found", body = ErrorResponse)
    ),
    tag = "Cards"
)]
pub async fn update_card_handler(
    State(state): State<Arc<CardState>>,
    Path(id): Path<CardId>,
    Json(request): Json<UpdateCardRequest>,
) -> Result<Json<CardJson>, ApiError> {
    let card = state.service.update_fields(id, request.into()).await?;
    Ok(Json(CardJson::from(card)))
}

/// Handler for DELETE /api/v1/cards/{id} - Deletes a card.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/api/v1/cards/{id}",
    params(("id" = Uuid, Path, description = "Card ID")),
    responses(
        (status = 204, description = "Card deleted"),
        (status = 404, description = "Card not found", body = ErrorResponse)
    ),
    tag = "Cards"
)]
pub async fn delete_card_handler(
    State(state): State<Arc<CardState>>,
    Path(id): Path<CardId>,
) -> Result<StatusCode, ApiError> {
    state.service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST /api/v1/cards/move - Moves a card to an adjacent column.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/api/v1/cards/move",
    request_body = MoveCardRequest,
    responses(
        (status = 200, description = "Card moved", body = CardJson),
        (status = 404, description = "Card not found", body = ErrorResponse),
        (status = 409, description = "Card was modified by someone else", body = ErrorResponse),
        (status = 422, description = "Move not allowed or DOING column full", body = ErrorResponse)
    ),
    tag = "Cards"
)]
pub async fn move_card_handler(
    State(state): State<Arc<CardState>>,
    Json(request): Json<MoveCardRequest>,
) -> Result<Json<CardJson>, ApiError> {
    let card = state
        .service
        .move_card(request.card_id, request.new_status, request.updated_at)
        .await?;
    Ok(Json(CardJson::from(card)))
}

/// Creates and returns the cards API router.
pub fn create_api_router(state: Arc<CardState>) -> Router {
    Router::new()
        .route("/cards", get(list_cards_handler).post(create_card_handler))
        .route("/cards/move", post(move_card_handler))
        .route(
            "/cards/{id}",
            get(get_card_handler)
                .put(update_card_handler)
                .delete(delete_card_handler),
        )
        .with_state(state)
}
