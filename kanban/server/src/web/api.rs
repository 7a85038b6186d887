use std::sync::Arc;

use crate::card::{self, CardState};

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI document for the JSON API.
#[derive(OpenApi)]
#[openapi(
    paths(
        card::api::v1::list_cards_handler,
        card::api::v1::create_card_handler,
        card::api::v1::get_card_handler,
        card::api::v1::update_card_handler,
        card::api::v1::delete_card_handler,
        card::api::v1::move_card_handler,
    ),
    components(schemas(
        card::api::v1::CardJson,
        card::api::v1::CardsResponse,
        card::api::v1::CreateCardRequest,
        card::api::v1::UpdateCardRequest,
        card::api::v1::MoveCardRequest,
        v1::ErrorResponse,
    )),
    tags((name = "Cards", description = "Kanban card management"))
)]
pub struct ApiDoc;

/// Creates the API routes for JSON API endpoints.
pub fn create_api_router(card_state: Arc<CardState>) -> Router {
    let cards_router = card::api::v1::create_api_router(card_state);
    Router::new()
        .nest("/api/v1", cards_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

pub mod v1 {
    use serde::{Deserialize, Serialize};
    use utoipa::ToSchema;

    /// Error body returned by every JSON endpoint.
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct ErrorResponse {
        /// Machine readable error code, e.g. `WIP_LIMIT_EXCEEDED`
        pub error: String,
        /// Human readable description
        pub message: String,
    }

    impl ErrorResponse {
        pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
            Self {
                error: error.into(),
                message: message.into(),
            }
        }
    }
}
