//! Work-in-progress admission for the `DOING` column.
//!
//! The limit is checked at the moment a card enters `DOING`, by counting the
//! board's cards. There is no stored counter, so two concurrent admissions can
//! both succeed and briefly overshoot the limit.

use crate::card::{Card, CardId, CardStatus};
use crate::error::CardServiceError;
use crate::store::CardStore;

/// Maximum number of cards allowed in `DOING` on one board.
pub const DOING_WIP_LIMIT: usize = 2;

/// Counts the cards in `DOING`, skipping `excluding` if given.
pub fn doing_count(cards: &[Card], excluding: Option<CardId>) -> usize {
    cards
        .iter()
        .filter(|card| card.status == CardStatus::Doing)
        .filter(|card| Some(card.id) != excluding)
        .count()
}

/// Returns true if one more card may enter `DOING`.
///
/// The card under mutation is passed as `excluding` so it is never counted
/// twice.
pub fn can_enter_doing(cards: &[Card], excluding: Option<CardId>) -> bool {
    doing_count(cards, excluding) < DOING_WIP_LIMIT
}

/// Loads the board's cards and admits or rejects one more card into `DOING`.
///
/// # Returns
///
/// `Ok(())` if the board has room, `WipLimitExceeded` otherwise.
pub async fn admit_into_doing<S: CardStore + ?Sized>(
    store: &S,
    board_id: &str,
    excluding: Option<CardId>,
) -> Result<(), CardServiceError> {
    let cards = store.list_by_board(board_id).await?;
    if !can_enter_doing(&cards, excluding) {
        tracing::warn!(
            "Board {} already has {} cards in DOING",
            board_id,
            doing_count(&cards, excluding)
        );
        return Err(CardServiceError::WipLimitExceeded {
            board_id: board_id.to_string(),
            limit: DOING_WIP_LIMIT,
        });
    }
    Ok(())
}
