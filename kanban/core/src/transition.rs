//! Which status changes are legal.
//!
//! A card may only move one column at a time, in either direction, and never
//! out of `DONE`.

use crate::card::CardStatus;
use crate::error::CardServiceError;

/// Returns true if the two statuses are exactly one column apart.
pub fn is_adjacent(from: CardStatus, to: CardStatus) -> bool {
    from.index().abs_diff(to.index()) == 1
}

/// Returns true if a card in this status can no longer move.
pub fn is_terminal(status: CardStatus) -> bool {
    status == CardStatus::Done
}

/// Validates a move from `from` to `to`.
///
/// # Returns
///
/// `Ok(())` if the move is legal, `InvalidTransition` if `from` is terminal or
/// the two statuses are not adjacent.
pub fn check_transition(from: CardStatus, to: CardStatus) -> Result<(), CardServiceError> {
    if is_terminal(from) || !is_adjacent(from, to) {
        return Err(CardServiceError::InvalidTransition { from, to });
    }
    Ok(())
}
