//! Optimistic concurrency on a card's `updated_at` token.
//!
//! Callers hold on to the `updated_at` they last saw and hand it back with a
//! move. The move is rejected with `Conflict` if the stored card has changed
//! since.

use crate::card::{Card, Version};
use crate::error::CardServiceError;
use chrono::{Duration, SubsecRound, Utc};

/// Current instant at microsecond precision, matching PostgreSQL `timestamptz`.
pub fn now() -> Version {
    Utc::now().trunc_subsecs(6)
}

/// Issues the token that replaces `previous`. Always strictly greater than it.
pub fn next_version(previous: Version) -> Version {
    let candidate = now();
    if candidate > previous {
        candidate
    } else {
        previous + Duration::microseconds(1)
    }
}

/// Fails with `Conflict` unless `expected` is exactly the card's current token.
pub fn check_version(card: &Card, expected: Version) -> Result<(), CardServiceError> {
    if card.updated_at != expected {
        tracing::debug!(
            "Version mismatch on card {}: expected {}, found {}",
            card.id,
            expected,
            card.updated_at
        );
        return Err(CardServiceError::Conflict(card.id));
    }
    Ok(())
}
