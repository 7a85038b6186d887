use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a card, assigned by the store on insert.
pub type CardId = Uuid;

/// Identifier of the board a card belongs to.
pub type BoardId = String;

/// Optimistic-concurrency token. A card's `updated_at` doubles as its version.
pub type Version = DateTime<Utc>;

/// The columns of the board, in their fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum CardStatus {
    Backlog,
    Todo,
    Doing,
    Done,
}

impl CardStatus {
    /// Every status in board order.
    pub const ALL: [CardStatus; 4] = [
        CardStatus::Backlog,
        CardStatus::Todo,
        CardStatus::Doing,
        CardStatus::Done,
    ];

    /// Position of the status in board order, starting at 0 for `BACKLOG`.
    pub fn index(self) -> usize {
        match self {
            CardStatus::Backlog => 0,
            CardStatus::Todo => 1,
            CardStatus::Doing => 2,
            CardStatus::Done => 3,
        }
    }

    /// The column to the right, if any.
    pub fn next(self) -> Option<CardStatus> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// The column to the left, if any.
    pub fn previous(self) -> Option<CardStatus> {
        self.index()
            .checked_sub(1)
            .and_then(|index| Self::ALL.get(index).copied())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CardStatus::Backlog => "BACKLOG",
            CardStatus::Todo => "TODO",
            CardStatus::Doing => "DOING",
            CardStatus::Done => "DONE",
        }
    }
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a status name that is not one of the board columns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown card status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for CardStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CardStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// A card on a board.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Card {
    pub id: CardId,
    pub title: String,
    pub description: String,
    pub status: CardStatus,
    pub board_id: BoardId,
    pub created_at: DateTime<Utc>,
    pub updated_at: Version,
}

/// The caller-supplied part of a new card. The store assigns the id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDraft {
    pub title: String,
    pub description: String,
    pub status: CardStatus,
    pub board_id: BoardId,
}

/// Partial update of a card's text fields.
///
/// `None` and empty strings both leave the existing value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CardPatch {
    #[cfg_attr(feature = "serde", serde(default))]
    pub title: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
}

impl CardPatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
