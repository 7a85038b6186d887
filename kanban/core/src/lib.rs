//! Core domain models and the card state-transition engine for the Kanban board.
//!
//! Cards move through the ordered columns `BACKLOG → TODO → DOING → DONE`. The
//! [`CardService`] is the single entry point for mutations and enforces:
//! - adjacent-only moves, with `DONE` as a terminal column ([`transition`])
//! - a work-in-progress cap on `DOING` per board ([`wip`])
//! - optimistic concurrency on the card's `updated_at` token ([`concurrency`])
//!
//! Persistence is reached through the [`CardStore`] trait. An in-memory
//! implementation lives in [`memory`]; database-backed stores live with the
//! server.
pub mod card;
pub mod concurrency;
pub mod error;
pub mod memory;
pub mod service;
pub mod store;
pub mod transition;
pub mod wip;

pub use card::{BoardId, Card, CardDraft, CardId, CardPatch, CardStatus, UnknownStatus, Version};
pub use error::{CardServiceError, StoreError};
pub use memory::InMemoryCardStore;
pub use service::CardService;
pub use store::{CardChanges, CardStore};
pub use wip::DOING_WIP_LIMIT;
