//! Aggregation, pagination and view state for the catalog front end.

pub mod config;
pub mod detail;
pub mod error;
pub mod favorites;
pub mod filter;
pub mod pagination;
pub mod query;
pub mod sanitize;
pub mod source;
pub mod store;
pub mod views;

#[cfg(test)]
mod testing;

pub use config::AppConfig;
pub use detail::{DetailRequest, DetailResolver, DetailSlot, SlotState};
pub use error::KanimeError;
pub use favorites::FavoritesStore;
pub use filter::{FetchRequest, FetchResponse, FilterState, RenderModel, ViewMode};
pub use pagination::{Generation, Outcome, Paginator, Phase, Ticket};
pub use query::{DateRange, FilterChange, QueryDescriptor, ScoreRange};
pub use sanitize::{sanitize, Displayable};
pub use source::{AnimeListing, CharacterListing, ListingSource};
pub use store::{BlobStore, FileStore, MemoryStore};
