//! Aggregate view builders: multi-request pages that tolerate partial failure.

pub mod archive;
pub mod character;
pub mod favorites;
pub mod genres;
pub mod home;

pub use archive::{load_directory, ArchiveSelection, SeasonDirectory};
pub use character::{load_character, load_pictures, CharacterCounts, CharacterProfile};
pub use favorites::{resolve_favorites, FavoritesRequest, FavoritesResponse, FavoritesView};
pub use genres::{browse_genre, load_taxonomy};
pub use home::{episode_badge, load_section, pick_hero, HomeSection, SectionItem};
