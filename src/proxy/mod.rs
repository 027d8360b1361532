//! Playlist generation

pub mod generator;

pub use generator::{category_title, PlaylistGenerator, RAW_PLAYLIST_TITLE, VALIDATED_PLAYLIST_TITLE};
