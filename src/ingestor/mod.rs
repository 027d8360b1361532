//! Source retrieval and M3U parsing

pub mod fetcher;
pub mod m3u_parser;

pub use fetcher::{FetchReport, FetchedSource, HttpPlaylistFetcher, PlaylistFetcher, SourceFetcher};
pub use m3u_parser::{parse_m3u, ParsedPlaylist};
