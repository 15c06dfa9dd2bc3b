pub mod error;
pub mod infohash;
pub mod metadata;

pub use error::MetainfoError;
pub use infohash::calculate_info_hash;
pub use metadata::{FileEntry, Layout, Torrent};
