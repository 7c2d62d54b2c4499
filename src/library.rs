//! Track records, the playlist store and everything that reads or writes
//! playlists: text formats, the persistence adapter, directory scanning and
//! locator resolution.

mod format;
mod locator;
mod model;
mod persistence;
mod playlist;
mod scan;

pub use format::{load_from_playlist_format, load_from_pls, serialize_entries};
pub use locator::{FsStore, Locator, MediaSource, MediaStore, mime_for_locator, percent_decode};
pub use model::{PlaylistEntry, Track};
pub use persistence::{PlaylistFile, PlaylistPersistence, is_playlist_file};
pub use playlist::Playlist;
pub(crate) use playlist::{index_after_move, index_after_removal};
pub use scan::{entry_for_file, scan};
