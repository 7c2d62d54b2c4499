use std::fs;
use std::path::Path;

use crate::error::Result;

use super::format::{load_from_playlist_format, load_from_pls};
use super::model::PlaylistEntry;
use super::playlist::Playlist;

/// Load/save boundary for playlists. Only called when a session starts or
/// closes, never while playing. Locators pass through as written; relative
/// paths are resolved by the store, not rewritten here.
pub trait PlaylistPersistence {
    fn load(&self, path: &Path) -> Result<Vec<PlaylistEntry>>;
    fn save(&self, path: &Path, playlist: &Playlist) -> Result<()>;
}

/// Plain playlist files on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaylistFile;

impl PlaylistPersistence for PlaylistFile {
    fn load(&self, path: &Path) -> Result<Vec<PlaylistEntry>> {
        let text = fs::read_to_string(path)?;
        let entries = if has_extension(path, &["pls"]) {
            load_from_pls(&text)?
        } else {
            load_from_playlist_format(&text)
        };

        log::info!("Loaded {} entries from {}", entries.len(), path.display());
        Ok(entries)
    }

    fn save(&self, path: &Path, playlist: &Playlist) -> Result<()> {
        fs::write(path, playlist.serialize())?;
        log::info!("Saved {} entries to {}", playlist.len(), path.display());
        Ok(())
    }
}

/// True for files this adapter knows how to read as playlists.
pub fn is_playlist_file(path: &Path) -> bool {
    has_extension(path, &["m3u", "m3u8", "pls"])
}

fn has_extension(path: &Path, exts: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| exts.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}
