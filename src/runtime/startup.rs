use std::env;
use std::path::{Path, PathBuf};

use crate::config::LibrarySettings;
use crate::error::Result;
use crate::library::{
    MediaStore, PlaylistEntry, PlaylistFile, PlaylistPersistence, entry_for_file, is_playlist_file,
    scan,
};
use crate::pipeline::PipelineFacade;
use crate::session::{Clock, Controller, Transition};

/// Where the session's tracks come from, decided from the first CLI argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistSource {
    /// An `.m3u`/`.m3u8`/`.pls` file.
    File(PathBuf),
    /// A directory scanned for audio files.
    Directory(PathBuf),
    /// A single media file.
    Single(PathBuf),
}

impl PlaylistSource {
    /// No argument means the current directory.
    pub fn from_arg(arg: Option<String>) -> Result<Self> {
        let path = match arg {
            Some(a) => PathBuf::from(a),
            None => env::current_dir()?,
        };

        Ok(if path.is_dir() {
            PlaylistSource::Directory(path)
        } else if is_playlist_file(&path) {
            PlaylistSource::File(path)
        } else {
            PlaylistSource::Single(path)
        })
    }

    pub fn load_entries(&self, library: &LibrarySettings) -> Result<Vec<PlaylistEntry>> {
        match self {
            PlaylistSource::File(path) => PlaylistFile.load(path),
            PlaylistSource::Directory(dir) => {
                let entries = scan(dir, library);
                log::info!("Found {} tracks under {}", entries.len(), dir.display());
                Ok(entries)
            }
            PlaylistSource::Single(path) => Ok(vec![entry_for_file(path)]),
        }
    }

    /// Folder that relative entries of a playlist file are relative to.
    pub fn base_dir(&self) -> Option<&Path> {
        match self {
            PlaylistSource::File(path) => path.parent(),
            _ => None,
        }
    }

    /// File the playlist is written back to on exit. Saving always uses the
    /// `#EXTINF` format, so a `.pls` source is saved next to itself as `.m3u`.
    pub fn save_target(&self) -> Option<PathBuf> {
        match self {
            PlaylistSource::File(path) if has_pls_extension(path) => {
                Some(path.with_extension("m3u"))
            }
            PlaylistSource::File(path) => Some(path.clone()),
            _ => None,
        }
    }
}

fn has_pls_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pls"))
}

/// Start the first track that can be played. Missing tracks before it were
/// already reported when the playlist was loaded.
pub fn start_first_available<P, S, C>(controller: &mut Controller<P, S, C>) -> Result<Option<usize>>
where
    P: PipelineFacade,
    S: MediaStore,
    C: Clock,
{
    let first = controller
        .playlist()
        .tracks()
        .iter()
        .position(|t| t.available);

    match first {
        Some(index) => match controller.select(index)? {
            Transition::Started(i) => Ok(Some(i)),
            _ => Ok(None),
        },
        None => {
            log::warn!("Nothing playable in the playlist");
            Ok(None)
        }
    }
}
