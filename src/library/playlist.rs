use crate::error::{JukeboxError, Result};

use super::format::serialize_entries;
use super::locator::MediaStore;
use super::model::{PlaylistEntry, Track};

/// Ordered track store. Indices are always `0..len()`; removing or moving an
/// entry re-indexes everything after it.
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Append a track. Unavailable tracks are kept so the user can see them.
    pub fn add(
        &mut self,
        locator: impl Into<String>,
        title: Option<String>,
        store: &dyn MediaStore,
    ) -> usize {
        let mut track = Track {
            locator: locator.into(),
            title,
            available: false,
        };
        track.available = store.is_available(&track.resolve());
        self.tracks.push(track);
        self.tracks.len() - 1
    }

    /// Remove a track by index. Returns the removed track.
    pub fn remove(&mut self, index: usize) -> Result<Track> {
        self.check_index(index)?;
        Ok(self.tracks.remove(index))
    }

    /// Move a track from one position to another.
    pub fn move_track(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_index(from)?;
        self.check_index(to)?;
        let track = self.tracks.remove(from);
        self.tracks.insert(to, track);
        Ok(())
    }

    pub fn set_title(&mut self, index: usize, title: String) -> Result<()> {
        self.check_index(index)?;
        self.tracks[index].title = Some(title);
        Ok(())
    }

    /// Record the outcome of a fresh availability check for one track.
    pub fn set_available(&mut self, index: usize, available: bool) -> Result<()> {
        self.check_index(index)?;
        self.tracks[index].available = available;
        Ok(())
    }

    /// Recompute availability of every track; returns the indices now missing.
    pub fn refresh_availability(&mut self, store: &dyn MediaStore) -> Vec<usize> {
        for track in self.tracks.iter_mut() {
            track.available = store.is_available(&track.resolve());
        }
        self.missing_tracks()
    }

    pub fn missing_tracks(&self) -> Vec<usize> {
        self.tracks
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.available)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn entries(&self) -> Vec<PlaylistEntry> {
        self.tracks
            .iter()
            .map(|t| PlaylistEntry {
                title: t.title.clone(),
                locator: t.locator.clone(),
            })
            .collect()
    }

    /// Render the playlist in the `#EXTINF` text format, preserving order.
    pub fn serialize(&self) -> String {
        serialize_entries(&self.entries())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.tracks.len() {
            return Err(JukeboxError::IndexOutOfRange {
                index,
                len: self.tracks.len(),
            });
        }
        Ok(())
    }
}

/// Where `current` points after the entry at `removed` was deleted from a
/// playlist that now holds `new_len` entries.
pub(crate) fn index_after_removal(
    current: Option<usize>,
    removed: usize,
    new_len: usize,
) -> Option<usize> {
    let ci = current?;
    if new_len == 0 {
        return None;
    }
    if removed < ci {
        Some(ci - 1)
    } else if removed == ci {
        Some(ci.min(new_len - 1))
    } else {
        Some(ci)
    }
}

/// Where `current` points after moving the entry at `from` to `to`.
pub(crate) fn index_after_move(current: Option<usize>, from: usize, to: usize) -> Option<usize> {
    let ci = current?;
    if ci == from {
        Some(to)
    } else if from < ci && ci <= to {
        Some(ci - 1)
    } else if to <= ci && ci < from {
        Some(ci + 1)
    } else {
        Some(ci)
    }
}
