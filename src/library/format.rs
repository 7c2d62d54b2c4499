//! Playlist text formats.
//!
//! The native format is two lines per track:
//!
//! ```text
//! #EXTINF:<title>
//! <locator>
//! ```
//!
//! Blank lines and other `#` lines (`#EXTM3U`) are skipped. `.pls` files are
//! accepted on load but never written.

use std::collections::BTreeMap;

use crate::error::{JukeboxError, Result};

use super::model::PlaylistEntry;

const EXTINF: &str = "#EXTINF:";

/// Parse `#EXTINF` text into ordered `(title, locator)` candidates.
/// Does not touch any playlist; the caller decides how to append them.
pub fn load_from_playlist_format(text: &str) -> Vec<PlaylistEntry> {
    let mut entries = Vec::new();
    let mut pending_title: Option<String> = None;

    for line in text.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            continue;
        }
        if let Some(title) = line.strip_prefix(EXTINF) {
            if let Some(dropped) = pending_title.replace(title.to_string()) {
                log::debug!("#EXTINF without locator dropped: {}", dropped);
            }
            continue;
        }
        if line.starts_with('#') {
            continue;
        }
        entries.push(PlaylistEntry {
            title: pending_title.take(),
            locator: line.trim().to_string(),
        });
    }

    entries
}

/// Inverse of [`load_from_playlist_format`]. Entries without a title get the
/// locator's display name so that every track keeps its two lines.
pub fn serialize_entries(entries: &[PlaylistEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let title = match &entry.title {
            Some(t) => t.clone(),
            None => super::locator::Locator::parse(&entry.locator).display_name(),
        };
        out.push_str(EXTINF);
        out.push_str(&title);
        out.push('\n');
        out.push_str(&entry.locator);
        out.push('\n');
    }
    out
}

/// Parse a `[playlist]` PLS file (`FileN=` / `TitleN=` keys, ordered by N).
pub fn load_from_pls(text: &str) -> Result<Vec<PlaylistEntry>> {
    let mut lines = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with(';'));

    match lines.next() {
        Some(header) if header.eq_ignore_ascii_case("[playlist]") => {}
        _ => return Err(JukeboxError::Playlist("missing [playlist] header".to_string())),
    }

    let mut slots: BTreeMap<u32, (Option<String>, Option<String>)> = BTreeMap::new();
    for line in lines {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim().to_string();

        if let Some(n) = key.strip_prefix("file").and_then(|n| n.parse::<u32>().ok()) {
            slots.entry(n).or_default().1 = Some(value);
        } else if let Some(n) = key.strip_prefix("title").and_then(|n| n.parse::<u32>().ok()) {
            slots.entry(n).or_default().0 = Some(value);
        }
    }

    Ok(slots
        .into_values()
        .filter_map(|(title, locator)| locator.map(|locator| PlaylistEntry { title, locator }))
        .collect())
}
