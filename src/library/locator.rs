//! Typed locators and the storage collaborator that resolves them.
//!
//! A track's locator text can name a local file (`/music/a.ogg`,
//! `file:///music/a.ogg`), an object in the journal store
//! (`journal://<id>`) or a remote stream (`http://...`). Everything that
//! needs to know which one it is goes through [`Locator::parse`].

use std::fmt;
use std::path::{Path, PathBuf};

const JOURNAL_SCHEME: &str = "journal://";
const FILE_SCHEME: &str = "file://";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    LocalPath(PathBuf),
    StoreReference(String),
    RemoteUrl(String),
}

impl Locator {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if let Some(id) = text.strip_prefix(JOURNAL_SCHEME) {
            return Locator::StoreReference(id.to_string());
        }
        if let Some(path) = text.strip_prefix(FILE_SCHEME) {
            return Locator::LocalPath(PathBuf::from(percent_decode(path)));
        }
        if has_scheme(text) {
            return Locator::RemoteUrl(text.to_string());
        }
        Locator::LocalPath(PathBuf::from(text))
    }

    /// Short human-readable name: file stem, store id or last URL segment.
    pub fn display_name(&self) -> String {
        match self {
            Locator::LocalPath(path) => path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
                .unwrap_or_else(|| path.display().to_string()),
            Locator::StoreReference(id) => Path::new(id)
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
                .unwrap_or_else(|| id.clone()),
            Locator::RemoteUrl(url) => url
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .filter(|s| !s.is_empty() && !s.contains(':'))
                .map(str::to_string)
                .unwrap_or_else(|| url.clone()),
        }
    }

    pub fn is_relative_path(&self) -> bool {
        matches!(self, Locator::LocalPath(p) if p.is_relative())
    }
}

fn has_scheme(text: &str) -> bool {
    match text.find("://") {
        Some(pos) if pos > 0 => text[..pos]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')),
        _ => false,
    }
}

/// Decode `%XX` escapes as written by URI-quoting playlist writers.
/// Malformed escapes are kept verbatim.
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

/// What the pipeline is asked to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    File(PathBuf),
    Url(String),
}

impl fmt::Display for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MediaSource::File(path) => write!(f, "{}", path.display()),
            MediaSource::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Storage collaborator: turns a locator into something playable.
pub trait MediaStore {
    /// Resolve `locator` to a playable source, or `None` when its bytes are
    /// not reachable right now (file missing, media unmounted).
    fn resolve(&self, locator: &Locator) -> Option<MediaSource>;

    fn is_available(&self, locator: &Locator) -> bool {
        self.resolve(locator).is_some()
    }
}

/// Filesystem-backed store. Journal references live under `journal_root`
/// when one is configured; otherwise the id itself is treated as a path.
#[derive(Debug, Clone, Default)]
pub struct FsStore {
    journal_root: Option<PathBuf>,
    base_dir: Option<PathBuf>,
}

impl FsStore {
    pub fn new(journal_root: Option<PathBuf>) -> Self {
        Self {
            journal_root,
            base_dir: None,
        }
    }

    /// Resolve relative paths against `dir`, normally the folder holding the
    /// playlist file they were read from.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }
}

impl MediaStore for FsStore {
    fn resolve(&self, locator: &Locator) -> Option<MediaSource> {
        match locator {
            Locator::LocalPath(path) => {
                let path = match &self.base_dir {
                    Some(base) if locator.is_relative_path() => base.join(path),
                    _ => path.clone(),
                };
                path.exists().then_some(MediaSource::File(path))
            }
            Locator::StoreReference(id) => {
                let path = match &self.journal_root {
                    Some(root) => root.join(id),
                    None => PathBuf::from(id),
                };
                path.exists().then_some(MediaSource::File(path))
            }
            // Reachability of remote streams is only known once the pipeline tries them.
            Locator::RemoteUrl(url) => Some(MediaSource::Url(url.clone())),
        }
    }
}

/// Mime type guessed from the locator's extension, used in error reports.
pub fn mime_for_locator(locator: &str) -> &'static str {
    let ext = Path::new(locator.trim_end_matches('/'))
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("ogg") | Some("oga") => "audio/ogg",
        Some("flac") => "audio/flac",
        Some("wav") => "audio/x-wav",
        Some("m4a") | Some("aac") => "audio/mp4",
        Some("opus") => "audio/opus",
        Some("ogv") => "video/ogg",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("m3u") | Some("m3u8") => "audio/x-mpegurl",
        Some("pls") => "audio/x-scpls",
        _ => "application/octet-stream",
    }
}
