use super::locator::Locator;

/// One playlist slot.
///
/// `locator` is kept exactly as it was added or read from a playlist file so
/// that saving writes it back unchanged; `Track::resolve` turns it into a
/// typed [`Locator`] when the bytes are actually needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub locator: String,
    pub title: Option<String>,
    pub available: bool,
}

impl Track {
    pub fn resolve(&self) -> Locator {
        Locator::parse(&self.locator)
    }

    /// Title for display: the stored title, else a name derived from the locator.
    pub fn display_title(&self) -> String {
        match self.title.as_deref() {
            Some(t) if !t.trim().is_empty() => t.to_string(),
            _ => self.resolve().display_name(),
        }
    }
}

/// A `(title, locator)` pair as read from or written to a playlist file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    pub title: Option<String>,
    pub locator: String,
}

impl PlaylistEntry {
    pub fn new(title: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            locator: locator.into(),
        }
    }
}
