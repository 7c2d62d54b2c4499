//! Terminal rendering of the session: a status line, the playlist and a
//! message line, redrawn whenever a notification arrives.

use std::io::{self, Write};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType};

use crate::library::Playlist;
use crate::session::{Notification, NowPlaying, PlaybackState, SessionObserver, format_clock};

const HELP: &str =
    "[space] play/pause  [n/p] next/prev  [s] stop  [</>] seek  [+/-] volume  [d] remove  [r] rescan  [q] quit";

/// What the view shows, folded from notifications.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusSnapshot {
    pub state: PlaybackState,
    pub position: Option<String>,
    pub duration: Option<String>,
    pub now_playing: NowPlaying,
    pub message: Option<String>,
    pub previous_enabled: bool,
    pub next_enabled: bool,
    pub controls_enabled: bool,
}

impl StatusSnapshot {
    pub fn apply(&mut self, notification: &Notification) {
        match notification {
            Notification::StateChanged(state) => self.state = *state,
            Notification::PositionUpdated { position_ns, .. } => {
                self.position = Some(format_clock(*position_ns));
            }
            Notification::DurationKnown { label, .. } => self.duration = Some(label.clone()),
            Notification::TrackChanged(_) => {
                self.position = None;
                self.duration = None;
                self.now_playing = NowPlaying::default();
                self.message = None;
            }
            Notification::Error {
                message,
                description,
                ..
            } => {
                self.message = Some(format!("{description} ({message})"));
            }
            Notification::MissingTracks(missing) => {
                self.message = Some(match missing.len() {
                    1 => "1 track missing".to_string(),
                    n => format!("{n} tracks missing"),
                });
            }
            Notification::TransportChanged {
                previous,
                next,
                controls,
            } => {
                self.previous_enabled = *previous;
                self.next_enabled = *next;
                self.controls_enabled = *controls;
            }
            Notification::TagsUpdated(now_playing) => self.now_playing = now_playing.clone(),
            Notification::PlaylistFinished => {
                self.position = None;
                self.duration = None;
                self.message = Some("End of playlist".to_string());
            }
            Notification::PlaylistChanged { .. }
            | Notification::CurrentIndexMoved(_)
            | Notification::TitleChanged { .. }
            | Notification::StreamKindKnown { .. } => {}
        }
    }

    fn headline(&self) -> String {
        let mut line = format!("{:<8}", self.state.label());
        if let Some(pos) = &self.position {
            line.push_str(&format!(" {} / {}", pos, self.duration.as_deref().unwrap_or("--:--")));
        }

        let np = &self.now_playing;
        let parts: Vec<&str> = [np.title.as_deref(), np.artist.as_deref(), np.album.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if !parts.is_empty() {
            line.push_str("  ");
            line.push_str(&parts.join(" - "));
        }
        line
    }
}

/// Observer that keeps a `StatusSnapshot` and flags when it needs a redraw.
#[derive(Debug, Default)]
pub struct StatusView {
    snapshot: Mutex<StatusSnapshot>,
    dirty: AtomicBool,
}

impl StatusView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.snapshot
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Relaxed);
    }

    /// True if something changed since the last call.
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::Relaxed)
    }
}

impl SessionObserver for StatusView {
    fn on_notification(&self, notification: &Notification) {
        if let Ok(mut snapshot) = self.snapshot.lock() {
            snapshot.apply(notification);
        }
        self.mark_dirty();
    }
}

/// Lines to draw, top to bottom.
pub fn render_lines(
    snapshot: &StatusSnapshot,
    playlist: &Playlist,
    current: Option<usize>,
) -> Vec<String> {
    let mut lines = vec![snapshot.headline(), String::new()];

    for (i, track) in playlist.tracks().iter().enumerate() {
        let marker = if current == Some(i) { '>' } else { ' ' };
        let missing = if track.available { "" } else { "  [missing]" };
        lines.push(format!("{} {:>3}. {}{}", marker, i + 1, track.display_title(), missing));
    }
    if playlist.is_empty() {
        lines.push("  (empty playlist)".to_string());
    }

    lines.push(String::new());
    if let Some(message) = &snapshot.message {
        lines.push(message.clone());
    }
    lines.push(HELP.to_string());
    lines
}

/// Draw `lines`, keeping the line for `current` on screen when the playlist
/// is taller than the terminal.
pub fn draw(out: &mut impl Write, lines: &[String], current: Option<usize>) -> io::Result<()> {
    let (cols, rows) = terminal::size().unwrap_or((80, 24));
    let rows = rows.max(1) as usize;

    // Header lines come before the playlist entries.
    let focus = current.map_or(0, |i| i + 2);
    let start = if lines.len() <= rows || focus < rows / 2 {
        0
    } else {
        (focus - rows / 2).min(lines.len() - rows)
    };

    queue!(out, Clear(ClearType::All))?;
    for (row, line) in lines.iter().skip(start).take(rows).enumerate() {
        let text: String = line.chars().take(cols as usize).collect();
        queue!(out, MoveTo(0, row as u16), Print(text))?;
    }
    out.flush()
}
