use std::sync::Arc;

use super::state::{NowPlaying, PlaybackState};

/// Everything the controller tells the view layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    StateChanged(PlaybackState),
    PositionUpdated {
        position_ns: u64,
        duration_ns: u64,
    },
    /// Sent once per track, when the duration first becomes known.
    DurationKnown {
        duration_ns: u64,
        label: String,
    },
    TrackChanged(usize),
    /// The current track kept playing but its playlist index shifted.
    CurrentIndexMoved(usize),
    Error {
        message: String,
        detail: String,
        description: String,
    },
    MissingTracks(Vec<usize>),
    /// Sensitivity of the transport buttons.
    TransportChanged {
        previous: bool,
        next: bool,
        controls: bool,
    },
    PlaylistChanged {
        len: usize,
    },
    TitleChanged {
        index: usize,
        title: String,
    },
    TagsUpdated(NowPlaying),
    StreamKindKnown {
        has_video: bool,
    },
    /// The last track ended or next/previous ran off the playlist.
    PlaylistFinished,
}

/// Receives session notifications. Called on the controller's thread;
/// implementations should return quickly.
pub trait SessionObserver: Send + Sync {
    fn on_notification(&self, notification: &Notification);
}

/// Fans notifications out to every registered observer.
#[derive(Default)]
pub struct Notifier {
    observers: Vec<Arc<dyn SessionObserver>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_observer(&mut self, observer: Arc<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    pub fn clear(&mut self) {
        self.observers.clear();
    }

    pub fn dispatch(&self, notification: Notification) {
        for observer in &self.observers {
            observer.on_notification(&notification);
        }
    }
}
