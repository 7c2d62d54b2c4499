//! The playback session: a state machine over the playlist and the media
//! pipeline, plus the timers it drives (position polling, seek debounce).

mod controller;
mod notify;
mod poller;
mod state;
mod timer;

pub use controller::{Controller, Transition};
pub use notify::{Notification, SessionObserver};
pub use poller::format_clock;
pub use state::{NowPlaying, PlaybackState};
pub use timer::Clock;

#[cfg(test)]
mod tests;
