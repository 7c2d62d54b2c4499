use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::SessionSettings;
use crate::error::{JukeboxError, Result};
use crate::library::{
    MediaStore, Playlist, PlaylistEntry, Track, index_after_move, index_after_removal,
    mime_for_locator,
};
use crate::pipeline::{PipelineEvent, PipelineFacade, SourceEvent, TagKey};

use super::notify::{Notification, Notifier, SessionObserver};
use super::poller::PositionPoller;
use super::state::{PipelineFailure, PlaybackState, SessionState};
use super::timer::{Clock, Debounce, SystemClock};

/// Outcome of a track change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The track was loaded and playback started.
    Started(usize),
    /// The track's media could not be found; nothing was touched.
    Unavailable(usize),
    /// next/previous ran off the playlist; playback stopped.
    EndOfPlaylist,
}

/// The playback session: owns the playlist, drives the pipeline and keeps
/// `SessionState` consistent with both.
///
/// Everything runs on the caller's thread. Pipeline events must be handed
/// in through `handle_pipeline_event` from that same thread, and `tick`
/// must be called at or after `next_deadline`. Each `set_source` is stamped
/// with a fresh generation; events from an earlier source are dropped.
pub struct Controller<P, S, C = SystemClock> {
    playlist: Playlist,
    state: SessionState,
    pipeline: P,
    /// Generation of the source last handed to the pipeline.
    source_generation: u64,
    store: S,
    clock: C,
    poller: PositionPoller,
    seek_debounce: Debounce,
    notifier: Notifier,
}

impl<P: PipelineFacade, S: MediaStore> Controller<P, S, SystemClock> {
    pub fn new(pipeline: P, store: S, settings: &SessionSettings) -> Self {
        Self::with_clock(pipeline, store, SystemClock, settings)
    }
}

impl<P: PipelineFacade, S: MediaStore, C: Clock> Controller<P, S, C> {
    pub fn with_clock(pipeline: P, store: S, clock: C, settings: &SessionSettings) -> Self {
        Self {
            playlist: Playlist::new(),
            state: SessionState::default(),
            pipeline,
            source_generation: 0,
            store,
            clock,
            poller: PositionPoller::new(Duration::from_millis(settings.poll_interval_ms)),
            seek_debounce: Debounce::new(Duration::from_millis(settings.seek_debounce_ms)),
            notifier: Notifier::new(),
        }
    }

    pub fn add_observer(&mut self, observer: Arc<dyn SessionObserver>) {
        self.notifier.add_observer(observer);
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.state.playback_state
    }

    pub fn current_index(&self) -> Option<usize> {
        self.state.current_index
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.state.current_index.and_then(|i| self.playlist.get(i))
    }

    /// Total-time label of the current track, once known.
    pub fn duration_label(&self) -> Option<&str> {
        self.poller.duration_label()
    }

    pub fn previous_enabled(&self) -> bool {
        matches!(self.state.current_index, Some(i) if i > 0)
    }

    pub fn next_enabled(&self) -> bool {
        matches!(self.state.current_index, Some(i) if i + 1 < self.playlist.len())
    }

    /// Play/pause and the position slider are disabled after a pipeline error.
    pub fn controls_enabled(&self) -> bool {
        self.state.playback_state != PlaybackState::Errored
    }

    /// Append entries read from a playlist source. Missing tracks are kept
    /// and reported together in a single notification.
    pub fn load_entries(&mut self, entries: Vec<PlaylistEntry>) -> Vec<usize> {
        let mut missing = Vec::new();
        for entry in entries {
            let index = self.playlist.add(entry.locator, entry.title, &self.store);
            if self.playlist.get(index).is_some_and(|t| !t.available) {
                missing.push(index);
            }
        }

        log::info!(
            "Loaded {} tracks ({} missing)",
            self.playlist.len(),
            missing.len()
        );
        self.notify_playlist_changed();
        if !missing.is_empty() {
            self.emit(Notification::MissingTracks(missing.clone()));
        }
        missing
    }

    pub fn add_track(&mut self, locator: impl Into<String>, title: Option<String>) -> usize {
        let index = self.playlist.add(locator, title, &self.store);
        self.notify_playlist_changed();
        index
    }

    /// Remove a track. Removing the current track stops playback; the
    /// current index then points at whatever now occupies that slot.
    pub fn remove_track(&mut self, index: usize) -> Result<Track> {
        let removed = self.playlist.remove(index)?;
        let was_current = self.state.current_index == Some(index);
        let before = self.state.current_index;
        self.state.current_index = index_after_removal(before, index, self.playlist.len());

        if was_current {
            self.halt();
            self.poller.reset_track();
            self.state.reset_track();
            self.set_state(PlaybackState::Stopped);
        }
        self.notify_playlist_changed();
        match self.state.current_index {
            Some(i) if was_current => self.emit(Notification::TrackChanged(i)),
            _ => self.notify_index_moved(before),
        }
        Ok(removed)
    }

    pub fn move_track(&mut self, from: usize, to: usize) -> Result<()> {
        self.playlist.move_track(from, to)?;
        let before = self.state.current_index;
        self.state.current_index = index_after_move(before, from, to);
        self.notify_playlist_changed();
        self.notify_index_moved(before);
        Ok(())
    }

    /// Re-check every track against the store, e.g. after storage was
    /// mounted or unmounted. Playback is not affected.
    pub fn refresh_availability(&mut self) -> Vec<usize> {
        let missing = self.playlist.refresh_availability(&self.store);
        log::debug!("Availability refreshed, {} missing", missing.len());
        self.notify_playlist_changed();
        if !missing.is_empty() {
            self.emit(Notification::MissingTracks(missing.clone()));
        }
        missing
    }

    /// Load and play the track at `index`, restarting it if it is already
    /// current. An unavailable track is reported and leaves the session as
    /// it was.
    pub fn select(&mut self, index: usize) -> Result<Transition> {
        let locator = match self.playlist.get(index) {
            Some(track) => track.resolve(),
            None => {
                return Err(JukeboxError::IndexOutOfRange {
                    index,
                    len: self.playlist.len(),
                });
            }
        };

        let source = self.store.resolve(&locator);
        self.playlist.set_available(index, source.is_some())?;
        let Some(source) = source else {
            let err = JukeboxError::TrackUnavailable {
                index,
                locator: self.playlist.get(index).map(|t| t.locator.clone()).unwrap_or_default(),
            };
            log::warn!("{err}");
            self.emit(Notification::MissingTracks(vec![index]));
            return Ok(Transition::Unavailable(index));
        };

        self.seek_debounce.cancel();
        self.source_generation += 1;
        self.pipeline.set_source(&source, self.source_generation);
        self.pipeline.play();

        self.state.current_index = Some(index);
        self.state.reset_track();
        self.poller.reset_track();
        self.poller.start(self.clock.now());

        log::info!("Playing [{}/{}] {}", index + 1, self.playlist.len(), source);
        self.emit(Notification::TrackChanged(index));
        self.set_state(PlaybackState::Playing);
        self.notify_transport();
        Ok(Transition::Started(index))
    }

    pub fn next(&mut self) -> Result<Transition> {
        match self.state.current_index {
            Some(i) if i + 1 < self.playlist.len() => self.select(i + 1),
            _ => Ok(self.finish_playlist()),
        }
    }

    pub fn previous(&mut self) -> Result<Transition> {
        match self.state.current_index {
            Some(i) if i > 0 => self.select(i - 1),
            _ => Ok(self.finish_playlist()),
        }
    }

    /// Returns the resulting state.
    pub fn play_pause_toggle(&mut self) -> Result<PlaybackState> {
        match self.state.playback_state {
            PlaybackState::Playing => {
                self.pipeline.pause();
                self.poller.suspend();
                self.set_state(PlaybackState::Paused);
            }
            PlaybackState::Paused => {
                self.pipeline.play();
                self.poller.start(self.clock.now());
                self.set_state(PlaybackState::Playing);
            }
            PlaybackState::Stopped => {
                // A stopped pipeline starts over anyway; reselecting also
                // picks up a current slot whose track was replaced.
                match self.state.current_index {
                    Some(i) => {
                        self.select(i)?;
                    }
                    None if !self.playlist.is_empty() => {
                        self.select(0)?;
                    }
                    None => log::debug!("Nothing to play"),
                }
            }
            PlaybackState::Seeking | PlaybackState::Errored => {
                log::debug!("Toggle ignored while {:?}", self.state.playback_state);
            }
        }
        Ok(self.state.playback_state)
    }

    pub fn stop(&mut self) {
        self.halt();
        self.state.position_ns = 0;
        if self.state.playback_state != PlaybackState::Errored {
            self.set_state(PlaybackState::Stopped);
        }
        self.notify_transport();
    }

    /// Start dragging the position slider. Only meaningful while a track is
    /// playing or paused; returns whether seeking began.
    pub fn begin_seek(&mut self) -> bool {
        let resume = match self.state.playback_state {
            PlaybackState::Playing => {
                // Take a fresh sample so a release without drag stays put.
                self.sample_position();
                self.pipeline.pause();
                PlaybackState::Playing
            }
            PlaybackState::Paused => PlaybackState::Paused,
            other => {
                log::debug!("Seek ignored while {:?}", other);
                return false;
            }
        };

        self.state.resume_after_seek = Some(resume);
        self.state.pending_seek_target = None;
        self.poller.suspend();
        self.set_state(PlaybackState::Seeking);
        true
    }

    /// Move the slider to `fraction` of the track. The pipeline sees the
    /// value once the slider has been still for the debounce window.
    pub fn update_seek(&mut self, fraction: f64) {
        if self.state.playback_state != PlaybackState::Seeking || !fraction.is_finite() {
            return;
        }

        let fraction = fraction.clamp(0.0, 1.0);
        self.state.pending_seek_target = Some(fraction);
        self.seek_debounce.arm(self.clock.now());

        if let Some(duration_ns) = self.state.duration_ns {
            self.emit(Notification::PositionUpdated {
                position_ns: fraction_to_ns(fraction, duration_ns),
                duration_ns,
            });
        }
    }

    /// Release the slider: one final seek, then back to the state seeking
    /// started from. While the duration is still unknown no seek is issued,
    /// since a fraction cannot be turned into a position.
    pub fn end_seek(&mut self) {
        if self.state.playback_state != PlaybackState::Seeking {
            return;
        }
        self.seek_debounce.cancel();

        let target = match (self.state.pending_seek_target.take(), self.state.duration_ns) {
            (Some(fraction), Some(duration_ns)) => Some(fraction_to_ns(fraction, duration_ns)),
            (None, Some(_)) => Some(self.state.position_ns),
            (_, None) => {
                log::debug!("Seek released before the duration was known");
                None
            }
        };

        if let Some(position_ns) = target {
            self.pipeline.seek(position_ns);
            self.state.position_ns = position_ns;
        }

        let resume = self
            .state
            .resume_after_seek
            .take()
            .unwrap_or(PlaybackState::Paused);
        if resume == PlaybackState::Playing {
            self.pipeline.play();
            self.poller.start(self.clock.now());
        }
        self.set_state(resume);

        if let Some(duration_ns) = self.state.duration_ns {
            self.emit(Notification::PositionUpdated {
                position_ns: self.state.position_ns,
                duration_ns,
            });
        }
    }

    /// Run whatever timers are due.
    pub fn tick(&mut self) {
        let now = self.clock.now();

        if self.seek_debounce.expired(now) {
            self.flush_pending_seek();
        }
        if self.poller.due(now) && self.state.playback_state == PlaybackState::Playing {
            self.sample_position();
        }
    }

    /// The earliest instant at which `tick` has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.poller.next_deadline(), self.seek_debounce.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Apply an event from the pipeline. Events stamped with an older
    /// generation belong to a source that has since been replaced.
    pub fn handle_pipeline_event(&mut self, stamped: SourceEvent) -> Result<()> {
        if stamped.generation != self.source_generation {
            log::debug!(
                "Dropping {:?} from generation {} (current {})",
                stamped.event,
                stamped.generation,
                self.source_generation
            );
            return Ok(());
        }
        match stamped.event {
            PipelineEvent::EndOfStream => self.on_end_of_stream()?,
            PipelineEvent::Error { message, detail } => self.on_error(message, detail),
            PipelineEvent::Tag { key, value } => self.on_tag(key, value),
            PipelineEvent::StreamKindKnown { has_video } => self.on_stream_kind_known(has_video),
        }
        Ok(())
    }

    pub fn on_end_of_stream(&mut self) -> Result<()> {
        if self.state.playback_state != PlaybackState::Playing {
            log::debug!(
                "Dropping end-of-stream while {:?}",
                self.state.playback_state
            );
            return Ok(());
        }
        self.next().map(|_| ())
    }

    pub fn on_error(&mut self, message: String, detail: String) {
        log::error!("Pipeline error: {}", message);
        log::error!("Pipeline error detail: {}", detail);

        self.halt();
        let mime = self
            .current_track()
            .map(|t| mime_for_locator(&t.locator))
            .unwrap_or("application/octet-stream");
        let failure = PipelineFailure {
            message,
            detail,
            description: format!("This \"{}\" file can't be played", mime),
        };

        self.state.last_error = Some(failure.clone());
        self.set_state(PlaybackState::Errored);
        self.emit(Notification::Error {
            message: failure.message,
            detail: failure.detail,
            description: failure.description,
        });
        self.notify_transport();
    }

    pub fn on_tag(&mut self, key: TagKey, value: String) {
        let now_playing = &mut self.state.now_playing;
        match key {
            TagKey::Title => now_playing.title = Some(value),
            TagKey::Artist => now_playing.artist = Some(value),
            TagKey::Album => now_playing.album = Some(value),
            TagKey::Other(name) => {
                log::debug!("Ignoring tag {}", name);
                return;
            }
        }

        if let Some(title) = self.state.now_playing.title.clone() {
            self.fill_in_title(title);
        }
        self.emit(Notification::TagsUpdated(self.state.now_playing.clone()));
    }

    pub fn on_stream_kind_known(&mut self, has_video: bool) {
        if self.state.has_video.is_some() {
            return;
        }
        self.state.has_video = Some(has_video);
        self.emit(Notification::StreamKindKnown { has_video });
    }

    pub fn set_volume(&mut self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        self.state.volume = volume;
        self.pipeline.set_volume(volume);
    }

    /// Shut the session down: pipeline stopped, timers cancelled.
    pub fn close(&mut self) {
        self.halt();
        self.set_state(PlaybackState::Stopped);
        self.notifier.clear();
        log::info!("Session closed");
    }

    fn halt(&mut self) {
        self.pipeline.stop();
        self.poller.suspend();
        self.seek_debounce.cancel();
        self.state.pending_seek_target = None;
        self.state.resume_after_seek = None;
    }

    fn finish_playlist(&mut self) -> Transition {
        self.halt();
        self.state.position_ns = 0;
        self.state.duration_ns = None;
        self.poller.reset_track();
        log::info!("End of playlist");
        self.set_state(PlaybackState::Stopped);
        self.emit(Notification::PlaylistFinished);
        self.notify_transport();
        Transition::EndOfPlaylist
    }

    fn flush_pending_seek(&mut self) {
        if self.state.playback_state != PlaybackState::Seeking {
            return;
        }
        if let (Some(fraction), Some(duration_ns)) =
            (self.state.pending_seek_target, self.state.duration_ns)
        {
            let position_ns = fraction_to_ns(fraction, duration_ns);
            log::debug!("Debounced seek to {} ns", position_ns);
            self.pipeline.seek(position_ns);
        }
    }

    fn sample_position(&mut self) {
        let Some(sample) = self.poller.sample(self.pipeline.query_position()) else {
            return;
        };

        self.state.position_ns = sample.position_ns;
        if sample.duration_first_known {
            self.state.duration_ns = Some(sample.duration_ns);
            self.emit(Notification::DurationKnown {
                duration_ns: sample.duration_ns,
                label: self.poller.duration_label().unwrap_or_default().to_string(),
            });
        }
        self.emit(Notification::PositionUpdated {
            position_ns: sample.position_ns,
            duration_ns: sample.duration_ns,
        });
    }

    fn fill_in_title(&mut self, title: String) {
        let Some(index) = self.state.current_index else {
            return;
        };
        let untitled = self.playlist.get(index).is_some_and(|t| t.title.is_none());
        if untitled && self.playlist.set_title(index, title.clone()).is_ok() {
            self.emit(Notification::TitleChanged { index, title });
        }
    }

    fn set_state(&mut self, new_state: PlaybackState) {
        let old = self.state.playback_state;
        if old == new_state {
            return;
        }
        log::debug!("Session {:?} -> {:?}", old, new_state);
        self.state.playback_state = new_state;
        self.emit(Notification::StateChanged(new_state));
    }

    fn notify_playlist_changed(&mut self) {
        self.emit(Notification::PlaylistChanged {
            len: self.playlist.len(),
        });
        self.notify_transport();
    }

    /// The current track stayed the same but now sits at another index.
    fn notify_index_moved(&mut self, before: Option<usize>) {
        if let Some(index) = self.state.current_index {
            if before != Some(index) {
                self.emit(Notification::CurrentIndexMoved(index));
            }
        }
    }

    fn notify_transport(&self) {
        self.emit(Notification::TransportChanged {
            previous: self.previous_enabled(),
            next: self.next_enabled(),
            controls: self.controls_enabled(),
        });
    }

    fn emit(&self, notification: Notification) {
        self.notifier.dispatch(notification);
    }
}

fn fraction_to_ns(fraction: f64, duration_ns: u64) -> u64 {
    (fraction.clamp(0.0, 1.0) * duration_ns as f64).round() as u64
}
