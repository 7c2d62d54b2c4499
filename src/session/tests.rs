use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::poller::PositionPoller;
use super::timer::{Debounce, Timer};
use super::*;
use crate::config::SessionSettings;
use crate::error::JukeboxError;
use crate::library::{Locator, MediaSource, MediaStore, PlaylistEntry};
use crate::pipeline::{PipelineEvent, PipelineFacade, PositionQuery, SourceEvent, TagKey};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    SetSource(String),
    Play,
    Pause,
    Stop,
    Seek(u64),
    Volume(f32),
}

/// Pipeline double: records every call; position answers are scripted.
#[derive(Clone, Default)]
struct RecordingPipeline {
    calls: Rc<RefCell<Vec<Call>>>,
    position: Rc<Cell<PositionQuery>>,
    generation: Rc<Cell<u64>>,
}

impl RecordingPipeline {
    fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    fn seeks(&self) -> Vec<u64> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Seek(ns) => Some(*ns),
                _ => None,
            })
            .collect()
    }

    /// Stamp `event` as coming from the source loaded last.
    fn event(&self, event: PipelineEvent) -> SourceEvent {
        SourceEvent {
            generation: self.generation.get(),
            event,
        }
    }

    fn report(&self, position_ns: u64, duration_ns: u64) {
        self.position.set(PositionQuery {
            ok: true,
            position_ns,
            duration_ns,
        });
    }
}

impl PipelineFacade for RecordingPipeline {
    fn set_source(&mut self, source: &MediaSource, generation: u64) {
        self.calls.borrow_mut().push(Call::SetSource(source.to_string()));
        self.generation.set(generation);
        self.position.set(PositionQuery::default());
    }
    fn play(&mut self) {
        self.calls.borrow_mut().push(Call::Play);
    }
    fn pause(&mut self) {
        self.calls.borrow_mut().push(Call::Pause);
    }
    fn stop(&mut self) {
        self.calls.borrow_mut().push(Call::Stop);
    }
    fn seek(&mut self, position_ns: u64) {
        self.calls.borrow_mut().push(Call::Seek(position_ns));
    }
    fn query_position(&self) -> PositionQuery {
        self.position.get()
    }
    fn set_volume(&mut self, volume: f32) {
        self.calls.borrow_mut().push(Call::Volume(volume));
    }
}

/// Files that "exist"; shared so a test can unmount one mid-session.
#[derive(Clone, Default)]
struct SetStore(Rc<RefCell<HashSet<PathBuf>>>);

impl SetStore {
    fn with(paths: &[&str]) -> Self {
        Self(Rc::new(RefCell::new(paths.iter().map(PathBuf::from).collect())))
    }

    fn forget(&self, path: &str) {
        self.0.borrow_mut().remove(&PathBuf::from(path));
    }
}

impl MediaStore for SetStore {
    fn resolve(&self, locator: &Locator) -> Option<MediaSource> {
        match locator {
            Locator::LocalPath(p) if self.0.borrow().contains(p) => {
                Some(MediaSource::File(p.clone()))
            }
            _ => None,
        }
    }
}

#[derive(Clone)]
struct ManualClock(Rc<Cell<Instant>>);

impl ManualClock {
    fn new() -> Self {
        Self(Rc::new(Cell::new(Instant::now())))
    }

    fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + Duration::from_millis(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.0.get()
    }
}

#[derive(Default)]
struct RecordingObserver {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingObserver {
    fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.seen.lock().unwrap())
    }
}

impl SessionObserver for RecordingObserver {
    fn on_notification(&self, notification: &Notification) {
        self.seen.lock().unwrap().push(notification.clone());
    }
}

struct Harness {
    ctl: Controller<RecordingPipeline, SetStore, ManualClock>,
    pipeline: RecordingPipeline,
    store: SetStore,
    clock: ManualClock,
    observer: Arc<RecordingObserver>,
}

const SEC: u64 = 1_000_000_000;

fn harness(existing: &[&str], entries: &[(&str, &str)]) -> Harness {
    let pipeline = RecordingPipeline::default();
    let store = SetStore::with(existing);
    let clock = ManualClock::new();
    let observer = Arc::new(RecordingObserver::default());

    let mut ctl = Controller::with_clock(
        pipeline.clone(),
        store.clone(),
        clock.clone(),
        &SessionSettings::default(),
    );
    ctl.add_observer(observer.clone());
    ctl.load_entries(
        entries
            .iter()
            .map(|(title, locator)| PlaylistEntry::new(*title, *locator))
            .collect(),
    );
    observer.take();

    Harness {
        ctl,
        pipeline,
        store,
        clock,
        observer,
    }
}

fn abc() -> Harness {
    harness(
        &["/a.ogg", "/b.ogg", "/c.ogg"],
        &[("A", "/a.ogg"), ("B", "/b.ogg"), ("C", "/c.ogg")],
    )
}

/// Select `index`, let the poller learn a 100 s duration and clear the logs.
fn playing_with_duration(h: &mut Harness, index: usize) {
    h.ctl.select(index).unwrap();
    h.pipeline.report(10 * SEC, 100 * SEC);
    h.clock.advance(500);
    h.ctl.tick();
    assert_eq!(h.ctl.state().duration_ns, Some(100 * SEC));
    h.pipeline.clear();
    h.observer.take();
}

fn assert_index_invariant(h: &Harness) {
    if let Some(i) = h.ctl.current_index() {
        assert!(i < h.ctl.playlist().len(), "index {} out of bounds", i);
    }
    assert_eq!(
        h.ctl.previous_enabled(),
        matches!(h.ctl.current_index(), Some(i) if i > 0)
    );
    assert_eq!(
        h.ctl.next_enabled(),
        matches!(h.ctl.current_index(), Some(i) if i + 1 < h.ctl.playlist().len())
    );
}

#[test]
fn fresh_session_is_stopped_with_nothing_selected() {
    let h = abc();
    assert_eq!(h.ctl.playback_state(), PlaybackState::Stopped);
    assert_eq!(h.ctl.current_index(), None);
    assert!(!h.ctl.previous_enabled());
    assert!(!h.ctl.next_enabled());
    assert!(h.pipeline.calls().is_empty());
}

#[test]
fn select_loads_source_then_plays() {
    let mut h = abc();
    assert_eq!(h.ctl.select(1).unwrap(), Transition::Started(1));

    assert_eq!(
        h.pipeline.calls(),
        vec![Call::SetSource("/b.ogg".into()), Call::Play]
    );
    assert_eq!(h.ctl.playback_state(), PlaybackState::Playing);
    assert_eq!(h.ctl.current_index(), Some(1));
    assert!(h.ctl.previous_enabled());
    assert!(h.ctl.next_enabled());

    let seen = h.observer.take();
    assert!(seen.contains(&Notification::TrackChanged(1)));
    assert!(seen.contains(&Notification::StateChanged(PlaybackState::Playing)));
    assert!(seen.contains(&Notification::TransportChanged {
        previous: true,
        next: true,
        controls: true,
    }));
}

#[test]
fn select_out_of_range_is_an_error() {
    let mut h = abc();
    assert_eq!(
        h.ctl.select(3),
        Err(JukeboxError::IndexOutOfRange { index: 3, len: 3 })
    );
    assert!(h.pipeline.calls().is_empty());
    assert_eq!(h.ctl.current_index(), None);
}

#[test]
fn selecting_the_current_track_restarts_it() {
    let mut h = abc();
    playing_with_duration(&mut h, 0);

    h.ctl.select(0).unwrap();
    assert_eq!(
        h.pipeline.calls(),
        vec![Call::SetSource("/a.ogg".into()), Call::Play]
    );
    assert_eq!(h.ctl.state().position_ns, 0);
    assert_eq!(h.ctl.state().duration_ns, None);
}

#[test]
fn toggle_twice_from_playing_pauses_once_and_plays_once() {
    let mut h = abc();
    h.ctl.select(0).unwrap();
    h.pipeline.clear();

    assert_eq!(h.ctl.play_pause_toggle().unwrap(), PlaybackState::Paused);
    assert_eq!(h.ctl.play_pause_toggle().unwrap(), PlaybackState::Playing);

    assert_eq!(h.pipeline.calls(), vec![Call::Pause, Call::Play]);
}

#[test]
fn toggle_from_stopped_without_selection_starts_first_track() {
    let mut h = abc();
    assert_eq!(h.ctl.play_pause_toggle().unwrap(), PlaybackState::Playing);
    assert_eq!(h.ctl.current_index(), Some(0));
    assert_eq!(h.pipeline.calls()[0], Call::SetSource("/a.ogg".into()));
}

#[test]
fn toggle_on_empty_playlist_does_nothing() {
    let mut h = harness(&[], &[]);
    assert_eq!(h.ctl.play_pause_toggle().unwrap(), PlaybackState::Stopped);
    assert!(h.pipeline.calls().is_empty());
}

#[test]
fn next_past_the_last_track_stops_and_keeps_index() {
    let mut h = abc();
    h.ctl.select(2).unwrap();
    h.pipeline.clear();
    h.observer.take();

    assert_eq!(h.ctl.next().unwrap(), Transition::EndOfPlaylist);

    assert!(h.pipeline.calls().contains(&Call::Stop));
    assert_eq!(h.ctl.playback_state(), PlaybackState::Stopped);
    assert_eq!(h.ctl.current_index(), Some(2));
    assert!(h.observer.take().contains(&Notification::PlaylistFinished));
    assert_index_invariant(&h);
}

#[test]
fn previous_before_the_first_track_stops() {
    let mut h = abc();
    h.ctl.select(0).unwrap();
    assert_eq!(h.ctl.previous().unwrap(), Transition::EndOfPlaylist);
    assert_eq!(h.ctl.playback_state(), PlaybackState::Stopped);
    assert_eq!(h.ctl.current_index(), Some(0));
}

#[test]
fn next_and_previous_walk_the_playlist() {
    let mut h = abc();
    h.ctl.select(0).unwrap();
    assert_eq!(h.ctl.next().unwrap(), Transition::Started(1));
    assert_eq!(h.ctl.next().unwrap(), Transition::Started(2));
    assert!(!h.ctl.next_enabled());
    assert_eq!(h.ctl.previous().unwrap(), Transition::Started(1));
    assert_index_invariant(&h);
}

#[test]
fn end_of_stream_advances_only_while_playing() {
    let mut h = abc();
    h.ctl.select(0).unwrap();
    h.ctl
        .handle_pipeline_event(h.pipeline.event(PipelineEvent::EndOfStream))
        .unwrap();
    assert_eq!(h.ctl.current_index(), Some(1));
    assert_eq!(h.ctl.playback_state(), PlaybackState::Playing);

    h.ctl.play_pause_toggle().unwrap();
    h.pipeline.clear();
    h.ctl
        .handle_pipeline_event(h.pipeline.event(PipelineEvent::EndOfStream))
        .unwrap();
    assert_eq!(h.ctl.current_index(), Some(1));
    assert!(h.pipeline.calls().is_empty());
}

#[test]
fn end_of_stream_from_a_replaced_source_is_dropped() {
    let mut h = abc();
    h.ctl.select(0).unwrap();
    let from_first = h.pipeline.event(PipelineEvent::EndOfStream);

    h.ctl.next().unwrap();
    h.pipeline.clear();
    h.ctl.handle_pipeline_event(from_first).unwrap();

    assert_eq!(h.ctl.current_index(), Some(1));
    assert_eq!(h.ctl.playback_state(), PlaybackState::Playing);
    assert!(h.pipeline.calls().is_empty());
}

#[test]
fn late_error_from_a_replaced_source_leaves_the_new_track_playing() {
    let mut h = abc();
    h.ctl.select(0).unwrap();
    let from_first = h.pipeline.event(PipelineEvent::Error {
        message: "decode failed".into(),
        detail: "a.ogg".into(),
    });

    h.ctl.select(1).unwrap();
    h.observer.take();
    h.ctl.handle_pipeline_event(from_first).unwrap();

    assert_eq!(h.ctl.playback_state(), PlaybackState::Playing);
    assert!(h.ctl.controls_enabled());
    assert_eq!(h.ctl.state().last_error, None);
    assert!(h.observer.take().is_empty());
}

#[test]
fn reselecting_a_track_drops_events_from_its_previous_load() {
    let mut h = abc();
    h.ctl.select(0).unwrap();
    let stale = h.pipeline.event(PipelineEvent::EndOfStream);

    h.ctl.select(0).unwrap();
    h.ctl.handle_pipeline_event(stale).unwrap();
    assert_eq!(h.ctl.current_index(), Some(0));

    h.ctl
        .handle_pipeline_event(h.pipeline.event(PipelineEvent::EndOfStream))
        .unwrap();
    assert_eq!(h.ctl.current_index(), Some(1));
}

#[test]
fn end_of_stream_on_last_track_finishes_playlist() {
    let mut h = abc();
    h.ctl.select(2).unwrap();
    h.ctl.on_end_of_stream().unwrap();
    assert_eq!(h.ctl.playback_state(), PlaybackState::Stopped);
    assert_eq!(h.ctl.current_index(), Some(2));
}

#[test]
fn rapid_seek_updates_are_debounced_and_release_seeks_once() {
    let mut h = abc();
    playing_with_duration(&mut h, 0);

    assert!(h.ctl.begin_seek());
    assert_eq!(h.ctl.playback_state(), PlaybackState::Seeking);
    assert_eq!(h.pipeline.calls(), vec![Call::Pause]);

    for step in 1..=10 {
        h.ctl.update_seek(step as f64 / 20.0);
        h.clock.advance(20);
        h.ctl.tick();
    }
    assert!(h.pipeline.seeks().is_empty());

    h.clock.advance(250);
    h.ctl.tick();
    assert_eq!(h.pipeline.seeks(), vec![50 * SEC]);

    h.ctl.end_seek();
    assert_eq!(h.pipeline.seeks(), vec![50 * SEC, 50 * SEC]);
    assert_eq!(h.ctl.playback_state(), PlaybackState::Playing);
    assert_eq!(h.ctl.state().pending_seek_target, None);
    assert_eq!(h.pipeline.calls().last(), Some(&Call::Play));
}

#[test]
fn release_inside_the_window_issues_exactly_one_seek() {
    let mut h = abc();
    playing_with_duration(&mut h, 0);

    h.ctl.begin_seek();
    for step in 0..10 {
        h.ctl.update_seek(0.1 * step as f64);
        h.clock.advance(10);
        h.ctl.tick();
    }
    h.ctl.end_seek();

    assert_eq!(h.pipeline.seeks(), vec![90 * SEC]);
}

#[test]
fn release_without_drag_seeks_to_current_position() {
    let mut h = abc();
    playing_with_duration(&mut h, 0);
    h.pipeline.report(42 * SEC, 100 * SEC);

    h.ctl.begin_seek();
    h.ctl.end_seek();

    assert_eq!(h.pipeline.seeks(), vec![42 * SEC]);
}

#[test]
fn seek_from_paused_returns_to_paused() {
    let mut h = abc();
    playing_with_duration(&mut h, 0);
    h.ctl.play_pause_toggle().unwrap();
    h.pipeline.clear();

    assert!(h.ctl.begin_seek());
    h.ctl.update_seek(0.25);
    h.ctl.end_seek();

    assert_eq!(h.pipeline.calls(), vec![Call::Seek(25 * SEC)]);
    assert_eq!(h.ctl.playback_state(), PlaybackState::Paused);
}

#[test]
fn seek_needs_a_playing_or_paused_track() {
    let mut h = abc();
    assert!(!h.ctl.begin_seek());
    h.ctl.update_seek(0.5);
    h.ctl.end_seek();
    assert!(h.pipeline.calls().is_empty());
    assert_eq!(h.ctl.playback_state(), PlaybackState::Stopped);
}

#[test]
fn release_before_duration_is_known_does_not_seek() {
    let mut h = abc();
    h.ctl.select(0).unwrap();
    h.pipeline.clear();

    h.ctl.begin_seek();
    h.ctl.update_seek(0.5);
    h.ctl.end_seek();

    assert!(h.pipeline.seeks().is_empty());
    assert_eq!(h.ctl.playback_state(), PlaybackState::Playing);
}

#[test]
fn poller_is_suspended_while_seeking() {
    let mut h = abc();
    playing_with_duration(&mut h, 0);

    h.ctl.begin_seek();
    h.observer.take();
    h.clock.advance(2_000);
    h.ctl.tick();
    assert!(
        !h.observer
            .take()
            .iter()
            .any(|n| matches!(n, Notification::PositionUpdated { .. }))
    );
}

#[test]
fn error_disables_controls_until_another_track_is_selected() {
    let mut h = abc();
    h.ctl.select(0).unwrap();
    h.pipeline.clear();
    h.observer.take();

    h.ctl
        .handle_pipeline_event(h.pipeline.event(PipelineEvent::Error {
            message: "decode failed".into(),
            detail: "bad header".into(),
        }))
        .unwrap();

    assert_eq!(h.ctl.playback_state(), PlaybackState::Errored);
    assert_eq!(h.pipeline.calls(), vec![Call::Stop]);
    assert!(!h.ctl.controls_enabled());
    assert_eq!(h.ctl.current_index(), Some(0));
    assert_eq!(h.ctl.playlist().len(), 3);

    let seen = h.observer.take();
    assert!(seen.contains(&Notification::Error {
        message: "decode failed".into(),
        detail: "bad header".into(),
        description: "This \"audio/ogg\" file can't be played".into(),
    }));

    h.pipeline.clear();
    assert_eq!(h.ctl.play_pause_toggle().unwrap(), PlaybackState::Errored);
    assert!(h.pipeline.calls().is_empty());

    assert_eq!(h.ctl.select(1).unwrap(), Transition::Started(1));
    assert_eq!(h.ctl.playback_state(), PlaybackState::Playing);
    assert!(h.ctl.controls_enabled());
    assert_eq!(h.ctl.state().last_error, None);
}

#[test]
fn unavailable_track_is_reported_and_leaves_playback_alone() {
    let mut h = harness(&["/a.ogg"], &[("Song A", "/a.ogg"), ("Song B", "/missing.ogg")]);

    h.ctl.select(0).unwrap();
    assert_eq!(h.ctl.playback_state(), PlaybackState::Playing);
    assert_eq!(
        h.pipeline.calls(),
        vec![Call::SetSource("/a.ogg".into()), Call::Play]
    );
    h.pipeline.clear();
    h.observer.take();

    assert_eq!(h.ctl.next().unwrap(), Transition::Unavailable(1));

    assert_eq!(h.observer.take(), vec![Notification::MissingTracks(vec![1])]);
    assert!(h.pipeline.calls().is_empty());
    assert_eq!(h.ctl.playback_state(), PlaybackState::Playing);
    assert_eq!(h.ctl.current_index(), Some(0));
}

#[test]
fn load_reports_missing_tracks_once() {
    let pipeline = RecordingPipeline::default();
    let observer = Arc::new(RecordingObserver::default());
    let mut ctl = Controller::with_clock(
        pipeline,
        SetStore::with(&["/b.ogg"]),
        ManualClock::new(),
        &SessionSettings::default(),
    );
    ctl.add_observer(observer.clone());

    let missing = ctl.load_entries(vec![
        PlaylistEntry::new("A", "/a.ogg"),
        PlaylistEntry::new("B", "/b.ogg"),
        PlaylistEntry::new("C", "/c.ogg"),
    ]);

    assert_eq!(missing, vec![0, 2]);
    let reports: Vec<_> = observer
        .take()
        .into_iter()
        .filter(|n| matches!(n, Notification::MissingTracks(_)))
        .collect();
    assert_eq!(reports, vec![Notification::MissingTracks(vec![0, 2])]);
}

#[test]
fn refresh_picks_up_unmounted_media_without_touching_playback() {
    let mut h = abc();
    h.ctl.select(0).unwrap();
    h.pipeline.clear();

    h.store.forget("/c.ogg");
    assert_eq!(h.ctl.refresh_availability(), vec![2]);
    assert!(!h.ctl.playlist().get(2).unwrap().available);
    assert!(h.pipeline.calls().is_empty());
    assert_eq!(h.ctl.playback_state(), PlaybackState::Playing);
}

#[test]
fn poller_skips_unknown_positions_and_fixes_duration_once() {
    let mut h = abc();
    h.ctl.select(0).unwrap();
    h.observer.take();

    h.clock.advance(500);
    h.ctl.tick();
    assert!(h.observer.take().is_empty());

    h.pipeline.report(SEC, 185 * SEC);
    h.clock.advance(500);
    h.ctl.tick();
    let seen = h.observer.take();
    assert!(seen.contains(&Notification::DurationKnown {
        duration_ns: 185 * SEC,
        label: " 3:05".into(),
    }));
    assert!(seen.contains(&Notification::PositionUpdated {
        position_ns: SEC,
        duration_ns: 185 * SEC,
    }));

    h.pipeline.report(2 * SEC, 999 * SEC);
    h.clock.advance(500);
    h.ctl.tick();
    assert_eq!(
        h.observer.take(),
        vec![Notification::PositionUpdated {
            position_ns: 2 * SEC,
            duration_ns: 185 * SEC,
        }]
    );
    assert_eq!(h.ctl.duration_label(), Some(" 3:05"));
}

#[test]
fn poller_is_quiet_while_paused() {
    let mut h = abc();
    playing_with_duration(&mut h, 0);
    h.ctl.play_pause_toggle().unwrap();
    h.observer.take();

    h.clock.advance(1_500);
    h.ctl.tick();
    assert!(h.observer.take().is_empty());
    assert_eq!(h.ctl.next_deadline(), None);
}

#[test]
fn next_deadline_tracks_poll_and_debounce() {
    let mut h = abc();
    assert_eq!(h.ctl.next_deadline(), None);

    let start = h.clock.now();
    h.ctl.select(0).unwrap();
    assert_eq!(h.ctl.next_deadline(), Some(start + Duration::from_millis(500)));

    h.ctl.begin_seek();
    h.ctl.update_seek(0.3);
    assert_eq!(h.ctl.next_deadline(), Some(start + Duration::from_millis(250)));
}

#[test]
fn stop_resets_and_toggle_restarts_current_track() {
    let mut h = abc();
    h.ctl.select(1).unwrap();
    h.pipeline.clear();

    h.ctl.stop();
    assert_eq!(h.pipeline.calls(), vec![Call::Stop]);
    assert_eq!(h.ctl.playback_state(), PlaybackState::Stopped);
    assert_eq!(h.ctl.current_index(), Some(1));

    h.pipeline.clear();
    h.ctl.play_pause_toggle().unwrap();
    assert_eq!(
        h.pipeline.calls(),
        vec![Call::SetSource("/b.ogg".into()), Call::Play]
    );
}

#[test]
fn removing_the_current_track_stops_and_keeps_index_valid() {
    let mut h = abc();
    h.ctl.select(2).unwrap();
    h.pipeline.clear();
    h.observer.take();

    let removed = h.ctl.remove_track(2).unwrap();
    assert_eq!(removed.locator, "/c.ogg");
    assert_eq!(h.pipeline.calls(), vec![Call::Stop]);
    assert_eq!(h.ctl.playback_state(), PlaybackState::Stopped);
    assert_eq!(h.ctl.current_index(), Some(1));
    assert!(h.observer.take().contains(&Notification::TrackChanged(1)));
    assert_index_invariant(&h);
}

#[test]
fn removing_an_earlier_track_shifts_the_current_index() {
    let mut h = abc();
    h.ctl.select(2).unwrap();
    h.pipeline.clear();
    h.observer.take();

    h.ctl.remove_track(0).unwrap();
    assert_eq!(h.ctl.current_index(), Some(1));
    assert_eq!(h.ctl.playback_state(), PlaybackState::Playing);
    assert!(h.pipeline.calls().is_empty());
    let seen = h.observer.take();
    assert!(seen.contains(&Notification::CurrentIndexMoved(1)));
    assert!(!seen.iter().any(|n| matches!(n, Notification::TrackChanged(_))));
    assert_index_invariant(&h);
}

#[test]
fn removing_every_track_clears_the_selection() {
    let mut h = harness(&["/a.ogg"], &[("A", "/a.ogg")]);
    h.ctl.select(0).unwrap();
    h.ctl.remove_track(0).unwrap();
    assert_eq!(h.ctl.current_index(), None);
    assert!(!h.ctl.previous_enabled());
    assert!(!h.ctl.next_enabled());
    assert_eq!(
        h.ctl.remove_track(0).unwrap_err(),
        JukeboxError::IndexOutOfRange { index: 0, len: 0 }
    );
}

#[test]
fn moving_tracks_keeps_the_current_one_selected() {
    let mut h = abc();
    h.ctl.select(0).unwrap();

    h.ctl.move_track(0, 2).unwrap();
    assert_eq!(h.ctl.current_index(), Some(2));
    assert_eq!(h.ctl.current_track().unwrap().locator, "/a.ogg");

    h.ctl.move_track(1, 0).unwrap();
    assert_eq!(h.ctl.current_index(), Some(2));
    assert_index_invariant(&h);
}

#[test]
fn index_invariant_holds_through_a_mixed_session() {
    let mut h = abc();
    assert_index_invariant(&h);
    h.ctl.select(1).unwrap();
    assert_index_invariant(&h);
    h.ctl.add_track("/d.ogg", None);
    assert_index_invariant(&h);
    h.ctl.remove_track(1).unwrap();
    assert_index_invariant(&h);
    h.ctl.next().unwrap();
    assert_index_invariant(&h);
    h.ctl.remove_track(0).unwrap();
    assert_index_invariant(&h);
    h.ctl.next().unwrap();
    assert_index_invariant(&h);
}

#[test]
fn title_tag_fills_in_untitled_track() {
    let mut h = abc();
    let index = h.ctl.add_track("/a.ogg", None);
    h.ctl.select(index).unwrap();
    h.observer.take();

    h.ctl.on_tag(TagKey::Artist, "Someone".into());
    h.ctl.on_tag(TagKey::Title, "Found Title".into());

    assert_eq!(
        h.ctl.playlist().get(index).unwrap().title.as_deref(),
        Some("Found Title")
    );
    let seen = h.observer.take();
    assert!(seen.contains(&Notification::TitleChanged {
        index,
        title: "Found Title".into(),
    }));
    assert_eq!(h.ctl.state().now_playing.artist.as_deref(), Some("Someone"));
    assert_eq!(h.ctl.playback_state(), PlaybackState::Playing);
}

#[test]
fn title_tag_does_not_replace_existing_title() {
    let mut h = abc();
    h.ctl.select(0).unwrap();
    h.ctl.on_tag(TagKey::Title, "Other".into());
    assert_eq!(h.ctl.playlist().get(0).unwrap().title.as_deref(), Some("A"));
    assert_eq!(h.ctl.state().now_playing.title.as_deref(), Some("Other"));
}

#[test]
fn stream_kind_is_reported_once_per_track() {
    let mut h = abc();
    h.ctl.select(0).unwrap();
    h.observer.take();

    h.ctl.on_stream_kind_known(false);
    h.ctl.on_stream_kind_known(true);
    assert_eq!(
        h.observer.take(),
        vec![Notification::StreamKindKnown { has_video: false }]
    );

    h.ctl.select(1).unwrap();
    assert_eq!(h.ctl.state().has_video, None);
}

#[test]
fn volume_is_clamped_and_passed_through() {
    let mut h = abc();
    h.ctl.set_volume(1.7);
    h.ctl.set_volume(-0.5);
    assert_eq!(h.pipeline.calls(), vec![Call::Volume(1.0), Call::Volume(0.0)]);
    assert_eq!(h.ctl.playback_state(), PlaybackState::Stopped);
}

#[test]
fn close_stops_pipeline_and_timers() {
    let mut h = abc();
    h.ctl.select(0).unwrap();
    h.pipeline.clear();

    h.ctl.close();
    assert_eq!(h.pipeline.calls(), vec![Call::Stop]);
    assert_eq!(h.ctl.playback_state(), PlaybackState::Stopped);
    assert_eq!(h.ctl.next_deadline(), None);
}

#[test]
fn clock_labels_pad_minutes_and_seconds() {
    assert_eq!(format_clock(0), " 0:00");
    assert_eq!(format_clock(59 * SEC + 999_999_999), " 0:59");
    assert_eq!(format_clock(65 * SEC), " 1:05");
    assert_eq!(format_clock(3_600 * SEC), "60:00");
    assert_eq!(format_clock(6_001 * SEC), "100:01");
}

#[test]
fn timer_fires_once_per_interval() {
    let t0 = Instant::now();
    let mut timer = Timer::new(Duration::from_millis(500));
    assert!(!timer.fire_if_due(t0 + Duration::from_secs(10)));

    timer.start(t0);
    assert!(!timer.fire_if_due(t0 + Duration::from_millis(499)));
    assert!(timer.fire_if_due(t0 + Duration::from_millis(500)));
    assert!(!timer.fire_if_due(t0 + Duration::from_millis(600)));
    assert!(timer.fire_if_due(t0 + Duration::from_millis(3_000)));
    assert_eq!(timer.deadline(), Some(t0 + Duration::from_millis(3_500)));

    timer.stop();
    assert_eq!(timer.deadline(), None);
    assert!(!timer.fire_if_due(t0 + Duration::from_secs(60)));
}

#[test]
fn debounce_fires_after_the_input_goes_quiet() {
    let t0 = Instant::now();
    let mut debounce = Debounce::new(Duration::from_millis(250));
    debounce.arm(t0);
    debounce.arm(t0 + Duration::from_millis(200));

    assert!(!debounce.expired(t0 + Duration::from_millis(300)));
    assert!(debounce.expired(t0 + Duration::from_millis(450)));
    assert!(!debounce.expired(t0 + Duration::from_millis(900)));

    debounce.arm(t0);
    debounce.cancel();
    assert!(!debounce.expired(t0 + Duration::from_secs(5)));
}

#[test]
fn poller_drops_samples_without_a_position() {
    let mut poller = PositionPoller::new(Duration::from_millis(500));
    assert_eq!(poller.sample(PositionQuery::default()), None);

    let first = poller
        .sample(PositionQuery {
            ok: true,
            position_ns: 0,
            duration_ns: 60 * SEC,
        })
        .unwrap();
    assert!(first.duration_first_known);
    assert_eq!(poller.duration_label(), Some(" 1:00"));

    poller.reset_track();
    assert_eq!(poller.duration_label(), None);
}
