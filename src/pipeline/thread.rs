use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};

use crate::config::AudioSettings;
use crate::library::MediaSource;

use super::sink::{OpenError, create_sink_at, read_tags};
use super::types::{
    EventEmitter, PipelineCmd, PipelineEvent, PositionHandle, PositionInfo, SourceEvent,
};

/// State owned by the worker thread. Only this thread touches rodio.
struct Worker {
    stream: Option<OutputStream>,
    emit: EventEmitter,
    /// Stamped on every event; set by the latest `SetSource`.
    generation: u64,
    position: PositionHandle,
    source: Option<PathBuf>,
    sink: Option<Sink>,
    duration: Option<Duration>,
    /// Start offset of a sink rebuilt by the fallback seek.
    offset: Duration,
    playing: bool,
    eos_sent: bool,
    volume: f32,
}

pub(super) fn spawn_pipeline_thread(
    rx: Receiver<PipelineCmd>,
    position: PositionHandle,
    emit: EventEmitter,
    audio_settings: AudioSettings,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new().name("jukebox-audio".into()).spawn(move || {
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(mut stream) => {
                // rodio logs to stderr when OutputStream is dropped.
                stream.log_on_drop(false);
                Some(stream)
            }
            Err(e) => {
                log::error!("No audio output device: {}", e);
                None
            }
        };

        let mut worker = Worker {
            stream,
            emit,
            generation: 0,
            position,
            source: None,
            sink: None,
            duration: None,
            offset: Duration::ZERO,
            playing: false,
            eos_sent: false,
            volume: audio_settings.volume,
        };

        let poll = Duration::from_millis(audio_settings.event_poll_ms.max(1));
        loop {
            match rx.recv_timeout(poll) {
                Ok(PipelineCmd::Quit) => {
                    worker.stop();
                    break;
                }
                Ok(cmd) => worker.handle(cmd),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            worker.publish();
        }
    })
}

impl Worker {
    fn handle(&mut self, cmd: PipelineCmd) {
        match cmd {
            PipelineCmd::SetSource(source, generation) => self.set_source(source, generation),
            PipelineCmd::Play => self.play(),
            PipelineCmd::Pause => {
                if let Some(s) = self.sink.as_ref() {
                    s.pause();
                }
                self.playing = false;
            }
            PipelineCmd::Stop => self.stop(),
            PipelineCmd::Seek(target) => self.seek(target),
            PipelineCmd::SetVolume(v) => {
                self.volume = v;
                if let Some(s) = self.sink.as_ref() {
                    s.set_volume(v);
                }
            }
            PipelineCmd::Quit => self.stop(),
        }
    }

    fn set_source(&mut self, source: MediaSource, generation: u64) {
        self.stop();
        self.generation = generation;
        self.source = None;
        self.duration = None;

        let path = match source {
            MediaSource::File(path) => path,
            MediaSource::Url(url) => {
                self.fail(OpenError {
                    message: "Unsupported source".to_string(),
                    detail: format!("remote streams are not supported: {}", url),
                });
                return;
            }
        };

        let (tags, tag_duration) = read_tags(&path);
        self.source = Some(path);
        if !self.open_at(Duration::ZERO) {
            return;
        }
        if self.duration.is_none() {
            self.duration = tag_duration;
        }

        for (key, value) in tags {
            self.send(PipelineEvent::Tag { key, value });
        }
        self.send(PipelineEvent::StreamKindKnown { has_video: false });
    }

    /// Build a paused sink for the current source. Emits an error event and
    /// returns false when that is not possible.
    fn open_at(&mut self, start_at: Duration) -> bool {
        let Some(path) = self.source.clone() else {
            return false;
        };
        let Some(stream) = self.stream.as_ref() else {
            self.fail(OpenError {
                message: "No audio output device".to_string(),
                detail: format!("cannot play {}", path.display()),
            });
            return false;
        };

        match create_sink_at(stream, &path, start_at, self.volume) {
            Ok((sink, duration)) => {
                log::debug!("Opened {} at {:?}", path.display(), start_at);
                self.sink = Some(sink);
                self.offset = start_at;
                if duration.is_some() {
                    self.duration = duration;
                }
                self.eos_sent = false;
                true
            }
            Err(e) => {
                self.source = None;
                self.fail(e);
                false
            }
        }
    }

    fn play(&mut self) {
        // After a stop the sink is gone; start the same source over.
        if self.sink.is_none() && !self.open_at(Duration::ZERO) {
            return;
        }
        if let Some(s) = self.sink.as_ref() {
            s.play();
            self.playing = true;
        }
    }

    fn stop(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        self.playing = false;
        self.eos_sent = false;
    }

    fn seek(&mut self, target: Duration) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        match sink.try_seek(target) {
            Ok(()) => {
                self.offset = Duration::ZERO;
                self.eos_sent = false;
            }
            Err(e) => {
                log::debug!("Seek to {:?} rejected ({}), reopening source", target, e);
                let was_playing = self.playing;
                self.stop();
                if self.open_at(target) && was_playing {
                    self.play();
                }
            }
        }
    }

    fn fail(&mut self, err: OpenError) {
        log::warn!("{}: {}", err.message, err.detail);
        self.send(PipelineEvent::Error {
            message: err.message,
            detail: err.detail,
        });
    }

    fn send(&self, event: PipelineEvent) {
        (self.emit)(SourceEvent {
            generation: self.generation,
            event,
        });
    }

    /// Share position with the facade handle and report end-of-stream once.
    fn publish(&mut self) {
        let position = self.sink.as_ref().map(|s| self.offset + s.get_pos());
        if let Ok(mut info) = self.position.lock() {
            *info = PositionInfo {
                position: position.or(self.source.as_ref().map(|_| Duration::ZERO)),
                duration: self.duration,
            };
        }

        if let Some(s) = self.sink.as_ref() {
            if self.playing && !self.eos_sent && s.empty() {
                self.eos_sent = true;
                self.playing = false;
                self.send(PipelineEvent::EndOfStream);
            }
        }
    }
}
