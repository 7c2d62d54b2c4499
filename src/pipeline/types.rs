//! Events, position snapshots and worker commands shared by the pipeline
//! facade and its rodio implementation.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::library::MediaSource;

/// Metadata keys the session cares about. Anything else is passed through as `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagKey {
    Title,
    Artist,
    Album,
    Other(String),
}

/// Asynchronous reports from the media pipeline. Produced on the pipeline's
/// own thread and handed to the session through the runtime's queue.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    EndOfStream,
    Error { message: String, detail: String },
    Tag { key: TagKey, value: String },
    StreamKindKnown { has_video: bool },
}

/// A `PipelineEvent` stamped with the generation of the `set_source` call
/// it belongs to. The session drops events whose generation is not current.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceEvent {
    pub generation: u64,
    pub event: PipelineEvent,
}

/// Result of a non-blocking position query. `ok` is false until the pipeline
/// knows both values; callers must not read that as position 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PositionQuery {
    pub ok: bool,
    pub position_ns: u64,
    pub duration_ns: u64,
}

#[derive(Debug)]
pub(super) enum PipelineCmd {
    SetSource(MediaSource, u64),
    Play,
    Pause,
    Stop,
    Seek(Duration),
    SetVolume(f32),
    Quit,
}

/// Position/duration as last published by the worker thread.
#[derive(Debug, Clone, Default)]
pub(super) struct PositionInfo {
    pub position: Option<Duration>,
    pub duration: Option<Duration>,
}

impl PositionInfo {
    pub fn query(&self) -> PositionQuery {
        match (self.position, self.duration) {
            (Some(p), Some(d)) => PositionQuery {
                ok: true,
                position_ns: p.as_nanos() as u64,
                duration_ns: d.as_nanos() as u64,
            },
            _ => PositionQuery::default(),
        }
    }
}

pub(super) type PositionHandle = Arc<Mutex<PositionInfo>>;

/// Callback used by the worker to hand events to whoever owns the session.
pub(super) type EventEmitter = Box<dyn Fn(SourceEvent) + Send + 'static>;
