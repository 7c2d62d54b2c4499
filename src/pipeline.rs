//! The media pipeline seam.
//!
//! The session drives playback through `PipelineFacade` and hears back via
//! `SourceEvent`s. `RodioPipeline` is the real backend: a worker thread that
//! owns the rodio output stream.

mod player;
mod sink;
mod thread;
mod types;

pub use player::RodioPipeline;
pub use types::{PipelineEvent, PositionQuery, SourceEvent, TagKey};

use crate::library::MediaSource;

/// Operations the session issues to the pipeline. None of them block on
/// media I/O; failures come back later as `PipelineEvent::Error`.
pub trait PipelineFacade {
    /// Load `source` in place of the current one. Position and duration
    /// become unknown until the new source reports them. Every event
    /// produced from here on carries `generation`.
    fn set_source(&mut self, source: &MediaSource, generation: u64);

    /// Start or resume. After `stop()` this restarts the current source
    /// from position 0.
    fn play(&mut self);

    fn pause(&mut self);

    /// Stop and reset the position to 0.
    fn stop(&mut self);

    /// Jump to an absolute position in nanoseconds.
    fn seek(&mut self, position_ns: u64);

    fn query_position(&self) -> PositionQuery;

    fn set_volume(&mut self, volume: f32);
}
