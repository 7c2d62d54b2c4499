use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::AudioSettings;
use crate::error::{JukeboxError, Result};
use crate::library::MediaSource;

use super::PipelineFacade;
use super::thread::spawn_pipeline_thread;
use super::types::{
    EventEmitter, PipelineCmd, PositionHandle, PositionInfo, PositionQuery, SourceEvent,
};

/// `PipelineFacade` backed by a rodio worker thread.
///
/// Commands are queued to the worker; nothing here blocks on audio I/O.
/// Events are handed to the emitter from the worker thread.
pub struct RodioPipeline {
    tx: Sender<PipelineCmd>,
    position: PositionHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl RodioPipeline {
    pub fn spawn<F>(audio_settings: AudioSettings, emit: F) -> Result<Self>
    where
        F: Fn(SourceEvent) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<PipelineCmd>();
        let position: PositionHandle = Arc::new(Mutex::new(PositionInfo::default()));
        let emit: EventEmitter = Box::new(emit);

        let handle = spawn_pipeline_thread(rx, position.clone(), emit, audio_settings)
            .map_err(|e| JukeboxError::Pipeline(format!("cannot start audio thread: {e}")))?;

        Ok(Self {
            tx,
            position,
            join: Mutex::new(Some(handle)),
        })
    }

    fn send(&self, cmd: PipelineCmd) {
        if let Err(e) = self.tx.send(cmd) {
            log::warn!("Pipeline worker is gone, dropping {:?}", e.0);
        }
    }

    /// Stop playback and wait for the worker to exit.
    pub fn shutdown(&self) {
        let _ = self.tx.send(PipelineCmd::Quit);

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl Drop for RodioPipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl PipelineFacade for RodioPipeline {
    fn set_source(&mut self, source: &MediaSource, generation: u64) {
        // Forget the old track right away so queries never mix the two.
        if let Ok(mut info) = self.position.lock() {
            *info = PositionInfo::default();
        }
        self.send(PipelineCmd::SetSource(source.clone(), generation));
    }

    fn play(&mut self) {
        self.send(PipelineCmd::Play);
    }

    fn pause(&mut self) {
        self.send(PipelineCmd::Pause);
    }

    fn stop(&mut self) {
        self.send(PipelineCmd::Stop);
    }

    fn seek(&mut self, position_ns: u64) {
        self.send(PipelineCmd::Seek(Duration::from_nanos(position_ns)));
    }

    fn query_position(&self) -> PositionQuery {
        self.position
            .lock()
            .map(|info| info.query())
            .unwrap_or_default()
    }

    fn set_volume(&mut self, volume: f32) {
        self.send(PipelineCmd::SetVolume(volume.clamp(0.0, 1.0)));
    }
}
