//! Playback state and the per-session data the controller owns.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
    /// The user is dragging the position slider.
    Seeking,
    /// The pipeline reported a failure for the current track.
    Errored,
}

impl PlaybackState {
    pub fn label(&self) -> &'static str {
        match self {
            PlaybackState::Stopped => "Stopped",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
            PlaybackState::Seeking => "Seeking",
            PlaybackState::Errored => "Error",
        }
    }
}

/// Last pipeline failure, kept until another track is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineFailure {
    pub message: String,
    pub detail: String,
    /// User-facing text, e.g. `This "audio/ogg" file can't be played`.
    pub description: String,
}

/// Metadata tags received for the current track.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NowPlaying {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    /// Always `None` or a valid playlist index.
    pub current_index: Option<usize>,
    pub playback_state: PlaybackState,
    /// Last known position; meaningful only once `duration_ns` is known.
    pub position_ns: u64,
    /// Fixed for the track once the pipeline reports it.
    pub duration_ns: Option<u64>,
    /// Slider fraction in `[0, 1]` while seeking.
    pub pending_seek_target: Option<f64>,
    /// State to return to when the seek is released.
    pub resume_after_seek: Option<PlaybackState>,
    pub last_error: Option<PipelineFailure>,
    pub now_playing: NowPlaying,
    pub has_video: Option<bool>,
    pub volume: f32,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            current_index: None,
            playback_state: PlaybackState::Stopped,
            position_ns: 0,
            duration_ns: None,
            pending_seek_target: None,
            resume_after_seek: None,
            last_error: None,
            now_playing: NowPlaying::default(),
            has_video: None,
            volume: 1.0,
        }
    }
}

impl SessionState {
    /// Forget everything that belongs to the previous track.
    pub(super) fn reset_track(&mut self) {
        self.position_ns = 0;
        self.duration_ns = None;
        self.pending_seek_target = None;
        self.resume_after_seek = None;
        self.last_error = None;
        self.now_playing = NowPlaying::default();
        self.has_video = None;
    }
}
