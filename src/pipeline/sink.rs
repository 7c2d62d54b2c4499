//! Opening media for the rodio worker: decoding a file into a paused `Sink`
//! and reading its tags.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use lofty::{AudioFile, ItemKey, TaggedFileExt};
use rodio::{Decoder, OutputStream, Sink, Source};

use super::types::TagKey;

/// Why a source could not be turned into a sink; becomes a `PipelineEvent::Error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct OpenError {
    pub message: String,
    pub detail: String,
}

/// Create a paused `Sink` for the file at `path`, starting `start_at` into it.
/// Returns the decoder's duration when the format reports one.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    path: &Path,
    start_at: Duration,
    volume: f32,
) -> Result<(Sink, Option<Duration>), OpenError> {
    let file = File::open(path).map_err(|e| OpenError {
        message: format!("Cannot open '{}'", path.display()),
        detail: e.to_string(),
    })?;

    let source = Decoder::new(BufReader::new(file)).map_err(|e| OpenError {
        message: format!("Cannot decode '{}'", path.display()),
        detail: e.to_string(),
    })?;
    let duration = source.total_duration();
    // Fallback seek for decoders that reject `try_seek`.
    let source = source.skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    sink.set_volume(volume);
    sink.append(source);
    sink.pause();
    Ok((sink, duration))
}

/// Title/artist/album tags and the container's duration, if lofty can read them.
pub(super) fn read_tags(path: &Path) -> (Vec<(TagKey, String)>, Option<Duration>) {
    let tagged = match lofty::read_from_path(path) {
        Ok(t) => t,
        Err(e) => {
            log::debug!("No tags for {}: {}", path.display(), e);
            return (Vec::new(), None);
        }
    };

    let duration = Some(tagged.properties().duration()).filter(|d| !d.is_zero());

    let mut tags = Vec::new();
    if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
        let wanted = [
            (ItemKey::TrackTitle, TagKey::Title),
            (ItemKey::TrackArtist, TagKey::Artist),
            (ItemKey::AlbumTitle, TagKey::Album),
        ];
        for (item, key) in wanted {
            if let Some(v) = tag.get_string(&item) {
                let v = v.trim();
                if !v.is_empty() {
                    tags.push((key, v.to_string()));
                }
            }
        }
    }

    (tags, duration)
}
