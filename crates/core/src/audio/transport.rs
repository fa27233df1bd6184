//! Playback transport: decode, play, seek, and report position.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use rodio::{OutputStream, OutputStreamHandle, Sink, Source};

use super::decode::decode_to_stereo_i16;
use crate::error::ChartError;

/// A decoded track handed back from [`AudioTransport::load`].
#[derive(Debug, Clone)]
pub struct DecodedTrack {
    /// Interleaved stereo PCM, shared with the transport.
    pub pcm: Arc<Vec<i16>>,
    pub sample_rate: u32,
}

impl DecodedTrack {
    /// Number of stereo frames.
    pub fn frames(&self) -> usize {
        self.pcm.len() / 2
    }

    /// Track duration in milliseconds.
    pub fn duration_ms(&self) -> i64 {
        (self.frames() as u64 * 1000 / self.sample_rate as u64) as i64
    }
}

/// Playback collaborator consumed by the engine loop.
///
/// The engine only needs decode-to-PCM, start, relative seek, and the
/// current position; output devices and decoding internals stay behind
/// this trait.
pub trait AudioTransport {
    fn load(&mut self, path: &Path) -> Result<DecodedTrack, ChartError>;
    fn start_playback(&mut self);
    fn seek_relative(&mut self, delta_ms: i64);
    fn position_ms(&self) -> i64;
}

/// Transport backed by symphonia decoding and a rodio output sink.
///
/// The playback cursor is wall-clock driven from a play anchor, as in a
/// chart the cursor must advance smoothly even while the device buffers.
/// Must be constructed on the thread that uses it: the output stream is
/// opened lazily and is not `Send`.
pub struct RodioTransport {
    // Lazily opened; None until first playback, or if no device exists.
    output: Option<(OutputStream, OutputStreamHandle)>,
    output_failed: bool,
    sink: Option<Sink>,
    track: Option<DecodedTrack>,
    /// Cursor position in ms while not playing.
    cursor_ms: i64,
    /// `(wall_start, cursor_at_start)` while playing.
    play_anchor: Option<(Instant, i64)>,
}

impl Default for RodioTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl RodioTransport {
    pub fn new() -> Self {
        Self {
            output: None,
            output_failed: false,
            sink: None,
            track: None,
            cursor_ms: 0,
            play_anchor: None,
        }
    }

    fn output_handle(&mut self) -> Option<&OutputStreamHandle> {
        if self.output.is_none() && !self.output_failed {
            match OutputStream::try_default() {
                Ok(pair) => {
                    log::info!("Audio output device opened");
                    self.output = Some(pair);
                }
                Err(e) => {
                    // Chart still runs; the cursor just advances silently.
                    log::error!("Failed to open audio output: {}", e);
                    self.output_failed = true;
                }
            }
        }
        self.output.as_ref().map(|(_, h)| h)
    }

    /// Replace the sink with one playing from `start_ms`.
    fn rebuild_sink(&mut self, start_ms: i64) {
        // Sink::stop() kills a sink for good, so each (re)start gets a
        // fresh one.
        drop(self.sink.take());
        let Some(track) = self.track.clone() else {
            return;
        };
        let Some(handle) = self.output_handle() else {
            return;
        };
        match Sink::try_new(handle) {
            Ok(sink) => {
                let start_frame =
                    (start_ms.max(0) as u64 * track.sample_rate as u64 / 1000) as usize;
                sink.append(StereoPcmSource::new(
                    track.pcm,
                    track.sample_rate,
                    start_frame,
                ));
                sink.play();
                self.sink = Some(sink);
            }
            Err(e) => {
                log::error!("Failed to create audio sink: {}", e);
            }
        }
    }
}

impl AudioTransport for RodioTransport {
    fn load(&mut self, path: &Path) -> Result<DecodedTrack, ChartError> {
        let (pcm, sample_rate) = decode_to_stereo_i16(path)?;
        let track = DecodedTrack {
            pcm: Arc::new(pcm),
            sample_rate,
        };
        log::info!(
            "Loaded '{}': {} frames at {} Hz ({} ms)",
            path.display(),
            track.frames(),
            sample_rate,
            track.duration_ms()
        );
        drop(self.sink.take());
        self.cursor_ms = 0;
        self.play_anchor = None;
        self.track = Some(track.clone());
        Ok(track)
    }

    fn start_playback(&mut self) {
        if self.track.is_none() {
            log::warn!("start_playback with no track loaded");
            return;
        }
        if self.play_anchor.is_some() {
            return;
        }
        let cursor = self.cursor_ms;
        self.rebuild_sink(cursor);
        self.play_anchor = Some((Instant::now(), cursor));
    }

    fn seek_relative(&mut self, delta_ms: i64) {
        let Some(track) = &self.track else {
            return;
        };
        let target = (self.position_ms() + delta_ms).clamp(0, track.duration_ms());
        log::debug!("Seek {:+} ms -> {} ms", delta_ms, target);
        if self.play_anchor.is_some() {
            self.rebuild_sink(target);
            self.play_anchor = Some((Instant::now(), target));
        } else {
            self.cursor_ms = target;
        }
    }

    fn position_ms(&self) -> i64 {
        let pos = match self.play_anchor {
            Some((start, cursor)) => cursor + start.elapsed().as_millis() as i64,
            None => self.cursor_ms,
        };
        match &self.track {
            Some(track) => pos.min(track.duration_ms()),
            None => 0,
        }
    }
}

/// A rodio source over shared interleaved stereo i16 PCM.
struct StereoPcmSource {
    pcm: Arc<Vec<i16>>,
    /// Index into the interleaved buffer (not frames).
    position: usize,
    sample_rate: u32,
}

impl StereoPcmSource {
    fn new(pcm: Arc<Vec<i16>>, sample_rate: u32, start_frame: usize) -> Self {
        let position = (start_frame * 2).min(pcm.len());
        Self {
            pcm,
            position,
            sample_rate,
        }
    }
}

impl Iterator for StereoPcmSource {
    type Item = i16;

    fn next(&mut self) -> Option<i16> {
        let sample = self.pcm.get(self.position).copied()?;
        self.position += 1;
        Some(sample)
    }
}

impl Source for StereoPcmSource {
    fn current_frame_len(&self) -> Option<usize> {
        // Parameters are constant throughout; None keeps rodio's internal
        // batching on its default path.
        None
    }

    fn channels(&self) -> u16 {
        2
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<std::time::Duration> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavSpec, WavWriter};
    use std::path::PathBuf;

    fn fixture_wav(dir: &tempfile::TempDir, seconds: u32) -> PathBuf {
        let path = dir.path().join("tone.wav");
        let spec = WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for i in 0..(8000 * seconds) {
            let v = ((i as f32 * 0.1).sin() * 8000.0) as i16;
            writer.write_sample(v).unwrap();
            writer.write_sample(v / 2).unwrap();
        }
        writer.finalize().unwrap();
        path
    }

    #[test]
    fn test_load_reports_track_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture_wav(&dir, 2);

        let mut transport = RodioTransport::new();
        let track = transport.load(&path).unwrap();
        assert_eq!(track.sample_rate, 8000);
        assert_eq!(track.frames(), 16_000);
        assert_eq!(track.duration_ms(), 2000);
        assert_eq!(transport.position_ms(), 0);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let mut transport = RodioTransport::new();
        let err = transport.load(Path::new("/no/such/track.mp3")).unwrap_err();
        assert!(matches!(err, ChartError::InvalidAudioData { .. }));
    }

    #[test]
    fn test_seek_clamps_to_track_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture_wav(&dir, 2);

        let mut transport = RodioTransport::new();
        transport.load(&path).unwrap();

        transport.seek_relative(-500);
        assert_eq!(transport.position_ms(), 0);

        transport.seek_relative(1500);
        assert_eq!(transport.position_ms(), 1500);

        transport.seek_relative(10_000);
        assert_eq!(transport.position_ms(), 2000);
    }

    #[test]
    fn test_seek_without_track_is_noop() {
        let mut transport = RodioTransport::new();
        transport.seek_relative(1000);
        assert_eq!(transport.position_ms(), 0);
    }

    #[test]
    fn test_source_starts_at_frame() {
        let pcm = Arc::new((0..20).collect::<Vec<i16>>());
        let src = StereoPcmSource::new(pcm, 8000, 3);
        let rest: Vec<i16> = src.collect();
        assert_eq!(rest[0], 6);
        assert_eq!(rest.len(), 14);
    }
}
