//! Waveform segmentation: interleaved PCM → fixed-duration time slices.

use std::path::Path;

use crate::error::ChartError;

/// Duration of one time slice in milliseconds (last slice may be shorter).
pub const CHUNK_MS: u32 = 5000;

/// Fixed frame stride for decimation: every Nth frame is kept, no averaging.
pub const DECIMATION_STRIDE: usize = 128;

/// A single decimated chart point.
///
/// `time_s` is seconds from the start of the whole track, so slices tile a
/// continuous timeline; `amplitude` is normalized to [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub time_s: f32,
    pub amplitude: f32,
}

impl Sample {
    pub fn new(time_s: f32, amplitude: f32) -> Self {
        Self { time_s, amplitude }
    }
}

/// A fixed-duration segment of the track's decimated waveform.
///
/// Immutable after segmentation, except `cutoff_markers` which is replaced
/// wholesale whenever the cutoff changes. `None` means the current cutoff
/// produced no crossings here, a distinct renderable state (skip draw)
/// from a populated overlay.
#[derive(Debug, Clone)]
pub struct TimeSlice {
    pub start_ms: u32,
    pub end_ms: u32,
    /// Decimated left-channel samples, in time order.
    pub left: Vec<Sample>,
    /// Decimated right-channel samples, in time order.
    pub right: Vec<Sample>,
    /// Tick-mark point pairs where the signal rises past the cutoff.
    pub cutoff_markers: Option<Vec<(Sample, Sample)>>,
}

impl TimeSlice {
    /// Number of samples actually populated per channel.
    pub fn vertex_count(&self) -> usize {
        self.left.len()
    }

    /// Slice duration in milliseconds.
    pub fn duration_ms(&self) -> u32 {
        self.end_ms - self.start_ms
    }
}

/// Split an interleaved stereo PCM stream into time slices.
///
/// Walks the track in [`CHUNK_MS`] chunks; within each chunk every
/// [`DECIMATION_STRIDE`]th frame is normalized by 1/32768 and recorded at
/// its track-relative time. Slice ranges partition `[0, duration_ms)` with
/// no gaps or overlaps.
///
/// `path` is only used to attribute errors to the offending file.
pub fn segment(pcm: &[i16], sample_rate: u32, path: &Path) -> Result<Vec<TimeSlice>, ChartError> {
    if sample_rate == 0 {
        return Err(ChartError::invalid_audio(path, "zero sample rate"));
    }
    let total_frames = pcm.len() / 2;
    if total_frames == 0 {
        return Err(ChartError::invalid_audio(path, "no samples decoded"));
    }

    let duration_ms = (total_frames as u64 * 1000 / sample_rate as u64) as u32;
    let mut slices = Vec::with_capacity(duration_ms.div_ceil(CHUNK_MS) as usize);

    let mut cur_ms = 0u32;
    let mut frame_ofs = 0usize;
    while cur_ms < duration_ms {
        let len_ms = CHUNK_MS.min(duration_ms - cur_ms);
        let chunk_frames = (sample_rate as u64 * len_ms as u64 / 1000) as usize;
        let cap = chunk_frames / DECIMATION_STRIDE + 1;

        let mut left = Vec::with_capacity(cap);
        let mut right = Vec::with_capacity(cap);
        let mut i = 0;
        while i < chunk_frames {
            let frame = frame_ofs + i;
            let time_s = (frame as f64 / sample_rate as f64) as f32;
            left.push(Sample::new(time_s, pcm[frame * 2] as f32 / 32768.0));
            right.push(Sample::new(time_s, pcm[frame * 2 + 1] as f32 / 32768.0));
            i += DECIMATION_STRIDE;
        }
        frame_ofs += chunk_frames;

        slices.push(TimeSlice {
            start_ms: cur_ms,
            end_ms: cur_ms + len_ms,
            left,
            right,
            cutoff_markers: None,
        });
        cur_ms += len_ms;
    }

    log::debug!(
        "Segmented {} frames at {} Hz into {} slices ({} ms)",
        total_frames,
        sample_rate,
        slices.len(),
        duration_ms
    );
    Ok(slices)
}
