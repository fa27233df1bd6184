//! Decode an audio file to interleaved stereo i16 PCM.
//!
//! Supports WAV, MP3, and MP4 (AAC audio track) via symphonia.

use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::ChartError;

/// Decode a file to interleaved stereo i16 at its native sample rate.
///
/// Mono sources are duplicated into both channels; sources with more than
/// two channels keep the first two. Returns `(pcm, sample_rate)`.
pub fn decode_to_stereo_i16(path: &Path) -> Result<(Vec<i16>, u32), ChartError> {
    let file = std::fs::File::open(path)
        .map_err(|e| ChartError::invalid_audio(path, format!("failed to open: {}", e)))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| ChartError::invalid_audio(path, format!("unsupported format: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| ChartError::invalid_audio(path, "no audio track found"))?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| ChartError::invalid_audio(path, "sample rate missing"))?;
    let channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(1);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| ChartError::invalid_audio(path, format!("unsupported codec: {}", e)))?;

    let mut pcm: Vec<i16> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break
            }
            Err(SymphError::ResetRequired) => break,
            Err(e) => {
                return Err(ChartError::invalid_audio(
                    path,
                    format!("packet read failed: {}", e),
                ))
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let num_frames = decoded.frames();
                let mut sample_buf = SampleBuffer::<i16>::new(num_frames as u64, spec);
                sample_buf.copy_interleaved_ref(decoded);
                let interleaved = sample_buf.samples();

                match channels {
                    1 => {
                        for &s in interleaved {
                            pcm.push(s);
                            pcm.push(s);
                        }
                    }
                    2 => pcm.extend_from_slice(interleaved),
                    n => {
                        for frame in interleaved.chunks_exact(n) {
                            pcm.push(frame[0]);
                            pcm.push(frame[1]);
                        }
                    }
                }
            }
            // Recoverable corruption: skip the packet, keep decoding.
            Err(SymphError::DecodeError(e)) => {
                log::warn!("Ignoring decode error in '{}': {}", path.display(), e);
            }
            Err(e) => {
                return Err(ChartError::invalid_audio(
                    path,
                    format!("fatal decode error: {}", e),
                ))
            }
        }
    }

    if pcm.is_empty() {
        return Err(ChartError::invalid_audio(path, "no samples decoded"));
    }

    log::debug!(
        "Decoded {} stereo frames at {} Hz from '{}'",
        pcm.len() / 2,
        sample_rate,
        path.display()
    );
    Ok((pcm, sample_rate))
}
