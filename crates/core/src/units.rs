//! Amplitude/decibel conversion and the static dB reference grid.

use crate::chart::Sample;

/// Fixed dB levels at which horizontal guide lines are drawn.
pub const REFERENCE_LEVELS_DB: [f32; 9] = [-0.1, -0.5, -1.0, -2.0, -3.0, -5.0, -10.0, -15.0, -20.0];

/// Convert a normalized amplitude in [-1, 1] to decibels.
///
/// Returns `f32::NEG_INFINITY` for zero, since log of zero is undefined
/// and the signal is silent.
pub fn amplitude_to_db(v: f32) -> f32 {
    if v == 0.0 {
        return f32::NEG_INFINITY;
    }
    20.0 * v.abs().log10()
}

/// Convert decibels back to a normalized amplitude.
///
/// Inverse of [`amplitude_to_db`] for positive amplitudes.
pub fn db_to_amplitude(db: f32) -> f32 {
    10.0f32.powf(db / 20.0)
}

/// Build horizontal guide-line segments for every reference level.
///
/// Each level produces two segments spanning `[0, duration_s]`, one at
/// `+amplitude` and one at `-amplitude`, matching the mirrored waveform.
/// Uploaded once after load as static background geometry.
pub fn reference_grid(duration_s: f32) -> Vec<(Sample, Sample)> {
    let mut segments = Vec::with_capacity(REFERENCE_LEVELS_DB.len() * 2);
    for &db in &REFERENCE_LEVELS_DB {
        let amp = db_to_amplitude(db);
        segments.push((Sample::new(0.0, amp), Sample::new(duration_s, amp)));
        segments.push((Sample::new(0.0, -amp), Sample::new(duration_s, -amp)));
    }
    segments
}
