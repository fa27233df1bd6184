//! Threshold-crossing annotation: tick marks where the signal rises past
//! the configured dB cutoff.

use super::slice::{Sample, TimeSlice};
use crate::units::amplitude_to_db;

/// Horizontal half-width of a left-channel tick, in chart-x units (seconds).
pub const LEFT_TICK_HALF_WIDTH: f32 = 0.01;

/// Horizontal half-width of a right-channel tick.
///
/// Deliberately wider than the left channel; both are independent visual
/// tuning constants, not derived values.
pub const RIGHT_TICK_HALF_WIDTH: f32 = 0.1;

/// Recompute a slice's cutoff markers for the given dB cutoff.
///
/// Only upward (below → at-or-above) crossings produce ticks: the overlay
/// flags moments the signal exceeds the cutoff, not general boundary
/// crossings. Replaces any previous marker set; sets `None` when neither
/// channel crosses, so a stale overlay never survives a cutoff change.
pub fn annotate(slice: &mut TimeSlice, cutoff_db: f32) {
    let mut markers = channel_crossings(&slice.left, cutoff_db, LEFT_TICK_HALF_WIDTH);
    markers.extend(channel_crossings(&slice.right, cutoff_db, RIGHT_TICK_HALF_WIDTH));

    slice.cutoff_markers = if markers.is_empty() {
        None
    } else {
        Some(markers)
    };
}

/// Rising-edge detection over one channel's samples.
///
/// The first sample only establishes the initial state, so a signal that is
/// already above the cutoff at the very first sample does not spuriously
/// mark there.
fn channel_crossings(
    samples: &[Sample],
    cutoff_db: f32,
    half_width: f32,
) -> Vec<(Sample, Sample)> {
    let mut crossings = Vec::new();
    let mut prev_below = match samples.first() {
        Some(s) => amplitude_to_db(s.amplitude) < cutoff_db,
        None => return crossings,
    };
    for &cur in &samples[1..] {
        let cur_below = amplitude_to_db(cur.amplitude) < cutoff_db;
        if prev_below && !cur_below {
            // Just passed the cutoff: tick straddling the crossing sample.
            crossings.push((
                Sample::new(cur.time_s - half_width, cur.amplitude),
                Sample::new(cur.time_s + half_width, cur.amplitude),
            ));
        }
        prev_below = cur_below;
    }
    crossings
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A one-chunk slice with the given per-channel amplitudes, one sample
    /// per second.
    fn slice_with(left: &[f32], right: &[f32]) -> TimeSlice {
        let to_samples = |amps: &[f32]| {
            amps.iter()
                .enumerate()
                .map(|(i, &a)| Sample::new(i as f32, a))
                .collect::<Vec<_>>()
        };
        TimeSlice {
            start_ms: 0,
            end_ms: 5000,
            left: to_samples(left),
            right: to_samples(right),
            cutoff_markers: None,
        }
    }

    // -6 dB cutoff sits between 0.25 (~ -12 dB) and 0.9 (~ -0.9 dB).
    const CUTOFF: f32 = -6.0;

    #[test]
    fn test_starts_above_then_dips_and_rises() {
        // Above, above, below, above: exactly one tick at the final rise,
        // none at the start, none at the dip.
        let mut s = slice_with(&[0.9, 0.9, 0.25, 0.9], &[0.0; 4]);
        annotate(&mut s, CUTOFF);
        let markers = s.cutoff_markers.as_ref().unwrap();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].0.time_s, 3.0 - LEFT_TICK_HALF_WIDTH);
        assert_eq!(markers[0].1.time_s, 3.0 + LEFT_TICK_HALF_WIDTH);
    }

    #[test]
    fn test_leading_silence_then_rise() {
        // Below, below, above: one tick at the rise, none for the
        // falling edge that never happens.
        let mut s = slice_with(&[0.1, 0.2, 0.9], &[0.0; 3]);
        annotate(&mut s, CUTOFF);
        let markers = s.cutoff_markers.as_ref().unwrap();
        assert_eq!(markers.len(), 1);
        assert!((markers[0].0.time_s - (2.0 - LEFT_TICK_HALF_WIDTH)).abs() < 1e-6);
    }

    #[test]
    fn test_falling_crossings_not_marked() {
        // Rise once, then fall: the fall produces nothing.
        let mut s = slice_with(&[0.1, 0.9, 0.1, 0.1], &[0.0; 4]);
        annotate(&mut s, CUTOFF);
        assert_eq!(s.cutoff_markers.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_entirely_below_yields_absent() {
        let mut s = slice_with(&[0.1, 0.2, 0.1], &[0.05, 0.1, 0.05]);
        annotate(&mut s, CUTOFF);
        assert!(s.cutoff_markers.is_none());
    }

    #[test]
    fn test_stale_markers_cleared_on_quieter_cutoff() {
        let mut s = slice_with(&[0.1, 0.9], &[0.0; 2]);
        annotate(&mut s, CUTOFF);
        assert!(s.cutoff_markers.is_some());

        // Raise the cutoff above everything: markers become absent, not
        // left as stale data.
        annotate(&mut s, 0.0);
        assert!(s.cutoff_markers.is_none());
    }

    #[test]
    fn test_idempotent_reannotation() {
        let mut s = slice_with(&[0.1, 0.9, 0.1, 0.9], &[0.1, 0.9, 0.1, 0.1]);
        annotate(&mut s, CUTOFF);
        let first = s.cutoff_markers.clone();
        annotate(&mut s, CUTOFF);
        // Replaced, not appended.
        assert_eq!(s.cutoff_markers, first);
    }

    #[test]
    fn test_channel_tick_widths_differ() {
        let mut s = slice_with(&[0.1, 0.9], &[0.1, 0.9]);
        annotate(&mut s, CUTOFF);
        let markers = s.cutoff_markers.as_ref().unwrap();
        assert_eq!(markers.len(), 2);
        let left_width = markers[0].1.time_s - markers[0].0.time_s;
        let right_width = markers[1].1.time_s - markers[1].0.time_s;
        assert!((left_width - 2.0 * LEFT_TICK_HALF_WIDTH).abs() < 1e-6);
        assert!((right_width - 2.0 * RIGHT_TICK_HALF_WIDTH).abs() < 1e-6);
    }

    #[test]
    fn test_silence_is_below_any_cutoff() {
        // amplitude_to_db(0) is -inf, so silence never counts as above.
        let mut s = slice_with(&[0.0, 0.0, 0.0], &[0.0; 3]);
        annotate(&mut s, -120.0);
        assert!(s.cutoff_markers.is_none());
    }
}
