//! Terminal strip-chart renderer: the visible window as one redrawn row
//! of block-glyph columns.

use std::collections::HashMap;
use std::io::Write;

use wavestrip_core::chart::Sample;
use wavestrip_core::error::ChartError;
use wavestrip_core::render::{GeometryHandle, Renderer, SliceGeometry};

/// Column glyphs by peak amplitude, silence to full scale.
const GLYPHS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Cutoff-crossing tick column.
const MARKER_GLYPH: char = '▲';

/// Playback cursor column (always the window center).
const CURSOR_GLYPH: char = '┃';

/// A [`Renderer`] that draws into a fixed-width terminal row.
///
/// Uploaded geometry is retained behind handles; each draw composites the
/// peak amplitude of every in-window point per column, the way a pixel
/// column composites multiple waveform buckets.
pub struct TermRenderer {
    width: usize,
    next_handle: u64,
    geometry: HashMap<GeometryHandle, Vec<Sample>>,
    frame: String,
    last_frame: String,
}

impl TermRenderer {
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(10),
            next_handle: 0,
            geometry: HashMap::new(),
            frame: String::new(),
            last_frame: String::new(),
        }
    }

    #[cfg(test)]
    fn frame(&self) -> &str {
        &self.frame
    }
}

impl Renderer for TermRenderer {
    fn upload_static(&mut self, points: &[Sample]) -> Result<GeometryHandle, ChartError> {
        self.next_handle += 1;
        let handle = GeometryHandle(self.next_handle);
        self.geometry.insert(handle, points.to_vec());
        Ok(handle)
    }

    fn draw_window(
        &mut self,
        start_ms: i64,
        end_ms: i64,
        playback_ms: i64,
        _grid: Option<GeometryHandle>,
        slices: &[SliceGeometry],
    ) {
        let width = self.width;
        let start_s = start_ms as f32 / 1000.0;
        let end_s = end_ms as f32 / 1000.0;
        let span_s = (end_s - start_s).max(f32::EPSILON);
        let col = move |time_s: f32| -> Option<usize> {
            if time_s < start_s || time_s >= end_s {
                return None;
            }
            let c = ((time_s - start_s) / span_s * width as f32) as usize;
            (c < width).then_some(c)
        };

        let mut peaks = vec![0.0f32; width];
        let mut marks = vec![false; width];

        for geo in slices {
            // Out-of-window slices (and parts whose upload failed) are
            // simply not drawn.
            if (geo.end_ms as i64) <= start_ms || (geo.start_ms as i64) >= end_ms {
                continue;
            }
            for handle in [geo.left, geo.right].into_iter().flatten() {
                if let Some(points) = self.geometry.get(&handle) {
                    for p in points {
                        if let Some(c) = col(p.time_s) {
                            peaks[c] = peaks[c].max(p.amplitude.abs());
                        }
                    }
                }
            }
            if let Some(points) = geo.markers.and_then(|h| self.geometry.get(&h)) {
                for p in points {
                    if let Some(c) = col(p.time_s) {
                        marks[c] = true;
                    }
                }
            }
        }

        let cursor_col = col(playback_ms as f32 / 1000.0);
        let mut row = String::with_capacity(width + 16);
        for c in 0..width {
            if Some(c) == cursor_col {
                row.push(CURSOR_GLYPH);
            } else if marks[c] {
                row.push(MARKER_GLYPH);
            } else {
                let level = (peaks[c].clamp(0.0, 1.0) * (GLYPHS.len() - 1) as f32).round();
                row.push(GLYPHS[level as usize]);
            }
        }
        self.frame = format!("{} {:7.1}s", row, playback_ms as f32 / 1000.0);
    }

    fn present(&mut self) {
        // Redraw in place, and only when something changed.
        if self.frame != self.last_frame {
            print!("\r{}", self.frame);
            let _ = std::io::stdout().flush();
            self.last_frame = self.frame.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geo(
        renderer: &mut TermRenderer,
        start_ms: u32,
        end_ms: u32,
        left: &[Sample],
        markers: Option<&[Sample]>,
    ) -> SliceGeometry {
        SliceGeometry {
            slice_index: 0,
            start_ms,
            end_ms,
            left: Some(renderer.upload_static(left).unwrap()),
            right: None,
            markers: markers.map(|m| renderer.upload_static(m).unwrap()),
        }
    }

    #[test]
    fn test_cursor_sits_at_window_center() {
        let mut r = TermRenderer::new(40);
        let g = geo(&mut r, 0, 5000, &[Sample::new(1.0, 0.5)], None);
        r.draw_window(950, 1050, 1000, None, &[g]);
        let row: Vec<char> = r.frame().chars().collect();
        assert_eq!(row[20], CURSOR_GLYPH);
    }

    #[test]
    fn test_loud_point_raises_its_column() {
        let mut r = TermRenderer::new(40);
        // Point at 0.2s inside a (0, 1000) ms window -> column 8.
        let g = geo(&mut r, 0, 5000, &[Sample::new(0.2, 1.0)], None);
        r.draw_window(0, 1000, 900, None, &[g]);
        let row: Vec<char> = r.frame().chars().collect();
        assert_eq!(row[8], '█');
        assert_eq!(row[9], ' ');
    }

    #[test]
    fn test_marker_overrides_waveform() {
        let mut r = TermRenderer::new(40);
        let g = geo(
            &mut r,
            0,
            5000,
            &[Sample::new(0.2, 1.0)],
            Some(&[Sample::new(0.2, 1.0)]),
        );
        r.draw_window(0, 1000, 900, None, &[g]);
        let row: Vec<char> = r.frame().chars().collect();
        assert_eq!(row[8], MARKER_GLYPH);
    }

    #[test]
    fn test_out_of_window_slice_is_skipped() {
        let mut r = TermRenderer::new(40);
        let g = geo(&mut r, 10_000, 15_000, &[Sample::new(12.0, 1.0)], None);
        r.draw_window(0, 1000, 500, None, &[g]);
        assert!(!r.frame().contains('█'));
    }

    #[test]
    fn test_window_before_track_start_draws_blank_left() {
        let mut r = TermRenderer::new(40);
        let g = geo(&mut r, 0, 5000, &[Sample::new(0.1, 1.0)], None);
        // Window (-500, 500): track data only lands in the right half.
        r.draw_window(-500, 500, 0, None, &[g]);
        let row: Vec<char> = r.frame().chars().collect();
        let filled = row.iter().position(|&c| c == '█').unwrap();
        assert!(filled > 20, "filled at {}", filled);
    }
}
