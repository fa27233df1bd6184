//! View windowing: power-of-two zoom around the playback position.

/// Lowest zoom level (narrowest window: 100 ms).
pub const MIN_ZOOM: u32 = 1;

/// Highest zoom level (widest window: ~109 minutes).
pub const MAX_ZOOM: u32 = 65536;

/// View state mutated only by the engine loop in response to commands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    /// Power-of-two span multiplier, always in `[MIN_ZOOM, MAX_ZOOM]`.
    pub zoom_level: u32,
    /// Current dB cutoff; `None` until the first SetCutoff arrives.
    pub cutoff_db: Option<f32>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom_level: MIN_ZOOM,
            cutoff_db: None,
        }
    }
}

impl ViewState {
    /// Double the zoom level, saturating at [`MAX_ZOOM`].
    pub fn zoom_in(&mut self) {
        if self.zoom_level < MAX_ZOOM {
            self.zoom_level *= 2;
        }
    }

    /// Halve the zoom level, saturating at [`MIN_ZOOM`].
    pub fn zoom_out(&mut self) {
        if self.zoom_level > MIN_ZOOM {
            self.zoom_level /= 2;
        }
    }

    /// Visible time span in milliseconds at the current zoom.
    ///
    /// Paging moves the transport by exactly this amount, so a page is
    /// always one screen width.
    pub fn span_ms(&self) -> i64 {
        100 * self.zoom_level as i64
    }

    /// Compute the visible window centered on the playback position.
    ///
    /// No clamping to track bounds: windows may extend before zero or past
    /// the end, and the renderer simply has no slice data to draw there.
    pub fn visible_window(&self, playback_ms: i64) -> (i64, i64) {
        let span = self.span_ms();
        let start = playback_ms - span / 2;
        (start, start + span)
    }
}
