//! Renderer boundary: geometry upload and windowed drawing.
//!
//! The chart data model stays renderer-agnostic: uploaded geometry is
//! tracked in a side table of [`SliceGeometry`] entries rather than inside
//! [`TimeSlice`](crate::chart::TimeSlice) itself.

use crate::chart::Sample;
use crate::error::ChartError;

/// Opaque identifier for uploaded geometry, issued by the renderer.
///
/// The renderer owns the resource lifetime behind a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryHandle(pub u64);

/// Side-table entry mapping one slice to its uploaded geometry.
///
/// Rebuilt wholesale on load; `markers` alone is rebuilt when the cutoff
/// changes. A `None` channel means its upload failed and that part is
/// skipped at draw time.
#[derive(Debug, Clone)]
pub struct SliceGeometry {
    pub slice_index: usize,
    pub start_ms: u32,
    pub end_ms: u32,
    pub left: Option<GeometryHandle>,
    pub right: Option<GeometryHandle>,
    /// Absent when the current cutoff produced no crossings in this slice.
    pub markers: Option<GeometryHandle>,
}

/// Drawing backend consumed by the engine loop.
///
/// Implementations decide what to do with out-of-range windows; the engine
/// passes every slice's geometry each pass and the renderer draws only what
/// intersects the window.
pub trait Renderer {
    /// Upload a static point sequence, returning a handle to it.
    fn upload_static(&mut self, points: &[Sample]) -> Result<GeometryHandle, ChartError>;

    /// Draw one frame of the visible window.
    fn draw_window(
        &mut self,
        start_ms: i64,
        end_ms: i64,
        playback_ms: i64,
        grid: Option<GeometryHandle>,
        slices: &[SliceGeometry],
    );

    /// Present the completed frame.
    fn present(&mut self);
}
