//! Chart data model: time slices, cutoff annotation, view windowing.

pub mod cutoff;
pub mod slice;
pub mod view;

pub use slice::{segment, Sample, TimeSlice, CHUNK_MS, DECIMATION_STRIDE};
pub use view::{ViewState, MAX_ZOOM, MIN_ZOOM};
