//! wavestrip-core: waveform strip chart engine.
//!
//! Turns decoded PCM into time-indexed chart geometry: fixed-duration
//! slices of decimated samples, dB cutoff-crossing tick marks, and a
//! zoomable window centered on the playback position, all driven by a
//! command queue into a dedicated processing thread.

pub mod audio;
pub mod chart;
pub mod engine;
pub mod error;
pub mod render;
pub mod units;

pub use chart::{Sample, TimeSlice, ViewState};
pub use engine::{ChartCommand, ChartEngine, EngineState};
pub use error::ChartError;
