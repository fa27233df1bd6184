//! The processing loop: a dedicated thread that drains commands, mutates
//! view state, and produces one render pass per iteration.

pub mod command;

pub use command::ChartCommand;

use std::path::Path;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::audio::AudioTransport;
use crate::chart::{cutoff, segment, Sample, TimeSlice, ViewState};
use crate::error::ChartError;
use crate::render::{GeometryHandle, Renderer, SliceGeometry};
use crate::units::reference_grid;

/// Lifecycle of the engine loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No track loaded; track-independent commands still apply.
    Idle,
    /// Slices and geometry ready; rendering each iteration.
    Loaded,
}

#[derive(Debug)]
struct StatusInner {
    state: EngineState,
    zoom_level: u32,
    cutoff_db: Option<f32>,
    slice_count: usize,
    last_error: Option<String>,
}

/// Shared engine status readable from issuing contexts.
///
/// All chart data is owned exclusively by the loop; this snapshot is the
/// only state that crosses back over the thread boundary.
#[derive(Clone)]
pub struct EngineStatus {
    inner: Arc<Mutex<StatusInner>>,
}

impl EngineStatus {
    fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(StatusInner {
                state: EngineState::Idle,
                zoom_level: ViewState::default().zoom_level,
                cutoff_db: None,
                slice_count: 0,
                last_error: None,
            })),
        }
    }

    pub fn state(&self) -> EngineState {
        self.inner.lock().unwrap().state
    }

    pub fn zoom_level(&self) -> u32 {
        self.inner.lock().unwrap().zoom_level
    }

    pub fn cutoff_db(&self) -> Option<f32> {
        self.inner.lock().unwrap().cutoff_db
    }

    pub fn slice_count(&self) -> usize {
        self.inner.lock().unwrap().slice_count
    }

    /// Store an error message from the engine thread.
    pub fn set_error(&self, msg: String) {
        self.inner.lock().unwrap().last_error = Some(msg);
    }

    /// Take the last error, clearing it.
    pub fn take_error(&self) -> Option<String> {
        self.inner.lock().unwrap().last_error.take()
    }

    fn update(&self, state: EngineState, view: &ViewState, slice_count: usize) {
        let mut inner = self.inner.lock().unwrap();
        inner.state = state;
        inner.zoom_level = view.zoom_level;
        inner.cutoff_db = view.cutoff_db;
        inner.slice_count = slice_count;
    }
}

/// Handle to the engine loop thread.
///
/// Send commands via [`send`](Self::send); read observable state from
/// `status`. Shutdown is cooperative: [`shutdown`](Self::shutdown) (or
/// drop) sends Quit and joins the thread.
pub struct ChartEngine {
    command_tx: mpsc::Sender<ChartCommand>,
    pub status: EngineStatus,
    thread: Option<JoinHandle<()>>,
}

impl ChartEngine {
    /// Spawn the engine thread.
    ///
    /// The transport is built by `make_transport` on the engine thread
    /// itself, since audio output streams generally are not `Send`.
    pub fn spawn<T, R, F>(make_transport: F, renderer: R) -> Self
    where
        T: AudioTransport,
        R: Renderer + Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let status = EngineStatus::new();

        let thread_status = status.clone();
        let thread = std::thread::Builder::new()
            .name("chart-engine".into())
            .spawn(move || {
                engine_thread(rx, make_transport(), renderer, thread_status);
            })
            .expect("Failed to spawn chart engine thread");

        Self {
            command_tx: tx,
            status,
            thread: Some(thread),
        }
    }

    /// Enqueue a command. Never blocks the caller.
    pub fn send(&self, cmd: ChartCommand) {
        if self.command_tx.send(cmd).is_err() {
            log::error!("Engine thread is not running (channel closed)");
            self.status
                .set_error("Engine thread stopped unexpectedly".into());
        }
    }

    /// Send Quit and wait for the loop to exit.
    pub fn shutdown(mut self) {
        self.send(ChartCommand::Quit);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ChartEngine {
    fn drop(&mut self) {
        if let Some(handle) = self.thread.take() {
            let _ = self.command_tx.send(ChartCommand::Quit);
            let _ = handle.join();
        }
    }
}

/// Loop-owned state: everything here is touched only by the engine thread.
struct EngineLoop<T, R> {
    transport: T,
    renderer: R,
    status: EngineStatus,
    state: EngineState,
    view: ViewState,
    slices: Vec<TimeSlice>,
    /// Side table: slice index → uploaded geometry, kept out of TimeSlice.
    geometry: Vec<SliceGeometry>,
    grid: Option<GeometryHandle>,
}

impl<T: AudioTransport, R: Renderer> EngineLoop<T, R> {
    /// Apply one command. Returns false when the loop should exit.
    fn apply(&mut self, cmd: ChartCommand) -> bool {
        log::debug!("Engine received: {:?}", cmd);
        match cmd {
            ChartCommand::Quit => return false,
            ChartCommand::Load(path) => {
                if let Err(e) = self.load(&path) {
                    // Previous track (or none) stays in place.
                    log::error!("Load failed: {}", e);
                    self.status.set_error(e.to_string());
                }
            }
            ChartCommand::Play => {
                if self.state == EngineState::Loaded {
                    self.transport.start_playback();
                } else {
                    log::debug!("Play ignored: no track loaded");
                }
            }
            ChartCommand::ZoomIn => self.view.zoom_in(),
            ChartCommand::ZoomOut => self.view.zoom_out(),
            ChartCommand::PageForward => self.page(1),
            ChartCommand::PageBackward => self.page(-1),
            ChartCommand::SetCutoff(db) => {
                // Stored even in Idle; annotation waits for a track.
                self.view.cutoff_db = Some(db);
                if self.state == EngineState::Loaded {
                    self.reannotate(db);
                }
            }
        }
        self.status.update(self.state, &self.view, self.slices.len());
        true
    }

    /// Page by one screen width in the given direction.
    fn page(&mut self, direction: i64) {
        if self.state == EngineState::Loaded {
            self.transport.seek_relative(direction * self.view.span_ms());
        } else {
            log::debug!("Page ignored: no track loaded");
        }
    }

    /// Load a track: decode, segment, upload geometry, annotate.
    ///
    /// On failure nothing is replaced. On success all previous slices and
    /// geometry are dropped together.
    fn load(&mut self, path: &Path) -> Result<(), ChartError> {
        let track = self.transport.load(path)?;
        let slices = segment(&track.pcm, track.sample_rate, path)?;
        log::info!("Loaded {} slices from '{}'", slices.len(), path.display());

        let duration_s = slices.last().map(|s| s.end_ms as f32 / 1000.0).unwrap_or(0.0);
        self.grid = self.upload_pairs("reference grid", &reference_grid(duration_s));

        self.geometry = slices
            .iter()
            .enumerate()
            .map(|(i, slice)| SliceGeometry {
                slice_index: i,
                start_ms: slice.start_ms,
                end_ms: slice.end_ms,
                left: self.upload_points(&format!("slice {} left", i), &slice.left),
                right: self.upload_points(&format!("slice {} right", i), &slice.right),
                markers: None,
            })
            .collect();

        self.slices = slices;
        self.state = EngineState::Loaded;

        if let Some(db) = self.view.cutoff_db {
            self.reannotate(db);
        }
        Ok(())
    }

    /// Recompute cutoff markers on every slice and re-upload them wholesale.
    fn reannotate(&mut self, db: f32) {
        for slice in &mut self.slices {
            cutoff::annotate(slice, db);
        }
        for (slice, geo) in self.slices.iter().zip(self.geometry.iter_mut()) {
            geo.markers = match &slice.cutoff_markers {
                Some(pairs) => {
                    let points: Vec<Sample> =
                        pairs.iter().flat_map(|&(a, b)| [a, b]).collect();
                    match self.renderer.upload_static(&points) {
                        Ok(handle) => Some(handle),
                        Err(e) => {
                            log::error!("Marker upload failed: {}", e);
                            None
                        }
                    }
                }
                None => None,
            };
        }
        let marked = self.geometry.iter().filter(|g| g.markers.is_some()).count();
        log::debug!("Cutoff {} dB: markers in {}/{} slices", db, marked, self.geometry.len());
    }

    fn upload_points(&mut self, what: &str, points: &[Sample]) -> Option<GeometryHandle> {
        match self.renderer.upload_static(points) {
            Ok(handle) => Some(handle),
            Err(e) => {
                // No drawable geometry for this part; skipped at render time.
                log::error!("Upload of {} failed: {}", what, e);
                self.status.set_error(e.to_string());
                None
            }
        }
    }

    fn upload_pairs(&mut self, what: &str, pairs: &[(Sample, Sample)]) -> Option<GeometryHandle> {
        let points: Vec<Sample> = pairs.iter().flat_map(|&(a, b)| [a, b]).collect();
        self.upload_points(what, &points)
    }

    /// One window/draw pass.
    fn render_pass(&mut self) {
        if self.state != EngineState::Loaded {
            return;
        }
        let playback_ms = self.transport.position_ms();
        let (start_ms, end_ms) = self.view.visible_window(playback_ms);
        self.renderer
            .draw_window(start_ms, end_ms, playback_ms, self.grid, &self.geometry);
        self.renderer.present();
    }
}

fn engine_thread<T: AudioTransport, R: Renderer>(
    rx: mpsc::Receiver<ChartCommand>,
    transport: T,
    renderer: R,
    status: EngineStatus,
) {
    let mut engine = EngineLoop {
        transport,
        renderer,
        status,
        state: EngineState::Idle,
        view: ViewState::default(),
        slices: Vec::new(),
        geometry: Vec::new(),
        grid: None,
    };

    log::info!("Chart engine entering main loop");
    'outer: loop {
        // Wait briefly for a command, then drain the burst so queued input
        // never lags behind the render cadence.
        match rx.recv_timeout(Duration::from_millis(10)) {
            Ok(cmd) => {
                // Quit exits immediately: commands behind it stay undrained
                // and no further render pass runs.
                if !engine.apply(cmd) {
                    break 'outer;
                }
                while let Ok(cmd) = rx.try_recv() {
                    if !engine.apply(cmd) {
                        break 'outer;
                    }
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }

        engine.render_pass();
    }
    log::info!("Chart engine loop finished");
}
