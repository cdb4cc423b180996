//! Playback engine with wall-clock paced frame advancement.
//!
//! **Why**: Host schedulers tick at their own cadence (often faster than
//! the target frame rate, e.g. high-refresh displays). The engine
//! accumulates real elapsed time and only advances the displayed frame
//! once the accumulator exceeds the per-frame budget (`1000/fps` ms),
//! giving frame-rate-independent playback smoothness. The frame rate is a
//! pacing target, not a deadline - a missed budget just delays the next
//! advance.
//!
//! **Used by**: Headless runner; any host that owns a [`Surface`] and a
//! [`Scheduler`].
//!
//! # State machine
//!
//! `Idle -> Playing -> Idle`. There is no Paused state: `stop()` discards
//! the cursor, timers and resolved sequence, so resuming restarts from
//! frame 0. The pending schedule handle is cancelled synchronously inside
//! `stop()` and never outlives it.
//!
//! # Tick loop
//!
//! The self-rescheduling callback loop is an explicit state machine: each
//! tick optionally redraws, then asks the scheduler for a new handle and
//! stores it. Ticks run strictly in timestamp order on one thread; a tick
//! completes (including its redraw) before the next is scheduled.

use log::{debug, info, warn};

use crate::core::compositor::{self, DrawOptions};
use crate::core::scheduler::{ScheduleHandle, Scheduler};
use crate::core::surface::Surface;
use crate::entities::frame::SpriteFrame;
use crate::entities::image::ResolvedFrame;
use crate::entities::store::{self, AssetResolver};

pub const DEFAULT_FPS: f32 = 24.0;

/// Playback errors surfaced synchronously to callers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerError {
    /// `play()` with zero resolved frames. Rejected up front: an empty
    /// sequence would divide by zero in the cursor wrap and budget math.
    EmptySequencePlay,
    /// Frame rate must be positive and finite, or the pacing threshold
    /// degenerates and redraw becomes unbounded.
    InvalidFrameRate(f32),
}

impl std::fmt::Display for PlayerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerError::EmptySequencePlay => write!(f, "Cannot play an empty frame sequence"),
            PlayerError::InvalidFrameRate(fps) => write!(f, "Invalid frame rate: {}", fps),
        }
    }
}

impl std::error::Error for PlayerError {}

/// Playback state machine over a resolved frame sequence.
pub struct Player {
    frames: Vec<ResolvedFrame>,
    cursor: usize,
    /// Elapsed milliseconds accumulated toward the next frame advance.
    ticks_ms: f64,
    fps: f32,
    global_scale: f32,
    is_playing: bool,
    last_ms: Option<f64>,
    handle: Option<ScheduleHandle>,
    displayed: Option<usize>,
    options: DrawOptions,
}

impl Player {
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            cursor: 0,
            ticks_ms: 0.0,
            fps: DEFAULT_FPS,
            global_scale: 1.0,
            is_playing: false,
            last_ms: None,
            handle: None,
            displayed: None,
            options: DrawOptions::default(),
        }
    }

    /// Load a sequence: stop any active playback, then resolve descriptors
    /// through the frame store.
    ///
    /// Resolution is front-loaded and completes before this returns, so a
    /// following `play()` never races decode work.
    pub fn init_frames(
        &mut self,
        resolver: &dyn AssetResolver,
        descriptors: &[SpriteFrame],
        scheduler: &mut dyn Scheduler,
    ) {
        self.stop(scheduler);
        self.frames = store::resolve(resolver, descriptors);
        info!("Sequence loaded: {} frames", self.frames.len());
    }

    /// Start playback. Re-entrant: a second `play()` while already Playing
    /// is ignored and never double-schedules.
    pub fn play(&mut self, scheduler: &mut dyn Scheduler) -> Result<(), PlayerError> {
        if self.is_playing {
            debug!("play() while already playing, ignored");
            return Ok(());
        }
        if self.frames.is_empty() {
            return Err(PlayerError::EmptySequencePlay);
        }

        self.is_playing = true;
        self.handle = Some(scheduler.schedule());
        debug!(
            "Playback started: {} frames at {} fps",
            self.frames.len(),
            self.fps
        );
        Ok(())
    }

    /// One scheduler callback.
    ///
    /// Accumulates the delta since the previous tick (the first tick sees
    /// zero elapsed, never a spurious startup delta). When the accumulator
    /// exceeds the frame budget, erases and redraws the surface with the
    /// frame at the pre-advance cursor, then wraps the cursor. Always
    /// reschedules before returning while Playing.
    pub fn tick(&mut self, now_ms: f64, surface: &mut dyn Surface, scheduler: &mut dyn Scheduler) {
        if !self.is_playing {
            // Stale callback delivered after stop(); nothing may draw
            return;
        }

        let last = self.last_ms.unwrap_or(now_ms);
        let elapsed = now_ms - last;
        self.ticks_ms += elapsed;

        if self.ticks_ms > 1000.0 / self.fps as f64 {
            let index = self.cursor;
            self.cursor = (self.cursor + 1) % self.frames.len();

            surface.clear_all();
            match compositor::draw(surface, &self.frames[index], self.global_scale, self.options) {
                Ok(()) => self.displayed = Some(index),
                Err(e) => {
                    // Aborts this redraw only; the loop keeps running
                    warn!("Redraw of frame {} failed: {}", index, e);
                }
            }
            self.ticks_ms = 0.0;
        }

        self.handle = Some(scheduler.schedule());
        self.last_ms = Some(now_ms);
    }

    /// Stop playback and reset to Idle. Idempotent.
    ///
    /// Cancels the pending callback synchronously - no draw happens after
    /// this returns - and drops the handle so it cannot be reused. The
    /// resolved sequence, cursor and timers are cleared; resuming requires
    /// `init_frames` + `play` and restarts from frame 0.
    pub fn stop(&mut self, scheduler: &mut dyn Scheduler) {
        if let Some(handle) = self.handle.take() {
            scheduler.cancel(handle);
        }
        if self.is_playing {
            debug!("Playback stopped at frame {}", self.cursor);
        }
        self.is_playing = false;
        self.frames.clear();
        self.cursor = 0;
        self.ticks_ms = 0.0;
        self.last_ms = None;
        self.displayed = None;
    }

    /// Set the playback frame rate. Rejected at configuration time when
    /// non-positive or non-finite.
    pub fn set_fps(&mut self, fps: f32) -> Result<(), PlayerError> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(PlayerError::InvalidFrameRate(fps));
        }
        self.fps = fps;
        Ok(())
    }

    pub fn set_global_scale(&mut self, scale: f32) {
        self.global_scale = scale;
    }

    pub fn set_draw_options(&mut self, options: DrawOptions) {
        self.options = options;
    }

    /// Index of the frame currently visible on the surface, if any.
    pub fn displayed_frame(&self) -> Option<usize> {
        self.displayed
    }

    /// The frame the next advance will display, wrapped modulo sequence
    /// length.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[ResolvedFrame] {
        &self.frames
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn global_scale(&self) -> f32 {
        self.global_scale
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}
