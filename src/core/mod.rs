//! Core engine modules - player, compositor, surface, scheduler
//!
//! These modules form the playback engine, independent of any UI or host.

pub mod compositor;
pub mod player;
pub mod scheduler;
pub mod surface;

// Re-exports for convenience
pub use compositor::DrawOptions;
pub use player::{Player, PlayerError, DEFAULT_FPS};
pub use scheduler::{ManualScheduler, ScheduleHandle, Scheduler};
pub use surface::{PixelSurface, Rect, Surface, SurfaceError};
