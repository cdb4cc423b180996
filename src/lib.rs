//! SPRITEPLAY - Sprite-sheet animation playback core
//!
//! Loads individual images or spritesheet-derived frames, assembles them
//! into an ordered sequence and plays them back on a drawing surface at a
//! configurable frame rate, applying per-frame flip/resize transforms and
//! a global playback scale.

// Playback engine (player, compositor, surface, scheduler)
pub mod core;

// Descriptor and image types
pub mod entities;

// CLI args for the headless runner binary
pub mod cli;

// Re-export commonly used types from core
pub use crate::core::compositor::DrawOptions;
pub use crate::core::player::{Player, PlayerError, DEFAULT_FPS};
pub use crate::core::scheduler::{ManualScheduler, ScheduleHandle, Scheduler};
pub use crate::core::surface::{PixelSurface, Rect, Surface, SurfaceError};

// Re-export entities
pub use crate::entities::{
    probe_dimensions, resolve, AssetResolver, DestTransform, FrameBounds, FrameKind, ImageError,
    ResolvedFrame, SheetLibrary, SourceRect, SpriteFrame, SpriteImage,
};
