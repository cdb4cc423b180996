//! Entities module - descriptor and image types, independent of playback.
//!
//! Frame descriptors are plain serde-friendly data; decoded images are
//! shared immutable buffers; the store turns one into the other.

pub mod frame;
pub mod image;
pub mod store;

pub use self::frame::{DestTransform, FrameBounds, FrameKind, SourceRect, SpriteFrame};
pub use self::image::{probe_dimensions, ImageError, ResolvedFrame, SpriteImage};
pub use self::store::{resolve, AssetResolver, SheetLibrary};
