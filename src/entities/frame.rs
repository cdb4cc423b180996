//! Sprite frame descriptors - metadata for one visual frame.
//!
//! A [`SpriteFrame`] says where a frame's pixels come from (a sub-rectangle
//! of a decoded source image), how they are placed (explicit destination
//! size plus per-axis mirroring), and the logical bounding box used as draw
//! anchor and clip boundary.
//!
//! Descriptors are plain data. Resolution into drawable images happens in
//! [`crate::entities::store`], drawing in [`crate::core::compositor`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a frame's pixel data is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    /// Standalone image, decoded from its own encoded bytes.
    SingleImage,
    /// Region of a shared spritesheet, looked up by sharing key.
    SpritesheetRegion,
}

/// Source sub-rectangle sampled from the decoded image.
///
/// `x`/`y` stay unset until the frame is finalized (spritesheet frames get
/// their origin assigned once the sheet layout is known); `width`/`height`
/// are required by resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceRect {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: f32,
    pub height: f32,
}

impl SourceRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            width,
            height,
        }
    }

    /// Rect with known dimensions but an origin still to be assigned.
    pub fn sized(width: f32, height: f32) -> Self {
        Self {
            x: None,
            y: None,
            width,
            height,
        }
    }

    /// Origin, defaulting to (0, 0) while unset.
    pub fn origin(&self) -> (f32, f32) {
        (self.x.unwrap_or(0.0), self.y.unwrap_or(0.0))
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Destination placement: explicit size (not a scale factor) plus mirroring.
///
/// Size defaults to the source dimensions when unset, see
/// [`SpriteFrame::dest_size`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DestTransform {
    pub new_width: Option<f32>,
    pub new_height: Option<f32>,
    pub flip_x: bool,
    pub flip_y: bool,
}

/// Logical bounding box: draw anchor offset and clip boundary.
///
/// Pixels outside `[0, frame_width) x [0, frame_height)` of the per-frame
/// local space must not stay visible after a clipped draw.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameBounds {
    pub frame_x: f32,
    pub frame_y: f32,
    pub frame_width: f32,
    pub frame_height: f32,
}

impl FrameBounds {
    pub fn new(frame_x: f32, frame_y: f32, frame_width: f32, frame_height: f32) -> Self {
        Self {
            frame_x,
            frame_y,
            frame_width,
            frame_height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frame_width <= 0.0 || self.frame_height <= 0.0
    }
}

/// One visual frame of an animation sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteFrame {
    /// Opaque identifier of the originating asset.
    pub id: Uuid,
    pub kind: FrameKind,
    pub source_rect: SourceRect,
    pub dest_transform: DestTransform,
    pub frame_bounds: FrameBounds,
    /// Frames sharing a non-None key resolve to the same decoded image
    /// instance within one resolution pass.
    pub sharing_key: Option<String>,
}

impl SpriteFrame {
    /// Standalone image frame. Bounds default to the full source rect.
    pub fn single(source_rect: SourceRect) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: FrameKind::SingleImage,
            frame_bounds: FrameBounds::new(0.0, 0.0, source_rect.width, source_rect.height),
            source_rect,
            dest_transform: DestTransform::default(),
            sharing_key: None,
        }
    }

    /// Frame cut from a shared spritesheet, keyed for decode reuse.
    pub fn sheet_region(key: impl Into<String>, source_rect: SourceRect) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: FrameKind::SpritesheetRegion,
            frame_bounds: FrameBounds::new(0.0, 0.0, source_rect.width, source_rect.height),
            source_rect,
            dest_transform: DestTransform::default(),
            sharing_key: Some(key.into()),
        }
    }

    pub fn with_bounds(mut self, bounds: FrameBounds) -> Self {
        self.frame_bounds = bounds;
        self
    }

    pub fn with_dest_size(mut self, width: f32, height: f32) -> Self {
        self.dest_transform.new_width = Some(width);
        self.dest_transform.new_height = Some(height);
        self
    }

    pub fn with_flips(mut self, flip_x: bool, flip_y: bool) -> Self {
        self.dest_transform.flip_x = flip_x;
        self.dest_transform.flip_y = flip_y;
        self
    }

    /// Destination extent, defaulting to source dimensions when unset.
    pub fn dest_size(&self) -> (f32, f32) {
        (
            self.dest_transform.new_width.unwrap_or(self.source_rect.width),
            self.dest_transform.new_height.unwrap_or(self.source_rect.height),
        )
    }
}
