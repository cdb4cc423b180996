//! Destination drawing surface.
//!
//! **Why**: The compositor depends on a minimal 2D capability set (erase,
//! sub-image blit, scoped affine transform state, primitive stroke), not on
//! a specific rendering backend. Swapping in a GPU-backed surface later
//! only means implementing [`Surface`].
//!
//! **Used by**: Compositor (all drawing), Player (full-surface erase),
//! headless runner and tests via [`PixelSurface`].
//!
//! # PixelSurface
//!
//! Software backend: straight-alpha RGBA8 canvas with an affine transform
//! stack (`glam::Affine2`). Drawing reverse-maps each covered device pixel
//! through the inverse transform and samples the source nearest-neighbor,
//! blending source-over. Rows are rasterized in parallel.
//!
//! Pixel coverage uses the center rule: a device pixel belongs to a region
//! iff its center lies inside. Integer-aligned rects therefore cover
//! exactly their area - no seams, no double-covered edge rows.

use glam::{Affine2, Vec2};
use rayon::prelude::*;

use crate::entities::image::SpriteImage;

/// Axis-aligned rectangle in surface user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Surface drawing errors
#[derive(Debug)]
pub enum SurfaceError {
    /// Current transform cannot be inverted (zero scale on an axis).
    NonInvertibleTransform,
    /// Backend-specific failure (lost context, out of memory, ...).
    Backend(String),
}

impl std::fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceError::NonInvertibleTransform => write!(f, "Non-invertible transform"),
            SurfaceError::Backend(e) => write!(f, "Surface backend error: {}", e),
        }
    }
}

impl std::error::Error for SurfaceError {}

/// Minimal 2D drawing capability set consumed by the compositor.
///
/// Empty rects are no-ops for every operation. `restore` without a matching
/// `save` is ignored.
pub trait Surface {
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    /// Erase a region to transparent, through the current transform.
    fn clear(&mut self, rect: Rect);

    /// Erase the whole surface to transparent.
    fn clear_all(&mut self);

    /// Blit `src` (source image texels) into `dest` (user space), through
    /// the current transform.
    fn draw_image(&mut self, image: &SpriteImage, src: Rect, dest: Rect)
    -> Result<(), SurfaceError>;

    /// Push a copy of the current transform.
    fn save(&mut self);

    /// Pop back to the last saved transform.
    fn restore(&mut self);

    fn scale(&mut self, sx: f32, sy: f32);
    fn translate(&mut self, dx: f32, dy: f32);

    /// One-pixel outline of a region, through the current transform.
    fn stroke_rect(&mut self, rect: Rect);
}

/// Device pixels whose centers fall inside `[min, max)`, clamped to `limit`.
fn pixel_span(min: f32, max: f32, limit: usize) -> std::ops::Range<usize> {
    if !(min < max) {
        return 0..0;
    }
    let lo = (min - 0.5).ceil().max(0.0) as usize;
    let hi = ((max - 0.5).ceil().max(0.0) as usize).min(limit);
    lo.min(hi)..hi
}

/// Source-over blend of one straight-alpha RGBA8 texel onto `dst`.
fn blend_px(dst: &mut [u8], src: [u8; 4]) {
    let ta = src[3] as f32 / 255.0;
    if ta <= 0.0 {
        return;
    }
    let inv = 1.0 - ta;
    for c in 0..3 {
        let out = src[c] as f32 * ta + dst[c] as f32 * inv;
        dst[c] = out.round().clamp(0.0, 255.0) as u8;
    }
    let out_a = 255.0 * ta + dst[3] as f32 * inv;
    dst[3] = out_a.round().clamp(0.0, 255.0) as u8;
}

/// Software RGBA8 canvas with an affine transform stack.
#[derive(Debug, Clone)]
pub struct PixelSurface {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
    transform: Affine2,
    stack: Vec<Affine2>,
}

impl PixelSurface {
    /// Debug stroke color (opaque black).
    const STROKE: [u8; 4] = [0, 0, 0, 255];

    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; width * height * 4],
            transform: Affine2::IDENTITY,
            stack: Vec::new(),
        }
    }

    /// RGBA at device (x, y), or None outside the surface.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Raw RGBA8 buffer, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Device-space AABB of a user-space rect under the current transform.
    fn map_rect(&self, rect: Rect) -> (Vec2, Vec2) {
        let t = self.transform;
        let corners = [
            t.transform_point2(Vec2::new(rect.x, rect.y)),
            t.transform_point2(Vec2::new(rect.x + rect.width, rect.y)),
            t.transform_point2(Vec2::new(rect.x, rect.y + rect.height)),
            t.transform_point2(Vec2::new(rect.x + rect.width, rect.y + rect.height)),
        ];
        let mut min = corners[0];
        let mut max = corners[0];
        for c in &corners[1..] {
            min = min.min(*c);
            max = max.max(*c);
        }
        (min, max)
    }

    fn put(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        let i = (y * self.width + x) * 4;
        self.pixels[i..i + 4].copy_from_slice(&rgba);
    }
}

impl Surface for PixelSurface {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn clear(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        let (min, max) = self.map_rect(rect);
        let xs = pixel_span(min.x, max.x, self.width);
        let ys = pixel_span(min.y, max.y, self.height);
        for y in ys {
            let row = (y * self.width + xs.start) * 4;
            self.pixels[row..row + xs.len() * 4].fill(0);
        }
    }

    fn clear_all(&mut self) {
        self.pixels.fill(0);
    }

    fn draw_image(
        &mut self,
        image: &SpriteImage,
        src: Rect,
        dest: Rect,
    ) -> Result<(), SurfaceError> {
        if src.is_empty() || dest.is_empty() {
            return Ok(());
        }
        let det = self.transform.matrix2.determinant();
        if det.abs() <= f32::EPSILON {
            return Err(SurfaceError::NonInvertibleTransform);
        }
        let inv = self.transform.inverse();

        let (min, max) = self.map_rect(dest);
        let xs = pixel_span(min.x, max.x, self.width);
        let ys = pixel_span(min.y, max.y, self.height);
        if xs.is_empty() || ys.is_empty() {
            return Ok(());
        }

        let stride = self.width * 4;
        let rows = &mut self.pixels[ys.start * stride..ys.end * stride];
        rows.par_chunks_mut(stride)
            .enumerate()
            .for_each(|(row, row_pixels)| {
                let py = ys.start + row;
                for px in xs.clone() {
                    // Reverse-map the pixel center into user space, then
                    // into normalized dest coordinates
                    let user = inv.transform_point2(Vec2::new(px as f32 + 0.5, py as f32 + 0.5));
                    let u = (user.x - dest.x) / dest.width;
                    let v = (user.y - dest.y) / dest.height;
                    if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
                        continue;
                    }

                    // Nearest-neighbor sample of the source rect
                    let sx = (src.x + u * src.width).floor();
                    let sy = (src.y + v * src.height).floor();
                    if sx < 0.0 || sy < 0.0 {
                        continue;
                    }
                    let Some(texel) = image.pixel(sx as usize, sy as usize) else {
                        continue;
                    };

                    let i = px * 4;
                    blend_px(&mut row_pixels[i..i + 4], texel);
                }
            });
        Ok(())
    }

    fn save(&mut self) {
        self.stack.push(self.transform);
    }

    fn restore(&mut self) {
        if let Some(t) = self.stack.pop() {
            self.transform = t;
        }
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.transform = self.transform * Affine2::from_scale(Vec2::new(sx, sy));
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.transform = self.transform * Affine2::from_translation(Vec2::new(dx, dy));
    }

    fn stroke_rect(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        let (min, max) = self.map_rect(rect);
        let xs = pixel_span(min.x, max.x, self.width);
        let ys = pixel_span(min.y, max.y, self.height);
        if xs.is_empty() || ys.is_empty() {
            return;
        }
        for x in xs.clone() {
            self.put(x, ys.start, Self::STROKE);
            self.put(x, ys.end - 1, Self::STROKE);
        }
        for y in ys {
            self.put(xs.start, y, Self::STROKE);
            self.put(xs.end - 1, y, Self::STROKE);
        }
    }
}
