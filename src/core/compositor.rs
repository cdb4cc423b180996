//! Per-frame compositing: maps a source sub-rectangle through flip/resize
//! transforms and the global playback zoom onto the destination surface.
//!
//! Stateless - one pure routine over a [`Surface`]. Flip and zoom compose
//! multiplicatively into the drawing transform; mirrored axes are
//! translated back by the negative destination extent so the flipped image
//! keeps the unflipped footprint. The frame-anchor offset is sign-corrected
//! by the flip factor for the same reason: the anchor point stays visually
//! fixed under mirroring.
//!
//! Clipping erases everything outside the logical frame box with two
//! axis-aligned rects (right-of and below). They tile the remainder exactly:
//! the second rect is width-limited to the frame box so the pair neither
//! overlaps nor leaves a seam.

use crate::core::surface::{Rect, Surface, SurfaceError};
use crate::entities::image::ResolvedFrame;

/// Independent draw toggles.
///
/// Defaults match playback behavior: clip to frame bounds, no debug box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawOptions {
    /// Stroke the logical frame rectangle (visual debugging).
    pub with_bounding_box: bool,
    /// Erase pixels outside the logical frame box.
    pub with_clipping: bool,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            with_bounding_box: false,
            with_clipping: true,
        }
    }
}

/// Draw one resolved frame onto the surface.
///
/// Zero-area source rects or frame bounds, and a zero global scale, are
/// no-op draws, not errors. The surface transform is saved and restored on
/// every exit path, including draw failure.
pub fn draw(
    surface: &mut dyn Surface,
    resolved: &ResolvedFrame,
    global_scale: f32,
    options: DrawOptions,
) -> Result<(), SurfaceError> {
    let frame = &resolved.frame;
    let src = frame.source_rect;
    let bounds = frame.frame_bounds;
    if src.is_empty() || bounds.is_empty() || global_scale == 0.0 {
        return Ok(());
    }

    let transform = frame.dest_transform;
    let (dest_w, dest_h) = frame.dest_size();
    let (src_x, src_y) = src.origin();

    let flip_x = if transform.flip_x { -1.0 } else { 1.0 };
    let flip_y = if transform.flip_y { -1.0 } else { 1.0 };
    let scale_x = flip_x * global_scale;
    let scale_y = flip_y * global_scale;

    surface.save();
    surface.scale(scale_x, scale_y);
    if transform.flip_x {
        surface.translate(-dest_w, 0.0);
    }
    if transform.flip_y {
        surface.translate(0.0, -dest_h);
    }
    let drawn = surface.draw_image(
        &resolved.image,
        Rect::new(src_x, src_y, src.width, src.height),
        Rect::new(
            -bounds.frame_x * flip_x,
            -bounds.frame_y * flip_y,
            dest_w,
            dest_h,
        ),
    );
    surface.restore();
    drawn?;

    // Device-space frame box; erase and debug stroke happen outside the
    // saved transform scope
    let clip_w = bounds.frame_width * global_scale;
    let clip_h = bounds.frame_height * global_scale;

    if options.with_clipping {
        let surface_w = surface.width() as f32;
        let surface_h = surface.height() as f32;
        surface.clear(Rect::new(clip_w, 0.0, surface_w - clip_w, surface_h));
        surface.clear(Rect::new(0.0, clip_h, clip_w, surface_h - clip_h));
    }

    if options.with_bounding_box {
        surface.stroke_rect(Rect::new(0.0, 0.0, clip_w, clip_h));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::surface::PixelSurface;
    use crate::entities::frame::{FrameBounds, SourceRect, SpriteFrame};
    use crate::entities::image::SpriteImage;

    /// 2x1 image: left texel red, right texel blue.
    fn two_tone() -> Arc<SpriteImage> {
        let pixels = vec![
            255, 0, 0, 255, // (0,0) red
            0, 0, 255, 255, // (1,0) blue
        ];
        Arc::new(SpriteImage::from_pixels(2, 1, pixels).unwrap())
    }

    fn resolved(frame: SpriteFrame, image: Arc<SpriteImage>) -> ResolvedFrame {
        ResolvedFrame { frame, image }
    }

    fn no_clip() -> DrawOptions {
        DrawOptions {
            with_bounding_box: false,
            with_clipping: false,
        }
    }

    /// Test: plain draw
    /// Validates: source texels land at the local origin unscaled
    #[test]
    fn test_plain_draw() {
        let frame = SpriteFrame::single(SourceRect::new(0.0, 0.0, 2.0, 1.0));
        let rf = resolved(frame, two_tone());
        let mut surface = PixelSurface::new(4, 4);

        draw(&mut surface, &rf, 1.0, no_clip()).unwrap();

        assert_eq!(surface.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(1, 0), Some([0, 0, 255, 255]));
        assert_eq!(surface.pixel(2, 0), Some([0, 0, 0, 0]));
    }

    /// Test: horizontal flip footprint
    /// Validates: mirrored image occupies the same device pixels with
    /// texel order reversed
    #[test]
    fn test_flip_x_same_footprint() {
        let frame =
            SpriteFrame::single(SourceRect::new(0.0, 0.0, 2.0, 1.0)).with_flips(true, false);
        let rf = resolved(frame, two_tone());
        let mut surface = PixelSurface::new(4, 4);

        draw(&mut surface, &rf, 1.0, no_clip()).unwrap();

        assert_eq!(surface.pixel(0, 0), Some([0, 0, 255, 255]));
        assert_eq!(surface.pixel(1, 0), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(2, 0), Some([0, 0, 0, 0]));
    }

    /// Test: flip involution
    /// Validates: flipping both axes twice restores the unflipped draw
    #[test]
    fn test_double_flip_involution() {
        let base = SpriteFrame::single(SourceRect::new(0.0, 0.0, 2.0, 1.0));

        let mut plain = PixelSurface::new(4, 4);
        draw(&mut plain, &resolved(base.clone(), two_tone()), 1.0, no_clip()).unwrap();

        // flip(flip(frame)) == frame
        let once = base.clone().with_flips(true, true);
        let twice = once.clone().with_flips(
            !once.dest_transform.flip_x,
            !once.dest_transform.flip_y,
        );
        let mut surface = PixelSurface::new(4, 4);
        draw(&mut surface, &resolved(twice, two_tone()), 1.0, no_clip()).unwrap();

        assert_eq!(surface.pixels(), plain.pixels());
    }

    /// Test: global scale
    /// Validates: scale 2 doubles the covered area per texel
    #[test]
    fn test_global_scale() {
        let frame = SpriteFrame::single(SourceRect::new(0.0, 0.0, 2.0, 1.0));
        let rf = resolved(frame, two_tone());
        let mut surface = PixelSurface::new(8, 8);

        draw(&mut surface, &rf, 2.0, no_clip()).unwrap();

        assert_eq!(surface.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(1, 1), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(2, 0), Some([0, 0, 255, 255]));
        assert_eq!(surface.pixel(3, 1), Some([0, 0, 255, 255]));
        assert_eq!(surface.pixel(4, 0), Some([0, 0, 0, 0]));
    }

    /// Test: explicit destination size
    /// Validates: new_width/new_height stretch the source to the given
    /// extent
    #[test]
    fn test_explicit_dest_size() {
        let frame = SpriteFrame::single(SourceRect::new(0.0, 0.0, 2.0, 1.0))
            .with_dest_size(4.0, 2.0)
            .with_bounds(FrameBounds::new(0.0, 0.0, 4.0, 2.0));
        let rf = resolved(frame, two_tone());
        let mut surface = PixelSurface::new(8, 8);

        draw(&mut surface, &rf, 1.0, no_clip()).unwrap();

        assert_eq!(surface.pixel(1, 1), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(2, 0), Some([0, 0, 255, 255]));
        assert_eq!(surface.pixel(3, 1), Some([0, 0, 255, 255]));
        assert_eq!(surface.pixel(4, 0), Some([0, 0, 0, 0]));
    }

    /// Test: frame anchor offset
    /// Validates: positive frame_x shifts sampling left by the anchor, and
    /// the anchor stays fixed under mirroring (sign-corrected)
    #[test]
    fn test_anchor_offset() {
        let frame = SpriteFrame::single(SourceRect::new(0.0, 0.0, 2.0, 1.0))
            .with_bounds(FrameBounds::new(1.0, 0.0, 2.0, 1.0));
        let rf = resolved(frame.clone(), two_tone());
        let mut surface = PixelSurface::new(4, 4);
        draw(&mut surface, &rf, 1.0, no_clip()).unwrap();

        // Anchor 1 shifts the image one pixel left: red is cut off
        assert_eq!(surface.pixel(0, 0), Some([0, 0, 255, 255]));
        assert_eq!(surface.pixel(1, 0), Some([0, 0, 0, 0]));

        // Mirrored: same anchor, texels reversed, still cut to one pixel
        let flipped = frame.with_flips(true, false);
        let mut mirrored = PixelSurface::new(4, 4);
        draw(&mut mirrored, &resolved(flipped, two_tone()), 1.0, no_clip()).unwrap();
        assert_eq!(mirrored.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(mirrored.pixel(1, 0), Some([0, 0, 0, 0]));
    }

    /// Test: clipping erases outside the frame box
    /// Validates: the two erase rects remove spill right of and below the
    /// box without touching the box itself
    #[test]
    fn test_clipping_erases_outside_bounds() {
        // 2-wide image drawn into 1-wide logical bounds: one pixel spills
        let frame = SpriteFrame::single(SourceRect::new(0.0, 0.0, 2.0, 1.0))
            .with_bounds(FrameBounds::new(0.0, 0.0, 1.0, 1.0));
        let rf = resolved(frame, two_tone());
        let mut surface = PixelSurface::new(4, 4);

        draw(
            &mut surface,
            &rf,
            1.0,
            DrawOptions {
                with_bounding_box: false,
                with_clipping: true,
            },
        )
        .unwrap();

        assert_eq!(surface.pixel(0, 0), Some([255, 0, 0, 255]));
        // Spill at (1,0) erased by the right-of rect
        assert_eq!(surface.pixel(1, 0), Some([0, 0, 0, 0]));
    }

    /// Test: clipping box scales with the global zoom
    /// Validates: erase boundary sits at frame_width * global_scale with no
    /// off-by-one seam
    #[test]
    fn test_clipping_scaled_boundary() {
        let frame = SpriteFrame::single(SourceRect::new(0.0, 0.0, 2.0, 1.0))
            .with_bounds(FrameBounds::new(0.0, 0.0, 1.0, 1.0));
        let rf = resolved(frame, two_tone());
        let mut surface = PixelSurface::new(8, 8);

        draw(
            &mut surface,
            &rf,
            2.0,
            DrawOptions {
                with_bounding_box: false,
                with_clipping: true,
            },
        )
        .unwrap();

        // Box is [0,2)x[0,2): red survives, blue spill erased from x=2 on
        assert_eq!(surface.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(1, 1), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(2, 0), Some([0, 0, 0, 0]));
        assert_eq!(surface.pixel(3, 0), Some([0, 0, 0, 0]));
    }

    /// Test: bounding box stroke
    /// Validates: debug stroke outlines the scaled frame rect, independent
    /// of clipping
    #[test]
    fn test_bounding_box_stroke() {
        let frame = SpriteFrame::single(SourceRect::new(0.0, 0.0, 2.0, 1.0))
            .with_bounds(FrameBounds::new(0.0, 0.0, 2.0, 2.0));
        let rf = resolved(frame, two_tone());
        let mut surface = PixelSurface::new(8, 8);

        draw(
            &mut surface,
            &rf,
            2.0,
            DrawOptions {
                with_bounding_box: true,
                with_clipping: false,
            },
        )
        .unwrap();

        // Stroke at the far corner of the 4x4 scaled box
        assert_eq!(surface.pixel(3, 3), Some([0, 0, 0, 255]));
        assert_eq!(surface.pixel(4, 4), Some([0, 0, 0, 0]));
    }

    /// Test: zero-area draws
    /// Validates: empty source rect, empty bounds, and zero scale are
    /// no-ops, not errors
    #[test]
    fn test_zero_area_noop() {
        let mut surface = PixelSurface::new(4, 4);

        let empty_src = SpriteFrame::single(SourceRect::new(0.0, 0.0, 0.0, 1.0));
        draw(&mut surface, &resolved(empty_src, two_tone()), 1.0, no_clip()).unwrap();

        let empty_bounds = SpriteFrame::single(SourceRect::new(0.0, 0.0, 2.0, 1.0))
            .with_bounds(FrameBounds::new(0.0, 0.0, 0.0, 0.0));
        draw(&mut surface, &resolved(empty_bounds, two_tone()), 1.0, no_clip()).unwrap();

        let plain = SpriteFrame::single(SourceRect::new(0.0, 0.0, 2.0, 1.0));
        draw(&mut surface, &resolved(plain, two_tone()), 0.0, no_clip()).unwrap();

        assert!(surface.pixels().iter().all(|&b| b == 0));
    }
}
