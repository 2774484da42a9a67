use crate::error::{AtlasError, Result};
use crate::model::Rect;
use crate::sprite::SpriteCollection;
use crate::trim::RgbaView;
use image::{Rgba, RgbaImage};

/// Opaque black used for the debug padding frame.
const PADDING_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Copy every pixel of `src` into `canvas` with its top-left at (dx, dy).
/// Pixels are replaced, not blended; anything past the canvas edge is dropped.
pub fn blit_view(src: &RgbaView<'_>, canvas: &mut RgbaImage, dx: u32, dy: u32) {
    let (cw, ch) = canvas.dimensions();
    for yy in 0..src.height() {
        for xx in 0..src.width() {
            if dx + xx < cw && dy + yy < ch {
                canvas.put_pixel(dx + xx, dy + yy, Rgba(src.pixel(xx, yy)));
            }
        }
    }
}

/// Fill `r` grown by one pixel on every side (clipped to the canvas) with `color`.
pub fn fill_outset(canvas: &mut RgbaImage, r: Rect, color: Rgba<u8>) {
    let (cw, ch) = canvas.dimensions();
    let x0 = r.x.saturating_sub(1);
    let y0 = r.y.saturating_sub(1);
    let x1 = (r.max_x() + 1).min(cw);
    let y1 = (r.max_y() + 1).min(ch);
    for y in y0..y1 {
        for x in x0..x1 {
            canvas.put_pixel(x, y, color);
        }
    }
}

/// Render all packed sprites onto a transparent `width` x `height` canvas.
///
/// With `draw_padding`, each sprite's rectangle grown by 1px is first filled opaque
/// black so the gutter shows up as a frame around the sprite.
pub fn compose(
    sprites: &SpriteCollection,
    width: u32,
    height: u32,
    draw_padding: bool,
) -> Result<RgbaImage> {
    let mut canvas = RgbaImage::new(width, height);
    for sprite in sprites.iter() {
        let dst = sprite.placed_rect().ok_or_else(|| {
            AtlasError::InvalidInput(format!("image {} has not been packed", sprite.id()))
        })?;
        if draw_padding {
            fill_outset(&mut canvas, dst, PADDING_COLOR);
        }
        blit_view(&sprite.trimmed(), &mut canvas, dst.x, dst.y);
    }
    Ok(canvas)
}
