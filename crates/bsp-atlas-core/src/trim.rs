//! Alpha trimming over borrowed RGBA buffers.

use crate::model::Rect;
use image::RgbaImage;

/// Borrowed RGBA8 pixel grid: a rectangle inside a buffer with an explicit row stride.
///
/// Pixel `(x, y)` of the view lives at byte `(rect.x + x) * 4 + (rect.y + y) * stride`.
#[derive(Debug, Clone, Copy)]
pub struct RgbaView<'a> {
    pixels: &'a [u8],
    stride: usize,
    rect: Rect,
}

impl<'a> RgbaView<'a> {
    /// Wraps a raw buffer. Returns `None` if `stride` is shorter than a row or the
    /// buffer cannot hold `height` rows.
    pub fn new(pixels: &'a [u8], width: u32, height: u32, stride: usize) -> Option<Self> {
        let row = width as usize * 4;
        if stride < row {
            return None;
        }
        if height > 0 && pixels.len() < stride * (height as usize - 1) + row {
            return None;
        }
        Some(Self {
            pixels,
            stride,
            rect: Rect::new(0, 0, width, height),
        })
    }

    pub fn from_image(img: &'a RgbaImage) -> Self {
        let (w, h) = img.dimensions();
        Self {
            pixels: img.as_raw(),
            stride: w as usize * 4,
            rect: Rect::new(0, 0, w, h),
        }
    }

    /// Bounds of the view in the coordinates of the underlying buffer.
    pub fn bounds(&self) -> Rect {
        self.rect
    }

    pub fn width(&self) -> u32 {
        self.rect.w
    }

    pub fn height(&self) -> u32 {
        self.rect.h
    }

    /// Sub-view in buffer coordinates, clipped to this view.
    pub fn sub_view(&self, r: Rect) -> RgbaView<'a> {
        let x0 = r.x.clamp(self.rect.x, self.rect.max_x());
        let y0 = r.y.clamp(self.rect.y, self.rect.max_y());
        let x1 = r.max_x().clamp(x0, self.rect.max_x());
        let y1 = r.max_y().clamp(y0, self.rect.max_y());
        RgbaView {
            pixels: self.pixels,
            stride: self.stride,
            rect: Rect::new(x0, y0, x1 - x0, y1 - y0),
        }
    }

    /// RGBA of pixel `(x, y)` relative to the view origin.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let off = self.offset(x, y);
        [
            self.pixels[off],
            self.pixels[off + 1],
            self.pixels[off + 2],
            self.pixels[off + 3],
        ]
    }

    /// Highest alpha value over every pixel of the view; 0 for an empty view.
    pub fn max_alpha(&self) -> u8 {
        let mut max = 0u8;
        for y in 0..self.rect.h {
            for x in 0..self.rect.w {
                let a = self.pixels[self.offset(x, y) + 3];
                if a > max {
                    max = a;
                }
            }
        }
        max
    }

    /// Copies the view into a tightly packed image.
    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.rect.w, self.rect.h, |x, y| image::Rgba(self.pixel(x, y)))
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (self.rect.x + x) as usize * 4 + (self.rect.y + y) as usize * self.stride
    }
}

/// Crops fully transparent borders off `view`.
///
/// Each edge is shrunk on its own, in the fixed order right, left, bottom, top, while the
/// outermost column/row has a maximum alpha of zero and more than one pixel remains on
/// that axis. Edges are never re-examined once a later edge moves. Kept in this exact
/// order (rather than a joint bounding-box scan) so trimmed sizes, and with them the
/// layouts, stay identical to earlier atlas builds.
///
/// With at least one visible pixel this is the tight alpha bounding box. A fully
/// transparent view ends up as its top-left 1x1 pixel.
pub fn trim(view: RgbaView<'_>) -> RgbaView<'_> {
    let b = view.bounds();
    let (mut x0, mut y0, mut x1, mut y1) = (b.x, b.y, b.max_x(), b.max_y());

    while x1 - x0 > 1 && view.sub_view(Rect::new(x1 - 1, y0, 1, y1 - y0)).max_alpha() == 0 {
        x1 -= 1;
    }
    while x1 - x0 > 1 && view.sub_view(Rect::new(x0, y0, 1, y1 - y0)).max_alpha() == 0 {
        x0 += 1;
    }
    while y1 - y0 > 1 && view.sub_view(Rect::new(x0, y1 - 1, x1 - x0, 1)).max_alpha() == 0 {
        y1 -= 1;
    }
    while y1 - y0 > 1 && view.sub_view(Rect::new(x0, y0, x1 - x0, 1)).max_alpha() == 0 {
        y0 += 1;
    }

    view.sub_view(Rect::new(x0, y0, x1 - x0, y1 - y0))
}

/// Trim rectangle of a decoded image, relative to its top-left corner.
pub fn trim_rect(img: &RgbaImage) -> Rect {
    trim(RgbaView::from_image(img)).bounds()
}
