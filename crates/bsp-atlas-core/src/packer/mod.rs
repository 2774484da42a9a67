use crate::model::Rect;

pub mod bsp;

/// A packer places rectangles onto a fixed canvas.
///
/// Implementations must ensure no overlaps and reserve their own gutter between placements.
/// `pack` returns `None` if the rectangle cannot be placed; the canvas is not grown.
pub trait Packer {
    fn can_pack(&self, w: u32, h: u32) -> bool;
    fn pack(&mut self, w: u32, h: u32) -> Option<Rect>;
}
