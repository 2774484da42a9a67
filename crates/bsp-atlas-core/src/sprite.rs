use crate::config::AtlasConfig;
use crate::error::{AtlasError, Result};
use crate::model::{Dimension, LayoutResult, Point, Rect};
use crate::search::{LayoutItem, pack_layout};
use crate::trim::{RgbaView, trim};
use image::{DynamicImage, RgbaImage};
use std::collections::HashSet;
use tracing::debug;

/// A decoded source image, its trim rectangle and (once packed) its atlas position.
#[derive(Debug, Clone)]
pub struct Sprite {
    id: String,
    image: RgbaImage,
    trim: Rect,
    position: Option<Point>,
}

impl Sprite {
    /// Trims `image` and wraps it. Images with a zero dimension are rejected.
    pub fn new(id: impl Into<String>, image: RgbaImage) -> Result<Self> {
        let id = id.into();
        let (w, h) = image.dimensions();
        if w == 0 || h == 0 {
            return Err(AtlasError::InvalidInput(format!(
                "image {id} has no pixels ({w}x{h})"
            )));
        }
        let trim = trim(RgbaView::from_image(&image)).bounds();
        debug!(%id, "{}x{} -> {}x{}", w, h, trim.w, trim.h);
        Ok(Self {
            id,
            image,
            trim,
            position: None,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn original_size(&self) -> Dimension {
        let (width, height) = self.image.dimensions();
        Dimension { width, height }
    }

    /// Trimmed pixels as a view into the decoded image.
    pub fn trimmed(&self) -> RgbaView<'_> {
        RgbaView::from_image(&self.image).sub_view(self.trim)
    }

    pub fn trimmed_size(&self) -> Dimension {
        Dimension {
            width: self.trim.w,
            height: self.trim.h,
        }
    }

    /// Offset of the trimmed pixels inside the original image.
    pub fn trim_offset(&self) -> Point {
        Point {
            x: self.trim.x,
            y: self.trim.y,
        }
    }

    pub fn position(&self) -> Option<Point> {
        self.position
    }

    /// Atlas rectangle covered by the trimmed pixels, once packed.
    pub fn placed_rect(&self) -> Option<Rect> {
        self.position
            .map(|p| Rect::new(p.x, p.y, self.trim.w, self.trim.h))
    }
}

/// Every sprite of one atlas build, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct SpriteCollection {
    sprites: Vec<Sprite>,
    ids: HashSet<String>,
}

impl SpriteCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts to RGBA8, trims and adds. Identifiers must be unique.
    pub fn add(&mut self, id: impl Into<String>, image: &DynamicImage) -> Result<()> {
        self.add_rgba(id, image.to_rgba8())
    }

    pub fn add_rgba(&mut self, id: impl Into<String>, image: RgbaImage) -> Result<()> {
        let id = id.into();
        if self.ids.contains(&id) {
            return Err(AtlasError::InvalidInput(format!("duplicate image id {id}")));
        }
        let sprite = Sprite::new(id.clone(), image)?;
        self.ids.insert(id);
        self.sprites.push(sprite);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sprite> {
        self.sprites.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Sprite> {
        self.sprites.iter().find(|s| s.id == id)
    }

    /// Trimmed sizes as layout inputs, in collection order.
    pub fn layout_items(&self) -> Vec<LayoutItem> {
        self.sprites
            .iter()
            .map(|s| LayoutItem::new(s.id.clone(), s.trim.w, s.trim.h))
            .collect()
    }

    /// Searches for the best layout and records every sprite's position.
    /// On error no position is changed.
    pub fn pack(&mut self, cfg: &AtlasConfig) -> Result<LayoutResult> {
        let layout = pack_layout(&self.layout_items(), cfg)?;
        for (sprite, r) in self.sprites.iter_mut().zip(&layout.placements) {
            sprite.position = Some(Point { x: r.x, y: r.y });
        }
        Ok(layout)
    }

    /// True once every sprite has a position.
    pub fn is_packed(&self) -> bool {
        !self.sprites.is_empty() && self.sprites.iter().all(|s| s.position.is_some())
    }
}
