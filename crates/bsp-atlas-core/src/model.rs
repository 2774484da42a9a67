use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Exclusive right edge (`x + w`).
    pub fn max_x(&self) -> u32 {
        self.x + self.w
    }
    /// Exclusive bottom edge (`y + h`).
    pub fn max_y(&self) -> u32 {
        self.y + self.h
    }
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
    /// Returns true if `r` is fully inside `self`.
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.max_x() <= self.max_x() && r.max_y() <= self.max_y()
    }
    /// Returns true if the two rectangles share at least one pixel.
    pub fn intersects(&self, r: &Rect) -> bool {
        !(self.x >= r.max_x() || r.x >= self.max_x() || self.y >= r.max_y() || r.y >= self.max_y())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dimension {
    pub width: u32,
    pub height: u32,
}

/// Winning layout of a seed search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutResult {
    /// Seed of the winning trial.
    pub seed: u32,
    /// Sum of squared free-leaf areas; higher means fewer, larger gaps.
    pub score: u64,
    /// Placed rectangle (unpadded) per input item, in input order.
    pub placements: Vec<Rect>,
}

/// Per-image manifest record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImageMeta {
    /// Top-left of the trimmed pixels inside the atlas.
    pub position: Point,
    /// Trimmed size.
    pub size: Dimension,
    /// Size of the source image before trimming.
    pub original_size: Dimension,
    /// Offset of the trimmed pixels inside the source image.
    pub offset: Point,
}

/// Normalized texture coordinates of an image within the atlas.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Uv {
    pub u0: f64,
    pub v0: f64,
    pub u1: f64,
    pub v1: f64,
}

impl ImageMeta {
    pub fn uv(&self, atlas: Dimension) -> Uv {
        let aw = atlas.width as f64;
        let ah = atlas.height as f64;
        Uv {
            u0: self.position.x as f64 / aw,
            v0: self.position.y as f64 / ah,
            u1: (self.position.x + self.size.width) as f64 / aw,
            v1: (self.position.y + self.size.height) as f64 / ah,
        }
    }

    pub fn is_trimmed(&self) -> bool {
        self.size != self.original_size
    }
}

/// Atlas manifest: canvas size and every image keyed by identifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AtlasMeta {
    pub size: Dimension,
    pub images: BTreeMap<String, ImageMeta>,
}

/// Statistics about atlas packing efficiency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PackStats {
    /// Number of images packed.
    pub num_images: usize,
    /// Atlas area (width * height).
    pub atlas_area: u64,
    /// Area covered by trimmed images.
    pub used_area: u64,
    /// Area of the source images before trimming.
    pub original_area: u64,
    /// used_area / atlas_area (0.0 to 1.0).
    pub occupancy: f64,
    /// Number of images whose trim removed at least one row or column.
    pub num_trimmed: usize,
}

impl AtlasMeta {
    /// Computes packing statistics for this manifest.
    pub fn stats(&self) -> PackStats {
        let atlas_area = self.size.width as u64 * self.size.height as u64;
        let mut used_area = 0u64;
        let mut original_area = 0u64;
        let mut num_trimmed = 0;
        for img in self.images.values() {
            used_area += img.size.width as u64 * img.size.height as u64;
            original_area += img.original_size.width as u64 * img.original_size.height as u64;
            if img.is_trimmed() {
                num_trimmed += 1;
            }
        }
        let occupancy = if atlas_area > 0 {
            used_area as f64 / atlas_area as f64
        } else {
            0.0
        };
        PackStats {
            num_images: self.images.len(),
            atlas_area,
            used_area,
            original_area,
            occupancy,
            num_trimmed,
        }
    }
}

impl PackStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Images: {}, Occupancy: {:.2}%, Atlas Area: {} px², Used Area: {} px² (untrimmed {} px²), Wasted: {} px², Trimmed: {}",
            self.num_images,
            self.occupancy * 100.0,
            self.atlas_area,
            self.used_area,
            self.original_area,
            self.wasted_area(),
            self.num_trimmed,
        )
    }

    /// Returns wasted space in pixels.
    pub fn wasted_area(&self) -> u64 {
        self.atlas_area.saturating_sub(self.used_area)
    }

    /// Pixels saved by trimming.
    pub fn trimmed_area(&self) -> u64 {
        self.original_area.saturating_sub(self.used_area)
    }
}
