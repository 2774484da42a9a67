//! Core library for building a single texture atlas from sprite images.
//!
//! - Trimming: transparent borders are cropped with a fixed-order edge-shrink pass
//! - Packing: binary space partition tree, traversal perturbed by a seeded shift/xor generator
//! - Search: many seeds are tried, the layout with the largest squared free area wins and is
//!   re-verified from its seed
//! - Manifest is serde-serializable; JSON and code generation helpers live in `export`.
//!
//! Quick example:
//! ```ignore
//! use std::path::Path;
//! use bsp_atlas_core::{AtlasConfig, build_atlas, load_input};
//! # fn main() -> anyhow::Result<()> {
//! let inputs = vec![load_input(Path::new("a.png"))?, load_input(Path::new("b.png"))?];
//! let cfg = AtlasConfig { width: 512, height: 512, ..Default::default() };
//! let out = build_atlas(inputs, &cfg)?;
//! out.rgba.save("atlas.png")?;
//! println!("{}", out.stats().summary());
//! # Ok(()) }
//! ```

pub mod compositing;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod packer;
pub mod pipeline;
pub mod rng;
pub mod search;
pub mod sprite;
pub mod trim;

pub use config::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use packer::*;
pub use pipeline::*;
pub use search::*;

/// Convenience prelude for common types and functions.
/// Importing `bsp_atlas_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{AtlasConfig, AtlasConfigBuilder};
    pub use crate::model::{AtlasMeta, Dimension, ImageMeta, LayoutResult, PackStats, Point, Rect, Uv};
    pub use crate::rng::ShiftXorRng;
    pub use crate::search::{LayoutItem, pack_layout, pack_with_seed};
    pub use crate::sprite::{Sprite, SpriteCollection};
    pub use crate::trim::{RgbaView, trim};
    pub use crate::{AtlasOutput, InputImage, build_atlas, load_input};
}
