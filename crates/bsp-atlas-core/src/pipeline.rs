use crate::compositing::compose;
use crate::config::AtlasConfig;
use crate::error::{AtlasError, Result};
use crate::export::build_meta;
use crate::model::{AtlasMeta, LayoutResult, PackStats};
use crate::sprite::SpriteCollection;
use image::{DynamicImage, ImageReader, RgbaImage};
use std::path::Path;
use tracing::instrument;

/// In-memory image to pack (key + decoded image).
pub struct InputImage {
    pub key: String,
    pub image: DynamicImage,
}

/// Decode the file at `path`. The key is the path with `/` separators.
pub fn load_input(path: &Path) -> Result<InputImage> {
    let decode = |source| AtlasError::Decode {
        path: path.to_path_buf(),
        source,
    };
    let image = ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(decode)?;
    Ok(InputImage {
        key: path.to_string_lossy().replace('\\', "/"),
        image,
    })
}

/// Output of an atlas build: manifest, winning layout and the composited RGBA canvas.
pub struct AtlasOutput {
    pub meta: AtlasMeta,
    pub layout: LayoutResult,
    pub rgba: RgbaImage,
}

impl AtlasOutput {
    /// Computes packing statistics for this output.
    /// This is a convenience method that delegates to `meta.stats()`.
    pub fn stats(&self) -> PackStats {
        self.meta.stats()
    }
}

#[instrument(skip_all, fields(inputs = inputs.len()))]
/// Trims, packs and composites `inputs` into one atlas of `cfg.width` x `cfg.height`.
///
/// Notes:
/// - The layout only depends on the set of inputs (keys and pixels), not their order.
/// - Any failure aborts the build; nothing partial is returned.
pub fn build_atlas(inputs: Vec<InputImage>, cfg: &AtlasConfig) -> Result<AtlasOutput> {
    // Validate configuration first
    cfg.validate()?;

    if inputs.is_empty() {
        return Err(AtlasError::Empty);
    }

    let mut sprites = SpriteCollection::new();
    for input in inputs {
        sprites.add(input.key, &input.image)?;
    }

    let layout = sprites.pack(cfg)?;
    let rgba = compose(&sprites, cfg.width, cfg.height, cfg.draw_padding)?;
    let meta = build_meta(&sprites, cfg.width, cfg.height, cfg.strip)?;
    Ok(AtlasOutput { meta, layout, rgba })
}
