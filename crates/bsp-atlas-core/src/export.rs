use crate::error::{AtlasError, Result};
use crate::model::{AtlasMeta, Dimension, ImageMeta, Point};
use crate::sprite::SpriteCollection;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// Drop the first `strip` segments of a `/`- or `\`-separated path and rejoin with `/`.
/// Returns `None` if nothing would be left.
pub fn strip_identifier(path: &str, strip: usize) -> Option<String> {
    let normalized = path.replace('\\', "/");
    let rest: Vec<&str> = normalized
        .split('/')
        .skip(strip)
        .filter(|s| !s.is_empty())
        .collect();
    if rest.is_empty() {
        None
    } else {
        Some(rest.join("/"))
    }
}

/// Build the manifest for a packed collection on a `width` x `height` atlas.
///
/// Identifiers are the sprite ids with `strip` leading segments removed; two sprites
/// collapsing onto one identifier is an error rather than a silent overwrite.
pub fn build_meta(
    sprites: &SpriteCollection,
    width: u32,
    height: u32,
    strip: usize,
) -> Result<AtlasMeta> {
    let mut images = BTreeMap::new();
    for sprite in sprites.iter() {
        let position = sprite.position().ok_or_else(|| {
            AtlasError::InvalidInput(format!("image {} has not been packed", sprite.id()))
        })?;
        let key = strip_identifier(sprite.id(), strip).ok_or_else(|| {
            AtlasError::InvalidConfig(format!(
                "strip {} removes every segment of {}",
                strip,
                sprite.id()
            ))
        })?;
        let meta = ImageMeta {
            position,
            size: sprite.trimmed_size(),
            original_size: sprite.original_size(),
            offset: sprite.trim_offset(),
        };
        if images.insert(key.clone(), meta).is_some() {
            return Err(AtlasError::InvalidInput(format!(
                "identifier {key} is produced by more than one image after stripping"
            )));
        }
    }
    Ok(AtlasMeta {
        size: Dimension { width, height },
        images,
    })
}

/// Serialize the manifest as `{ size, images: { id: { position, size, originalSize, offset } } }`.
pub fn to_json(meta: &AtlasMeta) -> Value {
    let mut images = Map::new();
    for (id, img) in &meta.images {
        images.insert(
            id.clone(),
            json!({
                "position": { "x": img.position.x, "y": img.position.y },
                "size": { "width": img.size.width, "height": img.size.height },
                "originalSize": {
                    "width": img.original_size.width,
                    "height": img.original_size.height,
                },
                "offset": { "x": img.offset.x, "y": img.offset.y },
            }),
        );
    }
    json!({
        "size": { "width": meta.size.width, "height": meta.size.height },
        "images": images,
    })
}

/// Replace every character outside `[A-Za-z0-9]` with `_`.
pub fn identifier_to_var_name(path: &str) -> String {
    path.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Forward slashes only, with `"` and `\` escaped for a double-quoted string literal.
pub fn quoted_path(path: &str) -> String {
    path.replace('\\', "/").replace('"', "\\\"")
}

/// Per-image values exposed to code generation templates.
#[derive(Debug, Clone, Serialize)]
pub struct CodegenImage {
    pub path: String,
    pub quoted_path: String,
    pub var_name: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub original_width: u32,
    pub original_height: u32,
    pub offset_x: u32,
    pub offset_y: u32,
    pub u0: f64,
    pub v0: f64,
    pub u1: f64,
    pub v1: f64,
}

/// Template context: `package.ClassName` split into its parts plus every image.
#[derive(Debug, Clone, Serialize)]
pub struct CodegenContext {
    pub package: String,
    pub class_name: String,
    pub width: u32,
    pub height: u32,
    pub images: Vec<CodegenImage>,
}

/// Build the code generation context. `qualified_name` is `pkg.sub.ClassName`; the
/// last segment is the class, the rest (possibly empty) the package.
pub fn codegen_context(meta: &AtlasMeta, qualified_name: &str) -> CodegenContext {
    let (package, class_name) = match qualified_name.rsplit_once('.') {
        Some((pkg, class)) => (pkg.to_string(), class.to_string()),
        None => (String::new(), qualified_name.to_string()),
    };
    let images = meta
        .images
        .iter()
        .map(|(path, img)| {
            let uv = img.uv(meta.size);
            let Point { x, y } = img.position;
            CodegenImage {
                path: path.clone(),
                quoted_path: quoted_path(path),
                var_name: identifier_to_var_name(path),
                x,
                y,
                width: img.size.width,
                height: img.size.height,
                original_width: img.original_size.width,
                original_height: img.original_size.height,
                offset_x: img.offset.x,
                offset_y: img.offset.y,
                u0: uv.u0,
                v0: uv.v0,
                u1: uv.u1,
                v1: uv.v1,
            }
        })
        .collect();
    CodegenContext {
        package,
        class_name,
        width: meta.size.width,
        height: meta.size.height,
        images,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_drops_leading_segments() {
        assert_eq!(strip_identifier("assets/ui/button.png", 0).as_deref(), Some("assets/ui/button.png"));
        assert_eq!(strip_identifier("assets/ui/button.png", 1).as_deref(), Some("ui/button.png"));
        assert_eq!(strip_identifier("assets\\ui\\button.png", 2).as_deref(), Some("button.png"));
        assert_eq!(strip_identifier("assets/ui/button.png", 3), None);
    }

    #[test]
    fn var_names_are_alphanumeric() {
        assert_eq!(identifier_to_var_name("ui/btn-ok.png"), "ui_btn_ok_png");
        assert_eq!(quoted_path("a\\b\"c"), "a/b\\\"c");
    }

    #[test]
    fn qualified_name_splits_on_last_dot() {
        let meta = AtlasMeta {
            size: Dimension { width: 4, height: 4 },
            images: BTreeMap::new(),
        };
        let ctx = codegen_context(&meta, "com.game.Sprites");
        assert_eq!(ctx.package, "com.game");
        assert_eq!(ctx.class_name, "Sprites");
        let ctx = codegen_context(&meta, "Atlas");
        assert_eq!(ctx.package, "");
        assert_eq!(ctx.class_name, "Atlas");
    }
}
