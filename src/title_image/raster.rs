use std::path::Path;

use resvg::usvg;
use tiny_skia::{Pixmap, Transform};

use crate::error::{Error, Result};

/// Largest surface allocated, in pixels (an 8192x8192 RGBA buffer is 256 MiB).
pub const MAX_SURFACE_PIXELS: u64 = 8192 * 8192;

/// Rasterises SVG documents to PNG with a font database loaded once.
pub struct Rasterizer {
    options: usvg::Options<'static>,
}

impl Rasterizer {
    /// System fonts, plus a local `fonts/` directory when one exists.
    pub fn new() -> Self {
        let mut options = usvg::Options::default();
        {
            let fontdb = options.fontdb_mut();
            fontdb.load_system_fonts();

            let local_fonts = Path::new("fonts");
            if local_fonts.is_dir() {
                fontdb.load_fonts_dir(local_fonts);
            }

            configure_font_fallbacks(fontdb);
            tracing::debug!(faces = fontdb.len(), "Loaded font database");
        }
        Self { options }
    }

    pub fn render_png(&self, svg: &str, width: u32, height: u32) -> Result<Vec<u8>> {
        if u64::from(width) * u64::from(height) > MAX_SURFACE_PIXELS {
            tracing::warn!(width, height, "Refusing oversized surface");
            return Err(Error::SurfaceUnavailable { width, height });
        }
        let mut pixmap =
            Pixmap::new(width, height).ok_or(Error::SurfaceUnavailable { width, height })?;

        let tree = usvg::Tree::from_str(svg, &self.options).map_err(|e| Error::Svg(e.to_string()))?;
        resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

        pixmap.encode_png().map_err(|e| Error::Encode(e.to_string()))
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Points the generic `sans-serif` family at an installed sans face, so the
/// title renders even where fontconfig aliases are missing.
fn configure_font_fallbacks(fontdb: &mut usvg::fontdb::Database) {
    let mut sans_family: Option<String> = None;
    let mut first_family: Option<String> = None;

    for face in fontdb.faces() {
        for (family, _) in &face.families {
            if first_family.is_none() {
                first_family = Some(family.clone());
            }
            if sans_family.is_none() && family.to_ascii_lowercase().contains("sans") {
                sans_family = Some(family.clone());
            }
        }
    }

    if let Some(family) = sans_family.or(first_family) {
        fontdb.set_sans_serif_family(family);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"><rect width="4" height="4" fill="#667eea"/></svg>"##;

    #[test]
    fn renders_png_bytes() {
        let png = Rasterizer::new().render_png(SQUARE, 4, 4).expect("png");
        assert!(png.starts_with(b"\x89PNG\r\n\x1a\n"));
    }

    #[test]
    fn zero_sized_surface_is_unavailable() {
        let err = Rasterizer::new().render_png(SQUARE, 0, 4).unwrap_err();
        assert!(matches!(
            err,
            Error::SurfaceUnavailable {
                width: 0,
                height: 4
            }
        ));
    }

    #[test]
    fn oversized_surface_is_refused_before_allocating() {
        let err = Rasterizer::new().render_png(SQUARE, 100_000, 100_000).unwrap_err();
        assert!(matches!(
            err,
            Error::SurfaceUnavailable {
                width: 100_000,
                height: 100_000
            }
        ));
        assert!(Rasterizer::new().render_png(SQUARE, 8193, 8192).is_err());
    }

    #[test]
    fn malformed_svg_is_reported() {
        let err = Rasterizer::new().render_png("<svg", 4, 4).unwrap_err();
        assert!(matches!(err, Error::Svg(_)));
    }
}
