//! Procedural title cards for posts without a featured image.

mod layout;
mod raster;
mod svg;

use std::cell::RefCell;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

use crate::error::Result;
use crate::fonts::{CosmicTextMeasure, TextMeasure};

pub use layout::{TitleLayout, fit_title};
pub use raster::Rasterizer;
pub use svg::{GRADIENT_END, GRADIENT_START, compose_svg, escape_markup};

pub const DEFAULT_WIDTH: u32 = 900;
pub const DEFAULT_HEIGHT: u32 = 400;
pub const DEFAULT_FONT_SIZE: f32 = 48.0;
pub const DEFAULT_BACKGROUND: &str = "#1e293b";
pub const DEFAULT_TEXT_COLOR: &str = "#ffffff";

const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Parameters for one title card.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImageRequest {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Accepted for callers that pass it; the drawing uses a fixed gradient.
    pub background_color: String,
    /// Accepted for callers that pass it; titles are always drawn white.
    pub text_color: String,
    pub font_size: f32,
}

impl Default for ImageRequest {
    fn default() -> Self {
        Self {
            title: String::new(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            background_color: DEFAULT_BACKGROUND.to_string(),
            text_color: DEFAULT_TEXT_COLOR.to_string(),
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

impl ImageRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_colors(mut self, background: impl Into<String>, text: impl Into<String>) -> Self {
        self.background_color = background.into();
        self.text_color = text.into();
        self
    }
}

/// Anything that can turn a request into an image URL.
pub trait TitleImageSource {
    fn title_image(&mut self, request: &ImageRequest) -> Result<String>;
}

/// Measures, wraps and rasterises title cards.
pub struct TitleImageGenerator<M: TextMeasure = CosmicTextMeasure> {
    measure: M,
    rasterizer: Rasterizer,
}

impl TitleImageGenerator<CosmicTextMeasure> {
    pub fn new() -> Self {
        Self::with_measure(CosmicTextMeasure::new())
    }
}

impl Default for TitleImageGenerator<CosmicTextMeasure> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: TextMeasure> TitleImageGenerator<M> {
    pub fn with_measure(measure: M) -> Self {
        Self {
            measure,
            rasterizer: Rasterizer::new(),
        }
    }

    pub fn layout(&mut self, request: &ImageRequest) -> TitleLayout {
        fit_title(&request.title, request, &mut self.measure)
    }

    pub fn render_svg(&mut self, request: &ImageRequest) -> String {
        let layout = self.layout(request);
        tracing::debug!(
            font_size = layout.font_size,
            lines = layout.lines.len(),
            "Fitted title"
        );
        compose_svg(request, &layout)
    }

    /// Encoded PNG bytes.
    pub fn render_png(&mut self, request: &ImageRequest) -> Result<Vec<u8>> {
        let svg = self.render_svg(request);
        self.rasterizer
            .render_png(&svg, request.width, request.height)
    }

    /// `data:image/png;base64,...` URI, usable directly as an image source.
    pub fn generate(&mut self, request: &ImageRequest) -> Result<String> {
        let png = self.render_png(request)?;
        Ok(to_data_uri(&png))
    }
}

impl<M: TextMeasure> TitleImageSource for TitleImageGenerator<M> {
    fn title_image(&mut self, request: &ImageRequest) -> Result<String> {
        self.generate(request)
    }
}

thread_local! {
    static SHARED_GENERATOR: RefCell<TitleImageGenerator> = RefCell::new(TitleImageGenerator::new());
}

/// Generation with the system font stack.
///
/// Fonts are loaded on the first call from each thread and reused after
/// that. Callers rendering many cards can also keep their own
/// [`TitleImageGenerator`].
pub fn generate_title_image(request: &ImageRequest) -> Result<String> {
    SHARED_GENERATOR.with_borrow_mut(|generator| generator.generate(request))
}

fn to_data_uri(png: &[u8]) -> String {
    let mut uri = String::with_capacity(PNG_DATA_URI_PREFIX.len() + png.len() * 4 / 3 + 4);
    uri.push_str(PNG_DATA_URI_PREFIX);
    STANDARD.encode_string(png, &mut uri);
    uri
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::fonts::FixedWidthMeasure;

    fn decode(uri: &str) -> Vec<u8> {
        let payload = uri.strip_prefix(PNG_DATA_URI_PREFIX).expect("png data uri");
        STANDARD.decode(payload).expect("base64 payload")
    }

    #[test]
    fn request_defaults() {
        let request = ImageRequest::new("T");
        assert_eq!(request.width, 900);
        assert_eq!(request.height, 400);
        assert_eq!(request.font_size, 48.0);
    }

    #[test]
    fn request_deserializes_with_partial_fields() {
        let request: ImageRequest =
            serde_json::from_str(r#"{"title": "Hi", "width": 1200}"#).expect("json");
        assert_eq!(request.title, "Hi");
        assert_eq!(request.width, 1200);
        assert_eq!(request.height, DEFAULT_HEIGHT);
    }

    #[test]
    fn generates_png_data_uri_of_requested_size() {
        let request = ImageRequest::new(
            "A very very very long title that needs wrapping across several lines",
        );
        let uri = generate_title_image(&request).expect("generation");
        let png = decode(&uri);
        let size = imagesize::blob_size(&png).expect("png header");
        assert_eq!((size.width, size.height), (900, 400));
    }

    #[test]
    fn repeated_generation_reuses_the_thread_generator() {
        let request = ImageRequest::new("Same title").with_size(200, 100);
        let first = generate_title_image(&request).expect("first");
        let second = generate_title_image(&request).expect("second");
        assert_eq!(first, second);
        assert!(generate_title_image(&request.clone().with_size(100_000, 100_000)).is_err());
    }

    #[test]
    fn empty_and_huge_titles_still_generate() {
        let mut generator = TitleImageGenerator::with_measure(FixedWidthMeasure { ratio: 0.55 });
        for title in [String::new(), "overflow ".repeat(500)] {
            let uri = generator
                .generate(&ImageRequest::new(title).with_size(320, 160))
                .expect("generation");
            assert!(uri.len() > PNG_DATA_URI_PREFIX.len());
        }
    }

    #[test]
    fn zero_width_surface_fails() {
        let mut generator = TitleImageGenerator::with_measure(FixedWidthMeasure { ratio: 0.5 });
        let err = generator
            .generate(&ImageRequest::new("T").with_size(0, 400))
            .unwrap_err();
        assert!(matches!(err, Error::SurfaceUnavailable { width: 0, .. }));
    }

    #[test]
    fn colors_do_not_change_the_image() {
        let mut generator = TitleImageGenerator::with_measure(FixedWidthMeasure { ratio: 0.5 });
        let plain = ImageRequest::new("Same").with_size(120, 60);
        let tinted = plain.clone().with_colors("#000000", "#ff0000");
        assert_eq!(
            generator.render_png(&plain).expect("plain"),
            generator.render_png(&tinted).expect("tinted")
        );
    }
}
