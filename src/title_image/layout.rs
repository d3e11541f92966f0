use crate::fonts::{FontStyle, TextMeasure};

use super::svg::strip_non_xml_chars;
use super::{DEFAULT_FONT_SIZE, ImageRequest};

/// Share of the surface width a line may occupy.
pub const MAX_WIDTH_RATIO: f32 = 0.85;
/// Share of the surface height the text block should fit in.
pub const MAX_HEIGHT_RATIO: f32 = 0.8;
pub const LINE_HEIGHT_RATIO: f32 = 1.2;
pub const MIN_FONT_SIZE: f32 = 24.0;
pub const FONT_SIZE_STEP: f32 = 2.0;

/// Wrapped title and the font size it was fitted at.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleLayout {
    pub font_size: f32,
    pub line_height: f32,
    pub lines: Vec<String>,
}

impl TitleLayout {
    pub fn block_height(&self) -> f32 {
        self.lines.len() as f32 * self.line_height
    }
}

/// Finds the largest font size, stepping down from the requested one, at
/// which the wrapped title fits the surface. Below [`MIN_FONT_SIZE`] the
/// block is allowed to overflow.
pub fn fit_title<M: TextMeasure>(title: &str, request: &ImageRequest, measure: &mut M) -> TitleLayout {
    let title = strip_non_xml_chars(title);
    let words: Vec<&str> = title.split_whitespace().collect();
    let max_width = request.width as f32 * MAX_WIDTH_RATIO;
    let max_height = request.height as f32 * MAX_HEIGHT_RATIO;

    let mut font_size = starting_font_size(request);
    loop {
        let lines = wrap_words(&words, font_size, max_width, measure);
        let line_height = font_size * LINE_HEIGHT_RATIO;
        let block_height = lines.len() as f32 * line_height;

        if block_height <= max_height || font_size - FONT_SIZE_STEP < MIN_FONT_SIZE {
            return TitleLayout {
                font_size,
                line_height,
                lines,
            };
        }
        font_size -= FONT_SIZE_STEP;
    }
}

/// Requested size, or the default when it is not a positive finite number.
///
/// A font taller than the surface can never fit, so the search starts no
/// higher than the surface height; this also bounds the number of steps.
fn starting_font_size(request: &ImageRequest) -> f32 {
    let requested = if request.font_size.is_finite() && request.font_size > 0.0 {
        request.font_size
    } else {
        tracing::debug!(font_size = request.font_size, "Unusable font size, using default");
        DEFAULT_FONT_SIZE
    };
    requested.min((request.height as f32).max(MIN_FONT_SIZE))
}

/// Greedy packing: a line takes words while `line + " " + word` fits.
fn wrap_words<M: TextMeasure>(
    words: &[&str],
    font_size: f32,
    max_width: f32,
    measure: &mut M,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in words {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }

        let candidate = format!("{current} {word}");
        let (width, _) = measure.measure_text(&candidate, font_size, FontStyle::BOLD, None);
        if width <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, (*word).to_string()));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
