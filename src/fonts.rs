use std::num::NonZeroUsize;

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, Style, Weight};
use lru::LruCache;

const MEASURE_CACHE_CAPACITY: usize = 1024;

/// Face selection for a measurement.
#[derive(Debug, Clone, Copy, Default, Hash, PartialEq, Eq)]
pub struct FontStyle {
    pub bold: bool,
    pub italic: bool,
    pub monospace: bool,
}

impl FontStyle {
    pub const BOLD: Self = Self {
        bold: true,
        italic: false,
        monospace: false,
    };
}

#[derive(Hash, PartialEq, Eq, Clone)]
struct MeasureKey {
    text: String,
    font_size_bits: u32,
    style: FontStyle,
    max_width_bits: Option<u32>,
}

/// Measures rendered text extents as `(width, height)` in pixels.
pub trait TextMeasure {
    fn measure_text(
        &mut self,
        text: &str,
        font_size: f32,
        style: FontStyle,
        max_width: Option<f32>,
    ) -> (f32, f32);
}

impl<T: TextMeasure + ?Sized> TextMeasure for &mut T {
    fn measure_text(
        &mut self,
        text: &str,
        font_size: f32,
        style: FontStyle,
        max_width: Option<f32>,
    ) -> (f32, f32) {
        (**self).measure_text(text, font_size, style, max_width)
    }
}

/// Shapes text with `cosmic-text` against the system fonts.
///
/// The fit loop re-measures the same candidate lines at several font sizes,
/// so results are kept in a bounded LRU cache.
pub struct CosmicTextMeasure {
    font_system: FontSystem,
    cache: LruCache<MeasureKey, (f32, f32)>,
}

impl CosmicTextMeasure {
    pub fn new() -> Self {
        Self::with_font_system(FontSystem::new())
    }

    pub fn with_font_system(font_system: FontSystem) -> Self {
        let capacity = NonZeroUsize::new(MEASURE_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self {
            font_system,
            cache: LruCache::new(capacity),
        }
    }
}

impl TextMeasure for CosmicTextMeasure {
    fn measure_text(
        &mut self,
        text: &str,
        font_size: f32,
        style: FontStyle,
        max_width: Option<f32>,
    ) -> (f32, f32) {
        // cosmic-text cannot lay out a zero or non-finite line height.
        if !(font_size.is_finite() && font_size > 0.0) {
            return (0.0, 0.0);
        }

        let key = MeasureKey {
            text: text.to_string(),
            font_size_bits: font_size.to_bits(),
            style,
            max_width_bits: max_width.map(f32::to_bits),
        };

        if let Some(cached) = self.cache.get(&key) {
            return *cached;
        }

        let line_height = font_size * 1.2;
        let mut buffer = Buffer::new(
            &mut self.font_system,
            Metrics {
                font_size,
                line_height,
            },
        );

        buffer.set_size(&mut self.font_system, max_width, None);

        let attrs = Attrs::new()
            .family(if style.monospace {
                Family::Monospace
            } else {
                Family::SansSerif
            })
            .weight(if style.bold {
                Weight::BOLD
            } else {
                Weight::NORMAL
            })
            .style(if style.italic {
                Style::Italic
            } else {
                Style::Normal
            });

        buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced, None);

        let mut total_width: f32 = 0.0;
        let mut total_height: f32 = 0.0;

        for run in buffer.layout_runs() {
            total_width = total_width.max(run.line_w);
            total_height += run.line_height;
        }

        let measured = (total_width, total_height);
        self.cache.put(key, measured);
        measured
    }
}

impl Default for CosmicTextMeasure {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic measurer for layout tests: every char is `ratio` ems wide.
#[cfg(test)]
pub(crate) struct FixedWidthMeasure {
    pub ratio: f32,
}

#[cfg(test)]
impl TextMeasure for FixedWidthMeasure {
    fn measure_text(
        &mut self,
        text: &str,
        font_size: f32,
        _style: FontStyle,
        _max_width: Option<f32>,
    ) -> (f32, f32) {
        let width = text.chars().count() as f32 * font_size * self.ratio;
        (width, font_size * 1.2)
    }
}
