use super::ImageRequest;
use super::layout::TitleLayout;

pub const GRADIENT_START: &str = "#667eea";
pub const GRADIENT_END: &str = "#764ba2";
pub const TITLE_FILL: &str = "#ffffff";
const TITLE_FONT_FAMILY: &str = "sans-serif";
/// Baseline offset from a line's vertical centre, in ems.
const CENTER_BASELINE_SHIFT: f32 = 0.35;

/// Builds the title card as SVG: a diagonal gradient with the wrapped title
/// centred on it.
///
/// The request's `background_color` and `text_color` do not reach the
/// drawing; the gradient and white text are fixed.
pub fn compose_svg(request: &ImageRequest, layout: &TitleLayout) -> String {
    let width = request.width;
    let height = request.height;

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}"><defs><linearGradient id="title-bg" gradientUnits="userSpaceOnUse" x1="0" y1="0" x2="{width}" y2="{height}"><stop offset="0" stop-color="{GRADIENT_START}"/><stop offset="1" stop-color="{GRADIENT_END}"/></linearGradient></defs><rect width="{width}" height="{height}" fill="url(#title-bg)"/>"#
    );

    let center_x = width as f32 / 2.0;
    let first_center = (height as f32 - layout.block_height()) / 2.0 + layout.line_height / 2.0;

    for (idx, line) in layout.lines.iter().enumerate() {
        let baseline = first_center
            + idx as f32 * layout.line_height
            + layout.font_size * CENTER_BASELINE_SHIFT;
        svg.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" font-family="{}" font-size="{:.2}" font-weight="700" fill="{}">{}</text>"#,
            center_x,
            baseline,
            TITLE_FONT_FAMILY,
            layout.font_size,
            TITLE_FILL,
            escape_markup(line),
        ));
    }

    svg.push_str("</svg>");
    svg
}

/// Characters allowed in an XML 1.0 document.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | ' '..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..)
}

/// Removes characters the SVG parser would reject, so a title measures the
/// same way it is later drawn.
pub(crate) fn strip_non_xml_chars(text: &str) -> String {
    text.chars().filter(|&c| is_xml_char(c)).collect()
}

/// Escapes text for SVG or HTML content and attribute values, dropping
/// characters XML cannot carry.
pub fn escape_markup(text: &str) -> String {
    text.chars()
        .filter(|&c| is_xml_char(c))
        .fold(String::with_capacity(text.len()), |mut out, c| {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&apos;"),
                _ => out.push(c),
            }
            out
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(lines: &[&str]) -> TitleLayout {
        TitleLayout {
            font_size: 40.0,
            line_height: 48.0,
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[test]
    fn gradient_runs_corner_to_corner_with_fixed_colors() {
        let request = ImageRequest::new("x").with_colors("#000000", "#ff0000");
        let svg = compose_svg(&request, &layout(&["x"]));
        assert!(svg.contains(r#"x1="0" y1="0" x2="900" y2="400""#));
        assert!(svg.contains(GRADIENT_START));
        assert!(svg.contains(GRADIENT_END));
        assert!(!svg.contains("#000000"));
        assert!(!svg.contains("#ff0000"));
    }

    #[test]
    fn lines_are_centred_and_bold_white() {
        let request = ImageRequest::new("two lines");
        let svg = compose_svg(&request, &layout(&["two", "lines"]));
        // Block is 96px tall, so centres sit at 176 and 224.
        assert!(svg.contains(r#"<text x="450.00" y="190.00" text-anchor="middle""#));
        assert!(svg.contains(r#"<text x="450.00" y="238.00" text-anchor="middle""#));
        assert_eq!(svg.matches(r##"font-weight="700" fill="#ffffff""##).count(), 2);
    }

    #[test]
    fn control_chars_are_dropped_from_titles() {
        assert_eq!(strip_non_xml_chars("Release\u{0007} notes\u{000C}"), "Release notes");
        assert_eq!(strip_non_xml_chars("tab\tand\nnewline"), "tab\tand\nnewline");
        assert_eq!(escape_markup("bell\u{0007}"), "bell");
    }

    #[test]
    fn markup_characters_are_escaped() {
        assert_eq!(
            escape_markup(r#"<Rust> & "friends" it's"#),
            "&lt;Rust&gt; &amp; &quot;friends&quot; it&apos;s"
        );
    }

    #[test]
    fn title_markup_is_escaped() {
        let request = ImageRequest::new("<script>");
        let svg = compose_svg(&request, &layout(&["<script>"]));
        assert!(svg.contains("&lt;script&gt;"));
    }
}
