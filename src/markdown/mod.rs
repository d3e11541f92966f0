//! Markdown-lite to HTML for post previews.
//!
//! This is a fixed sequence of textual substitutions, not a parser: each pass
//! sees the markup produced by the passes before it, so the order in
//! [`MarkdownRenderer::render`] matters. Source text is trusted and is never
//! escaped; raw HTML in a post passes straight through.

mod ids;
mod profile;

use std::sync::LazyLock;

use regex::{Captures, Regex};

pub use ids::{IdGenerator, RandomIds, SequentialIds};
pub use profile::{Profile, ProfileStyle};

const IMAGE_STYLE: &str = "max-width: 100%; height: auto; border-radius: 8px; margin: 16px 0;";
const INLINE_CODE_STYLE: &str = "font-family: ui-monospace, SFMono-Regular, Menlo, Consolas, monospace; font-size: 0.9em; padding: 2px 4px; border-radius: 4px;";
const DEFAULT_CODE_LABEL: &str = "code";
const LINE_BREAK: &str = "<br>";

/// Tags list items from `N. ` lines until the list pass decides the wrapper.
const ORDERED_MARK: char = '\u{E000}';

static H3_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^### (.*)$").unwrap());
static H2_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^## (.*)$").unwrap());
static H1_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^# (.*)$").unwrap());

static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static ITALIC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.+?)\*").unwrap());

/// Captures a leading `!` so image syntax can be left for the image pass.
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(!?)\[([^\]]+)\]\(([^)]+)\)").unwrap());
static IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").unwrap());

static FENCED_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(\w*)\n([\s\S]*?)```").unwrap());
static INLINE_CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());

static UNORDERED_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\* (.+)$").unwrap());
static ORDERED_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(\d+\. )(.+)$").unwrap());

static BLOCKQUOTE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^> (.+)$").unwrap());

static LIST_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("<li(\u{E000})?(?:\\s[^>]*)?>.*?</li>").unwrap());

/// Renders with the enhanced profile and random code-block ids.
pub fn render(source: &str) -> String {
    MarkdownRenderer::new(Profile::Enhanced).render(source)
}

/// Markdown-lite renderer for one styling profile.
pub struct MarkdownRenderer<G: IdGenerator = RandomIds> {
    profile: Profile,
    ids: G,
}

impl MarkdownRenderer<RandomIds> {
    pub fn new(profile: Profile) -> Self {
        Self::with_ids(profile, RandomIds)
    }
}

impl<G: IdGenerator> MarkdownRenderer<G> {
    pub fn with_ids(profile: Profile, ids: G) -> Self {
        Self { profile, ids }
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn render(&mut self, source: &str) -> String {
        let style = self.profile.style();
        self.ids.reset();

        let html = render_headers(source, style);
        let html = render_emphasis(&html, style);
        let html = render_links(&html, style);
        let html = render_images(&html, style);
        let html = self.render_code_blocks(&html);
        let html = render_inline_code(&html, style);
        let html = render_list_items(&html, self.profile);
        let html = BLOCKQUOTE_RE.replace_all(
            &html,
            format!(r#"<blockquote class="{}">${{1}}</blockquote>"#, style.blockquote).as_str(),
        );
        let html = html.replace('\n', LINE_BREAK);
        wrap_list_runs(&html, self.profile)
    }

    fn render_code_blocks(&mut self, html: &str) -> String {
        let profile = self.profile;
        let style = profile.style();
        let ids = &mut self.ids;

        FENCED_CODE_RE
            .replace_all(html, |caps: &Captures<'_>| {
                let lang = &caps[1];
                let label = if lang.is_empty() {
                    DEFAULT_CODE_LABEL
                } else {
                    lang
                };
                let lang_class = if lang.is_empty() {
                    String::new()
                } else {
                    format!(r#" class="language-{lang}""#)
                };
                let id = ids.next_id();

                format!(
                    concat!(
                        r#"<div class="{wrapper}"><div class="{header}">"#,
                        r#"<span class="{lang_label}">{label}</span>"#,
                        r#"<button type="button" class="{button}" onclick="{handler}">Copy</button>"#,
                        r#"</div><pre class="{pre}"><code id="{id}"{lang_class}>{body}</code></pre></div>"#,
                    ),
                    wrapper = style.code_wrapper,
                    header = style.code_header,
                    lang_label = style.code_lang,
                    label = label,
                    button = style.copy_button,
                    handler = profile.copy_handler(&id),
                    pre = style.code_pre,
                    id = id,
                    lang_class = lang_class,
                    body = caps[2].trim(),
                )
            })
            .into_owned()
    }
}

fn render_headers(source: &str, style: &ProfileStyle) -> String {
    let html = H3_RE.replace_all(
        source,
        format!(r#"<h3 class="{}">${{1}}</h3>"#, style.h3).as_str(),
    );
    let html = H2_RE.replace_all(
        &html,
        format!(r#"<h2 class="{}">${{1}}</h2>"#, style.h2).as_str(),
    );
    H1_RE
        .replace_all(
            &html,
            format!(r#"<h1 class="{}">${{1}}</h1>"#, style.h1).as_str(),
        )
        .into_owned()
}

/// Bold first, so `**x**` is not eaten by the single-asterisk rule.
fn render_emphasis(html: &str, style: &ProfileStyle) -> String {
    let html = BOLD_RE.replace_all(
        html,
        format!(r#"<strong class="{}">${{1}}</strong>"#, style.strong).as_str(),
    );
    ITALIC_RE
        .replace_all(
            &html,
            format!(r#"<em class="{}">${{1}}</em>"#, style.em).as_str(),
        )
        .into_owned()
}

fn render_links(html: &str, style: &ProfileStyle) -> String {
    LINK_RE
        .replace_all(html, |caps: &Captures<'_>| {
            if !caps[1].is_empty() {
                return caps[0].to_string();
            }
            format!(
                r#"<a href="{}" target="_blank" rel="noopener noreferrer" class="{}">{}</a>"#,
                &caps[3], style.link, &caps[2]
            )
        })
        .into_owned()
}

fn render_images(html: &str, style: &ProfileStyle) -> String {
    IMAGE_RE
        .replace_all(
            html,
            format!(
                r#"<img src="${{2}}" alt="${{1}}" class="{}" style="{IMAGE_STYLE}" />"#,
                style.image
            )
            .as_str(),
        )
        .into_owned()
}

fn render_inline_code(html: &str, style: &ProfileStyle) -> String {
    INLINE_CODE_RE
        .replace_all(
            html,
            format!(
                r#"<code class="{}" style="{INLINE_CODE_STYLE}">${{1}}</code>"#,
                style.inline_code
            )
            .as_str(),
        )
        .into_owned()
}

fn render_list_items(html: &str, profile: Profile) -> String {
    let style = profile.style();
    let html = UNORDERED_ITEM_RE.replace_all(
        html,
        format!(r#"<li class="{}">${{1}}</li>"#, style.list_item).as_str(),
    );

    ORDERED_ITEM_RE
        .replace_all(&html, |caps: &Captures<'_>| {
            let marker = if profile.keeps_ordered_markers() {
                &caps[1]
            } else {
                ""
            };
            format!(
                r#"<li{ORDERED_MARK} class="{}">{marker}{}</li>"#,
                style.list_item, &caps[2]
            )
        })
        .into_owned()
}

struct ListRun {
    ordered: bool,
    items: String,
}

impl ListRun {
    fn close_into(self, out: &mut String, style: &ProfileStyle) {
        let (tag, class) = if self.ordered {
            ("ol", style.ordered_list)
        } else {
            ("ul", style.unordered_list)
        };
        out.push_str(&format!(r#"<{tag} class="{class}">{}</{tag}>"#, self.items));
    }
}

/// Wraps each run of adjacent `<li>` elements in a single list element.
///
/// Items are adjacent when only one line break separates them. The line
/// breaks inside a run, and the one right after it, belong to the list.
fn wrap_list_runs(html: &str, profile: Profile) -> String {
    let style = profile.style();
    let mut out = String::with_capacity(html.len() + 64);
    let mut cursor = 0;
    let mut run: Option<ListRun> = None;

    for caps in LIST_ITEM_RE.captures_iter(html) {
        let Some(item) = caps.get(0) else {
            continue;
        };
        let ordered = caps.get(1).is_some() && !profile.keeps_ordered_markers();
        let gap = &html[cursor..item.start()];

        let continues = run
            .as_ref()
            .is_some_and(|current| current.ordered == ordered && (gap.is_empty() || gap == LINE_BREAK));

        if !continues {
            let gap = match run.take() {
                Some(finished) => {
                    finished.close_into(&mut out, style);
                    gap.strip_prefix(LINE_BREAK).unwrap_or(gap)
                }
                None => gap,
            };
            out.push_str(gap);
            run = Some(ListRun {
                ordered,
                items: String::new(),
            });
        }

        if let Some(current) = run.as_mut() {
            current
                .items
                .extend(item.as_str().chars().filter(|&c| c != ORDERED_MARK));
        }
        cursor = item.end();
    }

    let rest = &html[cursor..];
    let rest = match run.take() {
        Some(finished) => {
            finished.close_into(&mut out, style);
            rest.strip_prefix(LINE_BREAK).unwrap_or(rest)
        }
        None => rest,
    };
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn enhanced(source: &str) -> String {
        MarkdownRenderer::with_ids(Profile::Enhanced, SequentialIds::default()).render(source)
    }

    fn basic(source: &str) -> String {
        MarkdownRenderer::with_ids(Profile::Basic, SequentialIds::default()).render(source)
    }

    #[test]
    fn plain_text_only_gains_line_breaks() {
        assert_eq!(
            enhanced("hello there\nsecond line\n"),
            "hello there<br>second line<br>"
        );
    }

    #[test]
    fn headers_match_longest_prefix_first() {
        assert_eq!(enhanced("# Title"), r#"<h1 class="prose-h1">Title</h1>"#);
        assert_eq!(enhanced("## Title"), r#"<h2 class="prose-h2">Title</h2>"#);
        assert_eq!(enhanced("### Title"), r#"<h3 class="prose-h3">Title</h3>"#);
    }

    #[test]
    fn headers_must_start_the_line() {
        assert_eq!(enhanced("not # a header"), "not # a header");
    }

    #[test]
    fn bold_wins_over_italic() {
        let html = enhanced("**bold**");
        assert_eq!(html, r#"<strong class="prose-strong">bold</strong>"#);
        assert!(!html.contains('*'));
    }

    #[test]
    fn italic_wraps_single_asterisks() {
        assert_eq!(enhanced("*italic*"), r#"<em class="prose-em">italic</em>"#);
    }

    #[test]
    fn links_open_in_new_context_without_opener() {
        let html = enhanced("[x](http://e.com)");
        assert!(html.contains(r#"href="http://e.com""#));
        assert!(html.contains(r#"target="_blank""#));
        assert!(html.contains(r#"rel="noopener noreferrer""#));
        assert!(html.contains(">x</a>"));
    }

    #[test]
    fn adjacent_links_both_render() {
        let html = basic("[a](http://a)[b](http://b)");
        assert_eq!(html.matches("<a href=").count(), 2);
    }

    #[test]
    fn image_syntax_is_not_taken_by_the_link_pass() {
        let html = enhanced("![cover](http://e.com/c.png)");
        assert!(html.starts_with(r#"<img src="http://e.com/c.png" alt="cover""#));
        assert!(html.contains("max-width: 100%; height: auto;"));
        assert!(!html.contains("<a "));
    }

    #[test]
    fn fenced_block_has_label_copy_control_and_trimmed_body() {
        let html = enhanced("```js\nconsole.log(1)\n```");
        assert!(html.contains(r#"<span class="code-block-lang">js</span>"#));
        assert!(html.contains(r#"onclick="copyCode('code-1', this)">Copy</button>"#));
        assert!(html.contains(r#"<code id="code-1" class="language-js">console.log(1)</code>"#));
    }

    #[test]
    fn fenced_block_without_language_is_labelled_code() {
        let html = basic("```\nls -la\n```");
        assert!(html.contains(r#"<span class="code-block-lang">code</span>"#));
        assert!(html.contains(r#"<code id="code-1">ls -la</code>"#));
        assert!(html.contains("navigator.clipboard.writeText(document.getElementById('code-1').innerText)"));
    }

    #[test]
    fn fenced_block_ids_are_unique_within_a_render() {
        let html = enhanced("```\na\n```\n```\nb\n```");
        assert!(html.contains(r#"id="code-1""#));
        assert!(html.contains(r#"id="code-2""#));
    }

    #[test]
    fn stable_ids_make_renders_idempotent() {
        let mut renderer = MarkdownRenderer::with_ids(Profile::Enhanced, SequentialIds::default());
        let source = "```rust\nfn main() {}\n```";
        assert_eq!(renderer.render(source), renderer.render(source));
    }

    #[test]
    fn random_ids_differ_between_renders() {
        let mut renderer = MarkdownRenderer::new(Profile::Enhanced);
        let source = "```\nx\n```";
        assert_ne!(renderer.render(source), renderer.render(source));
    }

    #[test]
    fn inline_code_runs_after_fences() {
        let html = enhanced("use `cargo` here");
        assert!(html.starts_with("use <code class=\"prose-inline-code\""));
        assert!(html.ends_with(">cargo</code> here"));
    }

    #[test]
    fn consecutive_items_share_one_list() {
        assert_eq!(
            enhanced("* one\n* two"),
            r#"<ul class="prose-ul"><li class="prose-li">one</li><li class="prose-li">two</li></ul>"#
        );
    }

    #[test]
    fn separated_items_form_separate_lists() {
        let html = enhanced("* one\n\n* two");
        assert_eq!(html.matches("<ul").count(), 2);
    }

    #[test]
    fn enhanced_ordered_items_drop_their_numbers() {
        assert_eq!(
            enhanced("1. first\n2. second\nafter"),
            r#"<ol class="prose-ol"><li class="prose-li">first</li><li class="prose-li">second</li></ol>after"#
        );
    }

    #[test]
    fn basic_ordered_items_keep_their_numbers() {
        assert_eq!(
            basic("1. first\n2. second"),
            r#"<ul class="list-disc pl-5 my-2"><li class="ml-4">1. first</li><li class="ml-4">2. second</li></ul>"#
        );
    }

    #[test]
    fn list_kind_change_starts_a_new_list() {
        let html = enhanced("* a\n1. b");
        assert!(html.starts_with(r#"<ul class="prose-ul"><li class="prose-li">a</li></ul><ol"#));
        assert!(html.ends_with("</ol>"));
    }

    #[test]
    fn blockquote_lines() {
        assert_eq!(
            basic("> wise words"),
            r#"<blockquote class="border-l-4 border-gray-300 pl-4 italic text-gray-600">wise words</blockquote>"#
        );
    }

    #[test]
    fn raw_html_passes_through() {
        assert_eq!(enhanced("<b>raw</b> & <i>x</i>"), "<b>raw</b> & <i>x</i>");
    }

    #[test]
    fn raw_link_tags_are_not_list_items() {
        let html = enhanced(r#"<link rel="x">"#);
        assert_eq!(html, r#"<link rel="x">"#);
    }

    #[test]
    fn malformed_syntax_is_left_alone() {
        assert_eq!(enhanced("**unclosed [link]("), "**unclosed [link](");
    }

    #[test]
    fn profiles_differ_only_in_decoration() {
        let source = "# Hi\n**there**";
        let a = basic(source);
        let b = enhanced(source);
        assert_ne!(a, b);
        assert!(a.contains(">Hi</h1><br><strong"));
        assert!(b.contains(">Hi</h1><br><strong"));
    }

    proptest! {
        #[test]
        fn text_without_syntax_is_unchanged_but_for_breaks(source in "[a-zA-Z0-9 ,;:'?\n-]{0,120}") {
            prop_assert_eq!(enhanced(&source), source.replace('\n', "<br>"));
            prop_assert_eq!(basic(&source), source.replace('\n', "<br>"));
        }

        #[test]
        fn rendering_never_panics(source in "\\PC{0,200}") {
            let _ = enhanced(&source);
            let _ = basic(&source);
        }
    }
}
