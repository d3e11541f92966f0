use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::stylesheet::{self, Stylesheet};

/// Which call site the markup is decorated for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Inline editor preview: utility classes, inline copy handler, ordered
    /// list numbers kept as text.
    Basic,
    /// Full-article and admin preview.
    #[default]
    Enhanced,
}

/// CSS classes attached to each element the renderer emits.
#[derive(Debug, Clone, Copy)]
pub struct ProfileStyle {
    pub h1: &'static str,
    pub h2: &'static str,
    pub h3: &'static str,
    pub strong: &'static str,
    pub em: &'static str,
    pub link: &'static str,
    pub image: &'static str,
    pub code_wrapper: &'static str,
    pub code_header: &'static str,
    pub code_lang: &'static str,
    pub copy_button: &'static str,
    pub code_pre: &'static str,
    pub inline_code: &'static str,
    pub list_item: &'static str,
    pub unordered_list: &'static str,
    pub ordered_list: &'static str,
    pub blockquote: &'static str,
}

const BASIC_STYLE: ProfileStyle = ProfileStyle {
    h1: "text-3xl font-bold mt-6 mb-4",
    h2: "text-2xl font-bold mt-5 mb-3",
    h3: "text-xl font-semibold mt-4 mb-2",
    strong: "font-bold",
    em: "italic",
    link: "text-blue-600 hover:underline",
    image: "preview-image",
    code_wrapper: "code-block",
    code_header: "code-block-header",
    code_lang: "code-block-lang",
    copy_button: "code-copy-btn",
    code_pre: "code-block-pre",
    inline_code: "bg-gray-100 rounded px-1",
    list_item: "ml-4",
    unordered_list: "list-disc pl-5 my-2",
    ordered_list: "list-decimal pl-5 my-2",
    blockquote: "border-l-4 border-gray-300 pl-4 italic text-gray-600",
};

const ENHANCED_STYLE: ProfileStyle = ProfileStyle {
    h1: "prose-h1",
    h2: "prose-h2",
    h3: "prose-h3",
    strong: "prose-strong",
    em: "prose-em",
    link: "prose-link",
    image: "prose-image fade-in",
    code_wrapper: "code-block code-block--enhanced",
    code_header: "code-block-header",
    code_lang: "code-block-lang",
    copy_button: "code-copy-btn code-copy-btn--enhanced",
    code_pre: "code-block-pre",
    inline_code: "prose-inline-code",
    list_item: "prose-li",
    unordered_list: "prose-ul",
    ordered_list: "prose-ol",
    blockquote: "prose-blockquote",
};

const ENHANCED_COPY_SCRIPT: &str = r#"function copyCode(id, button) {
  var el = document.getElementById(id);
  if (!el) return;
  navigator.clipboard.writeText(el.innerText).then(function () {
    var label = button.textContent;
    button.textContent = 'Copied!';
    setTimeout(function () { button.textContent = label; }, 2000);
  });
}"#;

impl Profile {
    pub fn style(self) -> &'static ProfileStyle {
        match self {
            Profile::Basic => &BASIC_STYLE,
            Profile::Enhanced => &ENHANCED_STYLE,
        }
    }

    /// `onclick` body for the Copy control of the code block with `id`.
    pub fn copy_handler(self, id: &str) -> String {
        match self {
            Profile::Basic => format!(
                "navigator.clipboard.writeText(document.getElementById('{id}').innerText)"
            ),
            Profile::Enhanced => format!("copyCode('{id}', this)"),
        }
    }

    /// Page-level script the copy handler depends on. Empty for the basic
    /// profile, whose handler is self-contained.
    pub fn copy_script(self) -> &'static str {
        match self {
            Profile::Basic => "",
            Profile::Enhanced => ENHANCED_COPY_SCRIPT,
        }
    }

    /// Whether `1. item` keeps its number as literal text.
    pub fn keeps_ordered_markers(self) -> bool {
        matches!(self, Profile::Basic)
    }

    /// Stylesheets the profile's markup expects to be present.
    pub fn stylesheets(self) -> &'static [&'static Stylesheet] {
        match self {
            Profile::Basic => &[&stylesheet::CODE_BLOCKS],
            Profile::Enhanced => &[
                &stylesheet::CODE_BLOCKS,
                &stylesheet::PROSE,
                &stylesheet::ANIMATIONS,
            ],
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Basic => f.write_str("basic"),
            Profile::Enhanced => f.write_str("enhanced"),
        }
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Profile::Basic),
            "enhanced" => Ok(Profile::Enhanced),
            other => Err(format!(
                "Unknown profile '{other}'. Available: basic, enhanced"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Profile;

    #[test]
    fn parses_profile_names_case_insensitively() {
        assert_eq!("Basic".parse::<Profile>(), Ok(Profile::Basic));
        assert_eq!(" enhanced ".parse::<Profile>(), Ok(Profile::Enhanced));
        assert!("fancy".parse::<Profile>().is_err());
    }

    #[test]
    fn basic_copy_handler_is_self_contained() {
        let handler = Profile::Basic.copy_handler("code-1");
        assert!(handler.contains("getElementById('code-1')"));
        assert!(Profile::Basic.copy_script().is_empty());
    }

    #[test]
    fn enhanced_copy_handler_calls_page_script() {
        assert_eq!(
            Profile::Enhanced.copy_handler("code-1"),
            "copyCode('code-1', this)"
        );
        assert!(Profile::Enhanced.copy_script().contains("function copyCode"));
    }

    #[test]
    fn profiles_list_the_stylesheets_their_markup_uses() {
        let ids = |profile: Profile| -> Vec<&'static str> {
            profile.stylesheets().iter().map(|sheet| sheet.id).collect()
        };
        assert_eq!(ids(Profile::Basic), vec![crate::stylesheet::CODE_BLOCKS.id]);
        assert_eq!(
            ids(Profile::Enhanced),
            vec![
                crate::stylesheet::CODE_BLOCKS.id,
                crate::stylesheet::PROSE.id,
                crate::stylesheet::ANIMATIONS.id,
            ]
        );
    }
}
