//! Picks the image shown for a post.
//!
//! Precedence: the stored featured image, then a generated title card, then
//! a positional pick from the caller's fallback list. A featured image that
//! fails to load is replaced by the same positional fallback and is not
//! retried.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::title_image::{ImageRequest, TitleImageSource};

/// Intended card colours for post titles. The generator draws its fixed
/// gradient regardless.
pub const POST_BACKGROUND: &str = "#1e293b";
pub const POST_TEXT_COLOR: &str = "#f8fafc";

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// The two fields of a stored post this crate reads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlogPost {
    pub title: String,
    #[serde(default)]
    pub featured_image: Option<String>,
}

impl BlogPost {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            featured_image: None,
        }
    }

    pub fn with_featured_image(mut self, url: impl Into<String>) -> Self {
        self.featured_image = Some(url.into());
        self
    }

    /// Parses a stored post record such as `{"title": "...", "featured_image": null}`.
    pub fn from_json(record: &str) -> Result<Self> {
        Ok(serde_json::from_str(record)?)
    }

    fn featured(&self) -> Option<&str> {
        self.featured_image.as_deref().filter(|url| !url.is_empty())
    }
}

/// Ordered, non-empty list of substitute image URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackImages(Vec<String>);

impl FallbackImages {
    pub fn new(urls: Vec<String>) -> Result<Self> {
        if urls.is_empty() {
            return Err(Error::EmptyFallbackList);
        }
        Ok(Self(urls))
    }

    /// `urls[index mod len]`.
    pub fn pick(&self, index: usize) -> &str {
        &self.0[index % self.0.len()]
    }
}

/// Where the displayed image came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedImage {
    Featured(String),
    Generated(String),
    Fallback(String),
}

impl ResolvedImage {
    pub fn url(&self) -> &str {
        match self {
            ResolvedImage::Featured(url)
            | ResolvedImage::Generated(url)
            | ResolvedImage::Fallback(url) => url,
        }
    }

    pub fn source(&self) -> &'static str {
        match self {
            ResolvedImage::Featured(_) => "featured",
            ResolvedImage::Generated(_) => "generated",
            ResolvedImage::Fallback(_) => "fallback",
        }
    }

    /// Substitution for an image that failed to load in the display layer.
    pub fn on_load_error(fallbacks: &FallbackImages, index: usize) -> Self {
        ResolvedImage::Fallback(fallbacks.pick(index).to_string())
    }
}

impl fmt::Display for ResolvedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source(), self.url())
    }
}

/// Observes whether an image URL loads.
pub trait ImageProbe {
    fn loads(&self, url: &str) -> bool;
}

/// Treats every URL as loadable.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeLoads;

impl ImageProbe for AssumeLoads {
    fn loads(&self, _url: &str) -> bool {
        true
    }
}

/// Checks URLs with a blocking HEAD request; data URIs always load.
pub struct HttpProbe {
    agent: ureq::Agent,
}

impl HttpProbe {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(PROBE_TIMEOUT))
            .build()
            .into();
        Self { agent }
    }
}

impl Default for HttpProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageProbe for HttpProbe {
    fn loads(&self, url: &str) -> bool {
        if url.starts_with("data:") {
            return true;
        }
        match self.agent.head(url).call() {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(url, error = %e, "Image probe failed");
                false
            }
        }
    }
}

/// Featured image if set, else a generated title card, else the fallback at
/// `index`. Generation is not attempted when a featured image exists.
pub fn image_for_post<S: TitleImageSource + ?Sized>(
    post: &BlogPost,
    fallbacks: &FallbackImages,
    index: usize,
    source: &mut S,
) -> ResolvedImage {
    if let Some(url) = post.featured() {
        return ResolvedImage::Featured(url.to_string());
    }

    let request = ImageRequest::new(post.title.clone()).with_colors(POST_BACKGROUND, POST_TEXT_COLOR);
    match source.title_image(&request) {
        Ok(uri) => ResolvedImage::Generated(uri),
        Err(e) => {
            tracing::warn!(title = %post.title, error = %e, "Title image generation failed, using fallback");
            ResolvedImage::on_load_error(fallbacks, index)
        }
    }
}

/// [`image_for_post`] followed by the display layer's load check on a
/// featured image.
pub fn resolve_displayed<S, P>(
    post: &BlogPost,
    fallbacks: &FallbackImages,
    index: usize,
    source: &mut S,
    probe: &P,
) -> ResolvedImage
where
    S: TitleImageSource + ?Sized,
    P: ImageProbe + ?Sized,
{
    match image_for_post(post, fallbacks, index, source) {
        ResolvedImage::Featured(url) if !probe.loads(&url) => {
            tracing::warn!(url = %url, "Featured image did not load, using fallback");
            ResolvedImage::on_load_error(fallbacks, index)
        }
        resolved => resolved,
    }
}
