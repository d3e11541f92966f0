use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::markdown::Profile;
use crate::resolve::FallbackImages;
use crate::title_image::{
    DEFAULT_BACKGROUND, DEFAULT_FONT_SIZE, DEFAULT_HEIGHT, DEFAULT_TEXT_COLOR, DEFAULT_WIDTH,
    ImageRequest,
};

const DEFAULT_FALLBACK_IMAGES: &[&str] = &[
    "/images/fallback/blog-1.jpg",
    "/images/fallback/blog-2.jpg",
    "/images/fallback/blog-3.jpg",
];

/// Settings file contents. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub image: ImageDefaults,
    #[serde(default)]
    pub render: RenderSettings,
    #[serde(default)]
    pub fallback: FallbackSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDefaults {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default = "default_background")]
    pub background_color: String,
    #[serde(default = "default_text_color")]
    pub text_color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    #[serde(default)]
    pub profile: Profile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackSettings {
    #[serde(default = "default_fallback_images")]
    pub images: Vec<String>,
}

fn default_width() -> u32 {
    DEFAULT_WIDTH
}
fn default_height() -> u32 {
    DEFAULT_HEIGHT
}
fn default_font_size() -> f32 {
    DEFAULT_FONT_SIZE
}
fn default_background() -> String {
    DEFAULT_BACKGROUND.to_string()
}
fn default_text_color() -> String {
    DEFAULT_TEXT_COLOR.to_string()
}
fn default_fallback_images() -> Vec<String> {
    DEFAULT_FALLBACK_IMAGES.iter().map(|s| s.to_string()).collect()
}

impl Default for ImageDefaults {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            font_size: DEFAULT_FONT_SIZE,
            background_color: default_background(),
            text_color: default_text_color(),
        }
    }
}

impl Default for FallbackSettings {
    fn default() -> Self {
        Self {
            images: default_fallback_images(),
        }
    }
}

impl ImageDefaults {
    pub fn request(&self, title: impl Into<String>) -> ImageRequest {
        ImageRequest::new(title)
            .with_size(self.width, self.height)
            .with_font_size(self.font_size)
            .with_colors(self.background_color.clone(), self.text_color.clone())
    }
}

impl FallbackSettings {
    pub fn images(&self) -> Result<FallbackImages> {
        FallbackImages::new(self.images.clone())
    }
}

impl Settings {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse YAML: {}", e)))
    }

    /// Reads a settings file, trying TOML first and YAML second.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        if let Ok(settings) = Self::from_toml(&content) {
            Ok(settings)
        } else if let Ok(settings) = Self::from_yaml(&content) {
            Ok(settings)
        } else {
            Err(Error::Config(format!(
                "Failed to parse {} as TOML or YAML",
                path.display()
            )))
        }
    }
}
