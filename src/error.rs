//! Error type shared by the library and the CLI.

/// Errors raised by inkpost.
///
/// Markdown rendering never fails; everything here comes from image
/// generation, configuration, or I/O in the CLI.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No raster surface of the requested size could be allocated.
    #[error("cannot allocate a {width}x{height} drawing surface")]
    SurfaceUnavailable { width: u32, height: u32 },

    /// The generated SVG could not be parsed back for rasterising.
    #[error("failed to parse generated SVG: {0}")]
    Svg(String),

    /// PNG encoding failed.
    #[error("failed to encode PNG: {0}")]
    Encode(String),

    /// A fallback image list must hold at least one URL.
    #[error("fallback image list is empty")]
    EmptyFallbackList,

    /// Configuration could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
