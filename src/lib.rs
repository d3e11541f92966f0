//! Markdown-lite previews and generated title images for blog posts.

pub mod config;
pub mod error;
pub mod fonts;
pub mod markdown;
pub mod resolve;
pub mod stylesheet;
pub mod title_image;

pub use error::{Error, Result};
