//! Branding badge renderer.
//!
//! Draws a rounded rectangle on a transparent 600x200 canvas and centers a
//! short text on it, using the first usable TrueType font from a candidate
//! list or a built-in bitmap font when none can be loaded.

mod error;
mod font;
mod render;

pub use error::LogoError;
pub use render::{truncate_text, LogoGenerator, HEIGHT, MAX_TEXT_CHARS, WIDTH};
