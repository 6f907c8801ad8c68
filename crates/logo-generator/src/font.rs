//! Font discovery and the built-in bitmap fallback.

use ab_glyph::FontVec;
use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Font candidates tried in order when no custom list is given.
pub const DEFAULT_FONT_CANDIDATES: &[&str] = &[
    "arial.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
];

/// Side length of a bitmap glyph cell.
pub const GLYPH_CELLS: u32 = 8;

pub enum LoadedFont {
    TrueType(FontVec),
    Bitmap,
}

/// First candidate that exists and parses, else the bitmap font.
pub fn load_font(candidates: &[PathBuf]) -> LoadedFont {
    for path in candidates {
        if !path.exists() {
            continue;
        }
        match read_font(path) {
            Some(font) => {
                debug!(path = %path.display(), "Using font");
                return LoadedFont::TrueType(font);
            }
            None => warn!(path = %path.display(), "Skipping unreadable font"),
        }
    }

    debug!("No font candidate found, using built-in bitmap font");
    LoadedFont::Bitmap
}

fn read_font(path: &Path) -> Option<FontVec> {
    let data = std::fs::read(path).ok()?;
    FontVec::try_from_vec(data).ok()
}

fn glyph(c: char) -> [u8; 8] {
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

/// Draw `text` with the bitmap font, each glyph cell `block` pixels wide.
pub fn draw_bitmap_text(
    canvas: &mut RgbaImage,
    color: Rgba<u8>,
    x: i32,
    y: i32,
    block: u32,
    text: &str,
) {
    let advance = (GLYPH_CELLS * block) as i32;

    for (index, c) in text.chars().enumerate() {
        let origin_x = x + index as i32 * advance;
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_CELLS {
                if bits & (1 << col) == 0 {
                    continue;
                }
                let rect = Rect::at(
                    origin_x + (col * block) as i32,
                    y + (row as u32 * block) as i32,
                )
                .of_size(block, block);
                draw_filled_rect_mut(canvas, rect, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_candidates_fall_back_to_bitmap() {
        let font = load_font(&[PathBuf::from("/nonexistent/font.ttf")]);
        assert!(matches!(font, LoadedFont::Bitmap));
    }

    #[test]
    fn test_garbage_font_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();

        assert!(matches!(load_font(&[path]), LoadedFont::Bitmap));
    }

    #[test]
    fn test_unknown_char_uses_placeholder_glyph() {
        assert_eq!(glyph('\u{1F600}'), glyph('?'));
        assert_ne!(glyph('A'), [0; 8]);
    }

    #[test]
    fn test_accented_letters_have_glyphs() {
        for c in ['Ä', 'é', 'ß', 'ñ'] {
            assert_ne!(glyph(c), glyph('?'), "{}", c);
            assert_ne!(glyph(c), [0; 8], "{}", c);
        }
    }
}
