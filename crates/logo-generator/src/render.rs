//! Badge rendering.

use crate::error::LogoError;
use crate::font::{draw_bitmap_text, load_font, LoadedFont, DEFAULT_FONT_CANDIDATES, GLYPH_CELLS};
use ab_glyph::{point, Font, FontVec, GlyphId, PxScale, ScaleFont};
use image::{ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};
use tracing::info;

pub const WIDTH: u32 = 600;
pub const HEIGHT: u32 = 200;

/// Longest text drawn on the badge, in characters.
pub const MAX_TEXT_CHARS: usize = 20;

const MARGIN: u32 = 10;
const CORNER_RADIUS: u32 = 20;
const FONT_SIZE: f32 = 110.0;
/// Text is lifted this many pixels above the exact vertical center.
const TEXT_LIFT: i32 = 10;

const TRANSPARENT: Rgba<u8> = Rgba([255, 255, 255, 0]);
const BADGE_FILL: Rgba<u8> = Rgba([20, 50, 120, 230]);
const TEXT_FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Truncate `text` to [`MAX_TEXT_CHARS`] characters.
pub fn truncate_text(text: &str) -> String {
    text.chars().take(MAX_TEXT_CHARS).collect()
}

/// Renders branding badges.
#[derive(Debug, Clone)]
pub struct LogoGenerator {
    font_candidates: Vec<PathBuf>,
}

impl LogoGenerator {
    /// Generator using the default font search list.
    pub fn new() -> Self {
        Self {
            font_candidates: DEFAULT_FONT_CANDIDATES.iter().map(PathBuf::from).collect(),
        }
    }

    /// Replace the font search list. An empty list forces the bitmap font.
    pub fn with_font_candidates(mut self, candidates: Vec<PathBuf>) -> Self {
        self.font_candidates = candidates;
        self
    }

    /// Try `path` before every other candidate.
    pub fn with_preferred_font(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_candidates.insert(0, path.into());
        self
    }

    pub fn font_candidates(&self) -> &[PathBuf] {
        &self.font_candidates
    }

    /// Render the badge for `text` in memory.
    pub fn render(&self, text: &str) -> RgbaImage {
        let text = truncate_text(text);
        let mut canvas = RgbaImage::from_pixel(WIDTH, HEIGHT, TRANSPARENT);

        draw_badge(&mut canvas);

        match load_font(&self.font_candidates) {
            LoadedFont::TrueType(font) => {
                let max_width = (WIDTH - 4 * MARGIN) as f32;
                let mut scale = PxScale::from(FONT_SIZE);
                let mut ink = ink_bounds(&font, scale, &text);
                if let Some(bounds) = ink.filter(|b| b.width() > max_width) {
                    scale = PxScale::from(FONT_SIZE * max_width / bounds.width());
                    ink = ink_bounds(&font, scale, &text);
                }

                // Blank text has no ink to place.
                if let Some(bounds) = ink {
                    let (x, y) = centered_on_ink(bounds);
                    draw_text_mut(&mut canvas, TEXT_FILL, x, y, scale, &font, &text);
                }
            }
            LoadedFont::Bitmap => {
                let glyphs = text.chars().count().max(1) as u32;
                let max_width = WIDTH - 4 * MARGIN;
                let block = (FONT_SIZE as u32 / GLYPH_CELLS)
                    .min(max_width / (glyphs * GLYPH_CELLS))
                    .max(1);

                let text_w = glyphs * GLYPH_CELLS * block;
                let text_h = GLYPH_CELLS * block;
                let (x, y) = centered(text_w, text_h);
                draw_bitmap_text(&mut canvas, TEXT_FILL, x, y, block, &text);
            }
        }

        canvas
    }

    /// Render `text` and write it as PNG to `path`, replacing any existing
    /// file.
    pub fn generate(&self, text: &str, path: &Path) -> Result<PathBuf, LogoError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let image = self.render(text);
        image.save_with_format(path, ImageFormat::Png)?;

        info!(path = %path.display(), text = %truncate_text(text), "Logo generated");
        Ok(path.to_path_buf())
    }
}

impl Default for LogoGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn centered(text_w: u32, text_h: u32) -> (i32, i32) {
    let x = (WIDTH as i32 - text_w as i32) / 2;
    let y = (HEIGHT as i32 - text_h as i32) / 2 - TEXT_LIFT;
    (x, y)
}

/// Drawing offset that puts the middle of `ink` at the badge's text anchor.
fn centered_on_ink(ink: ab_glyph::Rect) -> (i32, i32) {
    let x = WIDTH as f32 / 2.0 - (ink.min.x + ink.max.x) / 2.0;
    let y = (HEIGHT as i32 / 2 - TEXT_LIFT) as f32 - (ink.min.y + ink.max.y) / 2.0;
    (x.round() as i32, y.round() as i32)
}

/// Pixel bounds of the outlines `draw_text_mut` would paint at offset (0, 0).
///
/// Mirrors its layout: baseline at the ascent, advance then kern per glyph.
fn ink_bounds(font: &FontVec, scale: PxScale, text: &str) -> Option<ab_glyph::Rect> {
    let scaled = font.as_scaled(scale);
    let mut caret = 0.0;
    let mut last: Option<GlyphId> = None;
    let mut bounds: Option<ab_glyph::Rect> = None;

    for c in text.chars() {
        let id = scaled.glyph_id(c);
        let glyph = id.with_scale_and_position(scale, point(caret, scaled.ascent()));
        caret += scaled.h_advance(id);

        let Some(outlined) = scaled.outline_glyph(glyph) else {
            continue;
        };
        if let Some(last) = last {
            caret += scaled.kern(id, last);
        }
        last = Some(id);

        let bb = outlined.px_bounds();
        bounds = Some(match bounds {
            None => bb,
            Some(b) => ab_glyph::Rect {
                min: point(b.min.x.min(bb.min.x), b.min.y.min(bb.min.y)),
                max: point(b.max.x.max(bb.max.x), b.max.y.max(bb.max.y)),
            },
        });
    }

    bounds
}

/// Filled rounded rectangle from (MARGIN, MARGIN) to the opposite margin,
/// both corners inclusive.
fn draw_badge(canvas: &mut RgbaImage) {
    let (x0, y0) = (MARGIN, MARGIN);
    let (x1, y1) = (WIDTH - MARGIN, HEIGHT - MARGIN);
    let r = CORNER_RADIUS;

    draw_filled_rect_mut(
        canvas,
        Rect::at((x0 + r) as i32, y0 as i32).of_size(x1 - x0 - 2 * r + 1, y1 - y0 + 1),
        BADGE_FILL,
    );
    draw_filled_rect_mut(
        canvas,
        Rect::at(x0 as i32, (y0 + r) as i32).of_size(x1 - x0 + 1, y1 - y0 - 2 * r + 1),
        BADGE_FILL,
    );

    for (cx, cy) in [
        (x0 + r, y0 + r),
        (x1 - r, y0 + r),
        (x0 + r, y1 - r),
        (x1 - r, y1 - r),
    ] {
        draw_filled_circle_mut(canvas, (cx as i32, cy as i32), r as i32, BADGE_FILL);
    }
}
