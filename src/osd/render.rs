//! tiny-skia rendering for OSD

use rustybuzz::ttf_parser::{GlyphId, OutlineBuilder};
use tiny_skia::*;

use crate::config::Rgba;
use crate::text::TextBlock;

/// Colours the OSD is drawn with
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub text: Rgba,
    pub background: Rgba,
}

/// Render the OSD to a pixmap
pub fn render(pixmap: &mut Pixmap, block: &TextBlock, face: &rustybuzz::Face<'_>, palette: Palette) {
    // 1. Background covers the whole window
    pixmap.fill(palette.background.to_skia());

    let mut paint = Paint::default();
    paint.set_color(palette.text.to_skia());
    paint.anti_alias = true;

    // 2. Lines centred horizontally, block centred vertically
    let width = pixmap.width() as f32;
    let height = pixmap.height() as f32;
    let top = (height - block.content_height()) / 2.0;

    for (row, line) in block.lines.iter().enumerate() {
        let line_x = (width - line.width) / 2.0;
        let baseline = top + row as f32 * block.line_height + block.ascent;

        for glyph in &line.glyphs {
            let mut outline = PathOutline(PathBuilder::new());
            if face.outline_glyph(GlyphId(glyph.id), &mut outline).is_none() {
                continue; // spaces and other empty glyphs
            }
            let Some(path) = outline.0.finish() else {
                continue;
            };

            // Font units are y-up
            let transform = Transform::from_row(
                block.scale,
                0.0,
                0.0,
                -block.scale,
                line_x + glyph.x,
                baseline - glyph.y,
            );
            pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
        }
    }
}

/// Copy premultiplied RGBA pixels into a little-endian ARGB8888 buffer
pub fn to_argb8888(rgba: &[u8], canvas: &mut [u8]) {
    for (src, dst) in rgba.chunks_exact(4).zip(canvas.chunks_exact_mut(4)) {
        dst[0] = src[2];
        dst[1] = src[1];
        dst[2] = src[0];
        dst[3] = src[3];
    }
}

struct PathOutline(PathBuilder);

impl OutlineBuilder for PathOutline {
    fn move_to(&mut self, x: f32, y: f32) {
        self.0.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.0.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.0.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.0.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.0.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{FontBook, to_lines};

    #[test]
    fn test_argb_conversion_swaps_red_and_blue() {
        let rgba = [10, 20, 30, 40, 1, 2, 3, 4];
        let mut canvas = [0u8; 8];
        to_argb8888(&rgba, &mut canvas);
        assert_eq!(canvas, [30, 20, 10, 40, 3, 2, 1, 4]);
    }

    #[test]
    fn test_background_fills_window() {
        let font = FontBook::with_test_font().resolve("Tuffy").unwrap();
        let face = font.face().unwrap();
        let block = TextBlock::layout(&face, 24, &to_lines(""), None);
        let mut pixmap = Pixmap::new(40, 40).unwrap();

        let palette = Palette {
            text: Rgba::WHITE,
            background: Rgba::new(255, 0, 0, 255),
        };
        render(&mut pixmap, &block, &face, palette);

        let corner = pixmap.pixel(0, 0).unwrap();
        assert_eq!((corner.red(), corner.alpha()), (255, 255));
    }

    #[test]
    fn test_text_is_drawn_over_background() {
        let font = FontBook::with_test_font().resolve("Tuffy").unwrap();
        let face = font.face().unwrap();
        let block = TextBlock::layout(&face, 32, &to_lines("HH"), None);
        let mut pixmap = Pixmap::new(
            block.width().ceil() as u32 + 20,
            block.height().ceil() as u32 + 20,
        )
        .unwrap();

        let palette = Palette {
            text: Rgba::WHITE,
            background: Rgba::new(0, 0, 0, 0),
        };
        render(&mut pixmap, &block, &face, palette);

        assert!(pixmap.pixels().iter().any(|p| p.alpha() > 0));
    }
}
