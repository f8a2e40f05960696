//! Text preparation for the OSD: markup to lines, font lookup, and shaping
//! into positioned glyph runs.

mod font;
mod markup;

use rustybuzz::{Face, UnicodeBuffer};

pub use font::{FontBook, ResolvedFont};
pub use markup::to_lines;

/// Blank space kept around the text block on every side, in pixels
pub const DOCUMENT_MARGIN: f32 = 4.0;

/// A glyph placed relative to the start of its line's baseline, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionedGlyph {
    pub id: u16,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Default)]
pub struct ShapedLine {
    pub glyphs: Vec<PositionedGlyph>,
    pub width: f32,
}

/// Shaped and measured text, ready to be placed and drawn
#[derive(Debug, Clone)]
pub struct TextBlock {
    pub lines: Vec<ShapedLine>,
    /// Font units to pixels
    pub scale: f32,
    pub ascent: f32,
    pub line_height: f32,
}

impl TextBlock {
    /// Shape `lines` at `px_size`, wrapping at word boundaries any line
    /// wider than `max_width`
    pub fn layout(face: &Face<'_>, px_size: u32, lines: &[String], max_width: Option<f32>) -> Self {
        let shaper = Shaper::new(face, px_size);
        let lines = lines
            .iter()
            .flat_map(|line| shaper.wrap(line, max_width))
            .collect();

        Self {
            lines,
            scale: shaper.scale,
            ascent: shaper.ascent(),
            line_height: shaper.line_height(),
        }
    }

    /// Height of the lines alone, without margins
    pub fn content_height(&self) -> f32 {
        self.lines.len() as f32 * self.line_height
    }

    /// Widest line plus margins
    pub fn width(&self) -> f32 {
        let widest = self
            .lines
            .iter()
            .map(|line| line.width)
            .fold(0.0_f32, f32::max);
        widest + DOCUMENT_MARGIN * 2.0
    }

    pub fn height(&self) -> f32 {
        self.content_height() + DOCUMENT_MARGIN * 2.0
    }
}

struct Shaper<'f, 'a> {
    face: &'f Face<'a>,
    scale: f32,
}

impl<'f, 'a> Shaper<'f, 'a> {
    fn new(face: &'f Face<'a>, px_size: u32) -> Self {
        let units_per_em = face.units_per_em().max(1) as f32;
        Self {
            face,
            scale: px_size as f32 / units_per_em,
        }
    }

    fn ascent(&self) -> f32 {
        self.face.ascender() as f32 * self.scale
    }

    fn line_height(&self) -> f32 {
        let face = self.face;
        (face.ascender() as f32 - face.descender() as f32 + face.line_gap() as f32) * self.scale
    }

    fn shape(&self, text: &str) -> ShapedLine {
        if text.is_empty() {
            return ShapedLine::default();
        }

        let mut buffer = UnicodeBuffer::new();
        buffer.push_str(text);
        buffer.guess_segment_properties();
        let output = rustybuzz::shape(self.face, &[], buffer);

        let mut pen = 0.0;
        let glyphs = output
            .glyph_infos()
            .iter()
            .zip(output.glyph_positions())
            .map(|(info, pos)| {
                let glyph = PositionedGlyph {
                    id: info.glyph_id as u16,
                    x: pen + pos.x_offset as f32 * self.scale,
                    y: pos.y_offset as f32 * self.scale,
                };
                pen += pos.x_advance as f32 * self.scale;
                glyph
            })
            .collect();

        ShapedLine { glyphs, width: pen }
    }

    fn wrap(&self, line: &str, max_width: Option<f32>) -> Vec<ShapedLine> {
        let shaped = self.shape(line);
        let Some(max_width) = max_width else {
            return vec![shaped];
        };
        if shaped.width <= max_width {
            return vec![shaped];
        }

        let mut wrapped = Vec::new();
        let mut current = String::new();
        for word in line.split(' ') {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };

            // A single word wider than the limit stays on its own line
            if current.is_empty() || self.shape(&candidate).width <= max_width {
                current = candidate;
            } else {
                wrapped.push(self.shape(&current));
                current = word.to_string();
            }
        }
        wrapped.push(self.shape(&current));
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_face(test: impl FnOnce(&Face<'_>)) {
        let font = FontBook::with_test_font().resolve("Tuffy").unwrap();
        let face = font.face().unwrap();
        test(&face);
    }

    #[test]
    fn test_block_size_includes_margins() {
        with_face(|face| {
            let block = TextBlock::layout(face, 24, &["".to_string()], None);
            assert_eq!(block.lines.len(), 1);
            assert_eq!(block.width(), DOCUMENT_MARGIN * 2.0);
            assert!((block.height() - (block.line_height + DOCUMENT_MARGIN * 2.0)).abs() < 1e-3);
        });
    }

    #[test]
    fn test_line_count_drives_height() {
        with_face(|face| {
            let lines = to_lines("one<br>two<br>three");
            let block = TextBlock::layout(face, 20, &lines, None);
            assert_eq!(block.lines.len(), 3);
            assert!((block.content_height() - block.line_height * 3.0).abs() < 1e-3);
        });
    }

    #[test]
    fn test_width_grows_with_size() {
        with_face(|face| {
            let lines = vec!["Hello".to_string()];
            let small = TextBlock::layout(face, 12, &lines, None);
            let large = TextBlock::layout(face, 48, &lines, None);
            assert!(large.width() > small.width());
            assert!(small.lines[0].width > 0.0);
        });
    }

    #[test]
    fn test_long_lines_wrap_at_words() {
        with_face(|face| {
            let lines = vec!["alpha beta gamma delta epsilon zeta".to_string()];
            let unwrapped = TextBlock::layout(face, 24, &lines, None);
            let limit = unwrapped.lines[0].width / 2.0;

            let wrapped = TextBlock::layout(face, 24, &lines, Some(limit));
            assert!(wrapped.lines.len() > 1);
            assert!(wrapped.lines.iter().all(|line| line.width <= limit));
        });
    }
}
