//! Screen placement of the OSD window

use crate::config::{HAlign, OsdConfig, VAlign};

/// Space added around the measured text, in pixels
pub const FRAME: i32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

/// Window rectangle in output-logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Geometry {
    /// Layer-shell margins `(top, left)` for a top-left anchored surface
    pub fn margins(&self) -> (i32, i32) {
        (self.y.max(0), self.x.max(0))
    }
}

/// Widest a text line may get before wrapping
pub fn max_text_width(screen: Size, h_padding: i32) -> f32 {
    screen
        .width
        .saturating_sub(h_padding.max(0).saturating_mul(2))
        .saturating_sub(FRAME)
        .max(1) as f32
}

/// Row stride and total byte length of an ARGB8888 buffer, or `None` when
/// the surface is too large to address
pub fn buffer_layout(width: u32, height: u32) -> Option<(i32, usize)> {
    let stride = width.checked_mul(4)?;
    let len = (stride as usize).checked_mul(height as usize)?;
    Some((i32::try_from(stride).ok()?, len))
}

/// Place text of the measured size on `screen` according to the
/// configured alignment and padding
pub fn place(screen: Size, text_width: f32, text_height: f32, config: &OsdConfig) -> Geometry {
    let screen_width = screen.width as f32;
    let screen_height = screen.height as f32;

    let x = match config.align {
        HAlign::Center => ((screen_width - text_width) / 2.0).floor(),
        HAlign::Left => config.h_padding as f32,
        HAlign::Right => screen_width - text_width - config.h_padding as f32,
    };

    let y = match config.v_align {
        VAlign::Top => config.v_padding as f32,
        VAlign::Center => ((screen_height - text_height) / 2.0).floor(),
        VAlign::Bottom => screen_height - text_height - config.v_padding as f32,
    };

    Geometry {
        x: x as i32,
        y: y as i32,
        width: (text_width as i32).saturating_add(FRAME),
        height: (text_height as i32).saturating_add(FRAME),
    }
}
