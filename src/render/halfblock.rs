use crate::render::{text_frame_begin, text_frame_end, Frame, Renderer};
use std::io::Write;

/// Truecolor half-block cells: two pixels per cell, upper half as the
/// foreground glyph, lower half as the background color.
pub struct HalfBlockRenderer {
    last_fg: Option<(u8, u8, u8)>,
    last_bg: Option<(u8, u8, u8)>,
}

impl HalfBlockRenderer {
    pub fn new() -> Self {
        Self {
            last_fg: None,
            last_bg: None,
        }
    }
}

impl Default for HalfBlockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for HalfBlockRenderer {
    fn name(&self) -> &'static str {
        "halfblock"
    }

    fn cell_pixels(&self) -> (usize, usize) {
        (1, 2)
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        let Some((cols, visual_rows, w)) = text_frame_begin(frame, 1, 2, out)? else {
            return Ok(());
        };

        self.last_fg = None;
        self.last_bg = None;

        const HALF_BLOCK: char = '\u{2580}';

        for row in 0..visual_rows {
            let top_y = row * 2;
            let bot_y = top_y + 1;
            for x in 0..cols {
                let top_i = (top_y * w + x) * 4;
                let bot_i = (bot_y * w + x) * 4;
                let top = (
                    frame.pixels_rgba[top_i],
                    frame.pixels_rgba[top_i + 1],
                    frame.pixels_rgba[top_i + 2],
                );
                let bot = (
                    frame.pixels_rgba[bot_i],
                    frame.pixels_rgba[bot_i + 1],
                    frame.pixels_rgba[bot_i + 2],
                );

                if self.last_fg != Some(top) {
                    write!(out, "\x1b[38;2;{};{};{}m", top.0, top.1, top.2)?;
                    self.last_fg = Some(top);
                }
                if self.last_bg != Some(bot) {
                    write!(out, "\x1b[48;2;{};{};{}m", bot.0, bot.1, bot.2)?;
                    self.last_bg = Some(bot);
                }
                write!(out, "{HALF_BLOCK}")?;
            }
            out.write_all(b"\r\n")?;
        }

        text_frame_end(frame, cols, visual_rows, out)
    }
}
