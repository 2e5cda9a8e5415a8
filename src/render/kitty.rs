use crate::render::{Frame, Renderer};
use anyhow::Context;
use base64::Engine;
use std::io::Write;

// 3072 raw bytes -> 4096 base64 bytes, the protocol's chunk ceiling.
const RAW_CHUNK: usize = 3 * 1024;

/// Kitty graphics protocol back end (direct base64 transport). Real bitmap
/// output for terminals that support it; the slideshow images look like
/// images instead of colored cells.
pub struct KittyRenderer {
    image_id: u32,
    placement_id: u32,
    b64_buf: Vec<u8>,
}

impl KittyRenderer {
    pub fn new() -> Self {
        Self {
            image_id: 1,
            placement_id: 1,
            b64_buf: Vec::new(),
        }
    }
}

impl Default for KittyRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for KittyRenderer {
    fn name(&self) -> &'static str {
        "kitty"
    }

    fn cell_pixels(&self) -> (usize, usize) {
        (2, 4)
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        let cols = frame.term_cols as usize;
        let visual_rows = frame.visual_rows as usize;
        let w = frame.pixel_width;
        let h = frame.pixel_height;

        if cols == 0 || visual_rows == 0 || w == 0 || h == 0 {
            return Ok(());
        }
        if frame.pixels_rgba.len() < w * h * 4 {
            return Ok(());
        }

        if frame.sync_updates {
            out.write_all(b"\x1b[?2026h")?;
        }
        out.write_all(b"\x1b[H")?;

        write_direct_rgba(
            out,
            frame.pixels_rgba,
            w,
            h,
            cols,
            visual_rows,
            self.image_id,
            self.placement_id,
            &mut self.b64_buf,
        )?;

        let mut hud_lines = frame.hud.lines();
        for i in 0..(frame.hud_rows as usize) {
            write!(out, "\x1b[{};1H\x1b[0m\x1b[2K", visual_rows + i + 1)?;
            if let Some(mut line) = hud_lines.next() {
                if line.len() > cols {
                    line = &line[..cols];
                }
                write!(out, "{line}")?;
            }
        }

        if frame.sync_updates {
            out.write_all(b"\x1b[?2026l")?;
        }
        out.flush()?;
        Ok(())
    }
}

#[allow(clippy::too_many_arguments)]
fn write_direct_rgba(
    out: &mut dyn Write,
    rgba: &[u8],
    w: usize,
    h: usize,
    cols: usize,
    rows: usize,
    image_id: u32,
    placement_id: u32,
    b64_buf: &mut Vec<u8>,
) -> anyhow::Result<()> {
    if rgba.is_empty() {
        return Ok(());
    }

    let len = rgba.len();
    let mut off = 0usize;
    let mut first = true;
    while off < len {
        // Chunk ends on a 3-byte boundary so each base64 piece is padless.
        let mut end = (off + RAW_CHUNK).min(len);
        if end < len {
            end -= (end - off) % 3;
        }

        let chunk = &rgba[off..end];
        let b64_len = chunk.len().div_ceil(3) * 4;
        if b64_buf.len() < b64_len {
            b64_buf.resize(b64_len, 0);
        }
        let written = base64::engine::general_purpose::STANDARD
            .encode_slice(chunk, &mut b64_buf[..b64_len])
            .context("base64 encode pixels")?;

        let more = if end < len { 1 } else { 0 };
        if first {
            write!(
                out,
                "\x1b_Ga=T,f=32,s={},v={},t=d,i={},p={},c={},r={},C=1,q=2,z=-1,m={};",
                w, h, image_id, placement_id, cols, rows, more
            )?;
            first = false;
        } else {
            write!(out, "\x1b_Gm={};", more)?;
        }

        out.write_all(&b64_buf[..written])?;
        out.write_all(b"\x1b\\")?;
        off = end;
    }

    Ok(())
}
