use crate::config::{Palette, Rgb};
use crate::stream::{DrawGlyph, Emphasis, GlyphSink};
use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

const BLACK: Color = Color::Rgb { r: 0, g: 0, b: 0 };

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: BLACK,
            bg: BLACK,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn get(&self, x: u16, y: u16) -> Option<Cell> {
        if x < self.w && y < self.h {
            Some(self.cells[self.idx(x, y)])
        } else {
            None
        }
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
    pub(crate) fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }
}

/// Logical canvas units per terminal cell. Cells are about twice as tall
/// as they are wide, so a row is `row_height` and a column half that.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Viewport {
    pub(crate) cell_w: i32,
    pub(crate) cell_h: i32,
}

impl Viewport {
    pub(crate) fn new(row_height: i32) -> Self {
        let cell_h = row_height.max(2);
        Self {
            cell_w: cell_h / 2,
            cell_h,
        }
    }

    pub(crate) fn logical_size(&self, cols: u16, rows: u16) -> (i32, i32) {
        (cols as i32 * self.cell_w, rows as i32 * self.cell_h)
    }

    pub(crate) fn to_cell(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        let cx = (x / self.cell_w as f32).floor();
        let cy = (y / self.cell_h as f32).floor();
        if cx < 0.0 || cy < 0.0 || cx > u16::MAX as f32 || cy > u16::MAX as f32 {
            return None;
        }
        Some((cx as u16, cy as u16))
    }
}

// Printable ASCII maps to itself; control codes borrow half-width katakana.
pub(crate) fn glyph_face(symbol: u8) -> char {
    match symbol {
        32..=126 => symbol as char,
        0..=31 => char::from_u32(0xFF66 + symbol as u32).unwrap_or('?'),
        _ => '?',
    }
}

fn scale(c: Rgb, k: f32) -> Color {
    let k = k.clamp(0.0, 1.0);
    let ch = |v: u8| (v as f32 * k + 0.5) as u8;
    Color::Rgb {
        r: ch(c.r),
        g: ch(c.g),
        b: ch(c.b),
    }
}

/// Paints glyphs into a cell grid; later glyphs overwrite earlier ones.
pub(crate) struct CellSink<'a> {
    pub(crate) buf: &'a mut CellBuffer,
    pub(crate) viewport: Viewport,
    pub(crate) palette: &'a Palette,
}

impl GlyphSink for CellSink<'_> {
    fn put(&mut self, glyph: DrawGlyph) {
        let Some((x, y)) = self.viewport.to_cell(glyph.x, glyph.y) else {
            return;
        };
        let tint = match glyph.emphasis {
            Emphasis::Base => self.palette.base,
            Emphasis::Secondary => self.palette.secondary,
            Emphasis::Brightest => self.palette.brightest,
        };
        let a = glyph.alpha as f32 / 255.0;
        let shadow = self.palette.shadow;
        let bg = if shadow.enabled {
            scale(shadow.color, a * shadow.strength)
        } else {
            BLACK
        };
        self.buf.set(
            x,
            y,
            Cell {
                ch: glyph_face(glyph.symbol),
                fg: scale(tint, a),
                bg,
            },
        );
    }
}

pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            SetBackgroundColor(BLACK),
            Clear(ClearType::All)
        )?;

        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize(&mut self, cols: u16, rows: u16) -> anyhow::Result<()> {
        if cols == self.cols && rows == self.rows {
            return Ok(());
        }
        self.cols = cols;
        self.rows = rows;
        self.prev = CellBuffer::new(cols, rows);
        self.cur = CellBuffer::new(cols, rows);
        queue!(self.out, SetBackgroundColor(BLACK), Clear(ClearType::All))?;
        Ok(())
    }

    pub(crate) fn present(&mut self) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;
                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }
                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}
