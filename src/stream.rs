use crate::config::Tuning;
use crate::glyph::Glyph;
use crate::rng::Entropy;
use std::ops::Range;

const ALPHA_MAX: u8 = 255;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Emphasis {
    Base,
    Secondary,
    Brightest,
}

/// What the renderer gets for one glyph on one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct DrawGlyph {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) symbol: u8,
    pub(crate) emphasis: Emphasis,
    pub(crate) alpha: u8,
}

pub(crate) trait GlyphSink {
    fn put(&mut self, glyph: DrawGlyph);
}

impl GlyphSink for Vec<DrawGlyph> {
    fn put(&mut self, glyph: DrawGlyph) {
        self.push(glyph);
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct StreamParams {
    pub(crate) x: i32,
    pub(crate) height: i32,
    pub(crate) speed: i32,
    pub(crate) max_glyphs: i32,
    pub(crate) fixed_alpha: Option<u8>,
}

/// Linear ramp from `floor` at the top glyph to 255 at the last one.
pub(crate) fn fade_alpha(index: usize, last: usize, floor: u8) -> u8 {
    if last == 0 {
        return ALPHA_MAX;
    }
    let t = index.min(last) as f32 / last as f32;
    (t * (ALPHA_MAX - floor) as f32 + floor as f32) as u8
}

/// A column of glyphs. Index 0 is the top of the column (faint end),
/// the last index is the leading edge where fresh characters appear.
#[derive(Clone, Debug)]
pub(crate) struct Stream {
    x: i32,
    height: i32,
    speed: i32,
    glyphs: Vec<Glyph>,
    highlight: Range<usize>,
    fixed_alpha: Option<u8>,
    row: i32,
    flicker: f32,
    alpha_floor: u8,
}

impl Stream {
    pub(crate) fn new<R: Entropy + ?Sized>(p: StreamParams, tuning: &Tuning, rng: &mut R) -> Self {
        let row = tuning.row();
        let glyph_count = rng.int_in(tuning.min_glyphs, p.max_glyphs.max(tuning.min_glyphs));
        let y_delta = rng.int_in(0, p.height - row);

        let end = glyph_count * row;
        let mut glyphs = Vec::with_capacity((tuning.lead_rows + glyph_count).max(0) as usize);
        let mut row_pos = tuning.start_offset();
        while row_pos < end {
            glyphs.push(Glyph::new(p.x as f32, (row_pos + y_delta) as f32, rng));
            row_pos += row;
        }

        let len = glyphs.len();
        let highlight = len.saturating_sub(tuning.highlight_count)..len;

        Self {
            x: p.x,
            height: p.height,
            speed: p.speed.max(1),
            glyphs,
            highlight,
            fixed_alpha: p.fixed_alpha,
            row,
            flicker: tuning.flicker_chance,
            alpha_floor: tuning.alpha_floor,
        }
    }

    pub(crate) fn x(&self) -> i32 {
        self.x
    }

    pub(crate) fn speed(&self) -> i32 {
        self.speed
    }

    pub(crate) fn fixed_alpha(&self) -> Option<u8> {
        self.fixed_alpha
    }

    pub(crate) fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    pub(crate) fn highlight(&self) -> Range<usize> {
        self.highlight.clone()
    }

    pub(crate) fn emphasis(&self, index: usize) -> Emphasis {
        if !self.highlight.contains(&index) {
            Emphasis::Base
        } else if index + 1 == self.glyphs.len() {
            Emphasis::Brightest
        } else {
            Emphasis::Secondary
        }
    }

    pub(crate) fn is_tick(&self, advance: u32) -> bool {
        advance % self.speed as u32 == 0
    }

    /// Runs one frame: moves and rewrites glyphs on this stream's ticks,
    /// flickers at random, emits every glyph, then wraps the column.
    pub(crate) fn draw<R, S>(&mut self, advance: u32, rng: &mut R, sink: &mut S)
    where
        R: Entropy + ?Sized,
        S: GlyphSink + ?Sized,
    {
        let Some(last) = self.glyphs.len().checked_sub(1) else {
            return;
        };
        let tick = self.is_tick(advance);

        for i in 0..=last {
            let alpha = fade_alpha(i, last, self.alpha_floor);
            let emphasis = self.emphasis(i);

            if tick {
                // i + 1 has not been touched yet this frame
                let next = if i < last { Some(self.glyphs[i + 1].symbol) } else { None };
                let glyph = &mut self.glyphs[i];
                glyph.y += self.row as f32;
                match next {
                    Some(symbol) => glyph.symbol = symbol,
                    None => glyph.randomize(rng),
                }
            }

            if rng.unit() < self.flicker {
                self.glyphs[i].randomize(rng);
            }

            let g = self.glyphs[i];
            sink.put(DrawGlyph {
                x: g.x,
                y: g.y,
                symbol: g.symbol,
                emphasis,
                alpha: self.fixed_alpha.unwrap_or(alpha),
            });
        }

        self.wrap();
    }

    fn wrap(&mut self) {
        let last = match self.glyphs.len().checked_sub(1) {
            Some(l) => l,
            None => return,
        };
        if self.glyphs[0].y <= self.height as f32 {
            return;
        }
        let row = self.row;
        for (i, g) in self.glyphs.iter_mut().enumerate() {
            g.y = ((last - i) as i32 * -row) as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{make_rng, Scripted};

    fn quiet() -> Tuning {
        Tuning {
            flicker_chance: 0.0,
            ..Tuning::default()
        }
    }

    fn params(height: i32, speed: i32, max_glyphs: i32) -> StreamParams {
        StreamParams {
            x: 90,
            height,
            speed,
            max_glyphs,
            fixed_alpha: None,
        }
    }

    // glyph count 10, no phase offset, symbols 65.. for the 20 laid-out rows,
    // then 120 for the first fresh leading symbol
    fn scripted_stream() -> (Stream, Scripted) {
        let mut ints = vec![10, 0];
        ints.extend(65..85);
        ints.push(120);
        let mut rng = Scripted::new(ints);
        let s = Stream::new(params(300, 1, 10), &quiet(), &mut rng);
        (s, rng)
    }

    #[test]
    fn alpha_ramps_from_floor_to_opaque() {
        for n in [2usize, 3, 13, 20, 60] {
            let last = n - 1;
            assert_eq!(fade_alpha(0, last, 40), 40);
            assert_eq!(fade_alpha(last, last, 40), 255);
            let mut prev = 0;
            for i in 0..n {
                let a = fade_alpha(i, last, 40);
                assert!(a >= prev);
                prev = a;
            }
        }
        assert_eq!(fade_alpha(0, 0, 40), 255);
    }

    #[test]
    fn layout_starts_above_canvas() {
        let (s, _) = scripted_stream();
        let g = s.glyphs();
        assert_eq!(g.len(), 20);
        for (i, glyph) in g.iter().enumerate() {
            assert_eq!(glyph.x, 90.0);
            assert_eq!(glyph.y, (-300 + 30 * i as i32) as f32);
            assert_eq!(glyph.symbol, 65 + i as u8);
        }
    }

    #[test]
    fn phase_offset_shifts_every_row() {
        let mut rng = Scripted::new([10, 45]);
        let s = Stream::new(params(300, 1, 10), &quiet(), &mut rng);
        assert_eq!(s.glyphs()[0].y, -255.0);
        assert_eq!(s.glyphs()[19].y, 315.0);
    }

    #[test]
    fn glyph_count_respects_bounds() {
        let t = quiet();
        let mut rng = make_rng(Some(5));
        for _ in 0..200 {
            let s = Stream::new(params(900, 4, 50), &t, &mut rng);
            let n = s.glyphs().len() as i32;
            assert!((10 + t.lead_rows..=50 + t.lead_rows).contains(&n), "len {n}");
        }
    }

    #[test]
    fn short_canvas_collapses_phase_offset() {
        let mut rng = make_rng(Some(9));
        let s = Stream::new(params(10, 4, 20), &quiet(), &mut rng);
        assert_eq!(s.glyphs()[0].y, -300.0);
    }

    #[test]
    fn highlight_covers_the_tail() {
        let mut rng = make_rng(Some(1));
        for _ in 0..50 {
            let s = Stream::new(params(600, 4, 50), &quiet(), &mut rng);
            let h = s.highlight();
            let last = s.glyphs().len() - 1;
            assert_eq!(h.len(), 3);
            assert!(h.contains(&last));
            assert_eq!(s.emphasis(last), Emphasis::Brightest);
            assert_eq!(s.emphasis(last - 1), Emphasis::Secondary);
            assert_eq!(s.emphasis(last - 2), Emphasis::Secondary);
            assert_eq!(s.emphasis(last - 3), Emphasis::Base);
        }
    }

    #[test]
    fn tick_moves_and_shifts_characters() {
        let (mut s, mut rng) = scripted_stream();
        let before: Vec<Glyph> = s.glyphs().to_vec();
        let mut out: Vec<DrawGlyph> = Vec::new();
        s.draw(0, &mut rng, &mut out);

        let after = s.glyphs();
        let last = after.len() - 1;
        for i in 0..=last {
            assert_eq!(after[i].y, before[i].y + 30.0);
        }
        for i in 0..last {
            assert_eq!(after[i].symbol, before[i + 1].symbol);
        }
        assert_eq!(after[last].symbol, 120);
        assert_eq!(out.len(), after.len());
        assert_eq!(out[last].emphasis, Emphasis::Brightest);
        assert_eq!(out[last].alpha, 255);
        assert_eq!(out[0].alpha, 40);
    }

    #[test]
    fn off_tick_frames_leave_glyphs_alone() {
        let mut rng = make_rng(Some(4));
        let mut s = Stream::new(params(600, 3, 30), &quiet(), &mut rng);
        let before = s.glyphs().to_vec();
        let mut out: Vec<DrawGlyph> = Vec::new();
        s.draw(1, &mut rng, &mut out);
        s.draw(2, &mut rng, &mut out);
        assert_eq!(s.glyphs(), &before[..]);
        s.draw(3, &mut rng, &mut out);
        assert_eq!(s.glyphs()[0].y, before[0].y + 30.0);
    }

    #[test]
    fn propagation_with_real_rng() {
        let mut rng = make_rng(Some(77));
        let mut s = Stream::new(params(900, 2, 40), &quiet(), &mut rng);
        let before = s.glyphs().to_vec();
        s.draw(4, &mut rng, &mut Vec::<DrawGlyph>::new());
        let after = s.glyphs();
        for i in 0..after.len() - 1 {
            assert_eq!(after[i].symbol, before[i + 1].symbol);
        }
    }

    #[test]
    fn flicker_rewrites_off_tick() {
        let mut ints = vec![10, 0];
        ints.extend(std::iter::repeat(65).take(20));
        ints.extend(std::iter::repeat(70).take(20));
        let mut rng = Scripted::new(ints).with_unit(0.0);
        let mut s = Stream::new(params(300, 4, 10), &Tuning::default(), &mut rng);
        s.draw(1, &mut rng, &mut Vec::<DrawGlyph>::new());
        assert!(s.glyphs().iter().all(|g| g.symbol == 70));
        assert_eq!(s.glyphs()[0].y, -300.0);
    }

    #[test]
    fn fixed_alpha_overrides_the_ramp() {
        let mut rng = make_rng(Some(8));
        let mut p = params(600, 1, 20);
        p.fixed_alpha = Some(25);
        let mut s = Stream::new(p, &quiet(), &mut rng);
        let mut out: Vec<DrawGlyph> = Vec::new();
        s.draw(0, &mut rng, &mut out);
        assert!(out.iter().all(|g| g.alpha == 25));
        assert_eq!(s.fixed_alpha(), Some(25));
    }

    #[test]
    fn wraps_once_top_glyph_passes_height() {
        let (mut s, mut rng) = scripted_stream();
        let mut out: Vec<DrawGlyph> = Vec::new();
        for advance in 0..20 {
            s.draw(advance, &mut rng, &mut out);
        }
        // top glyph sits exactly on the bottom edge: not past it yet
        assert_eq!(s.glyphs()[0].y, 300.0);

        s.draw(20, &mut rng, &mut out);
        let g = s.glyphs();
        let last = g.len() - 1;
        for (i, glyph) in g.iter().enumerate() {
            assert_eq!(glyph.y, ((last - i) as i32 * -30) as f32);
        }
        assert!(g.windows(2).all(|w| w[0].y < w[1].y));
        assert_eq!(g[last].y, 0.0);
    }

    #[test]
    fn keeps_falling_after_wrap() {
        let (mut s, mut rng) = scripted_stream();
        for advance in 0..21 {
            s.draw(advance, &mut rng, &mut Vec::<DrawGlyph>::new());
        }
        let symbols: Vec<u8> = s.glyphs().iter().map(|g| g.symbol).collect();
        s.draw(0, &mut rng, &mut Vec::<DrawGlyph>::new());

        let g = s.glyphs();
        let last = g.len() - 1;
        assert_eq!(g[last].y, 30.0);
        assert_eq!(g[0].y, (-(last as i32) * 30 + 30) as f32);
        for i in 0..last {
            assert_eq!(g[i].symbol, symbols[i + 1]);
        }
    }

    #[test]
    fn zero_speed_is_clamped() {
        let mut rng = make_rng(Some(2));
        let s = Stream::new(params(300, 0, 10), &quiet(), &mut rng);
        assert_eq!(s.speed(), 1);
        assert!(s.is_tick(17));
        assert_eq!(s.x(), 90);
    }
}
