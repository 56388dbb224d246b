use crate::field::Field;
use crate::rng::Entropy;
use crate::stream::GlyphSink;

/// Shared frame counter. Cycles `0..=reset_max`; each stream tests
/// `advance % speed` against the raw value.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FrameDriver {
    advance: u32,
    reset_max: u32,
}

impl FrameDriver {
    pub(crate) fn new(reset_max: u32) -> Self {
        Self {
            advance: 0,
            reset_max,
        }
    }

    pub(crate) fn advance(&self) -> u32 {
        self.advance
    }

    /// Draws every stream for the current value, then steps the counter.
    pub(crate) fn frame<R, S>(&mut self, field: &mut Field, rng: &mut R, sink: &mut S)
    where
        R: Entropy + ?Sized,
        S: GlyphSink + ?Sized,
    {
        field.draw(self.advance, rng, sink);
        self.step();
    }

    fn step(&mut self) {
        if self.advance >= self.reset_max {
            self.advance = 0;
        } else {
            self.advance += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tuning;
    use crate::rng::make_rng;
    use crate::stream::{DrawGlyph, Stream, StreamParams};

    #[test]
    fn counter_cycles_inclusive() {
        let mut d = FrameDriver::new(5);
        let seen: Vec<u32> = (0..13)
            .map(|_| {
                let a = d.advance();
                d.step();
                a
            })
            .collect();
        assert_eq!(seen, vec![0, 1, 2, 3, 4, 5, 0, 1, 2, 3, 4, 5, 0]);
    }

    #[test]
    fn frame_steps_after_drawing() {
        let mut rng = make_rng(Some(1));
        let mut field = Field::new(Tuning::default());
        field.build(200, 600, &mut rng);
        let mut d = FrameDriver::new(5);
        let mut out: Vec<DrawGlyph> = Vec::new();
        d.frame(&mut field, &mut rng, &mut out);
        assert_eq!(d.advance(), 1);
        assert!(!out.is_empty());
    }

    fn count_ticks(speed: i32, frames: usize) -> usize {
        let mut rng = make_rng(Some(speed as u64));
        let tuning = Tuning {
            flicker_chance: 0.0,
            ..Tuning::default()
        };
        let params = StreamParams {
            x: 0,
            height: 100_000,
            speed,
            max_glyphs: 10,
            fixed_alpha: None,
        };
        let mut s = Stream::new(params, &tuning, &mut rng);
        let mut d = FrameDriver::new(5);
        let mut ticks = 0;
        for _ in 0..frames {
            let y = s.glyphs()[0].y;
            s.draw(d.advance(), &mut rng, &mut Vec::<DrawGlyph>::new());
            d.step();
            if s.glyphs()[0].y != y {
                ticks += 1;
            }
        }
        ticks
    }

    #[test]
    fn one_tick_per_speed_window() {
        // speeds dividing the six-value cycle tick exactly once per window
        assert_eq!(count_ticks(1, 12), 12);
        assert_eq!(count_ticks(2, 12), 6);
        assert_eq!(count_ticks(3, 12), 4);
        assert_eq!(count_ticks(6, 12), 2);
    }

    #[test]
    fn slow_speeds_only_tick_on_zero() {
        // advance never reaches 8, so only the reset value qualifies
        assert_eq!(count_ticks(8, 18), 3);
        assert_eq!(count_ticks(4, 12), 4);
    }
}
