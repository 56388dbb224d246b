use crate::config::{Population, Tuning};
use crate::rng::Entropy;
use crate::stream::{GlyphSink, Stream, StreamParams};
use tracing::{debug, info};

/// Every stream on the canvas: a dim, slow background pass laid down first
/// and a brighter, faster foreground pass on a finer stride.
pub(crate) struct Field {
    tuning: Tuning,
    streams: Vec<Stream>,
    background_len: usize,
    built: bool,
}

impl Field {
    pub(crate) fn new(tuning: Tuning) -> Self {
        Self {
            tuning,
            streams: Vec::new(),
            background_len: 0,
            built: false,
        }
    }

    pub(crate) fn is_built(&self) -> bool {
        self.built
    }

    pub(crate) fn streams(&self) -> &[Stream] {
        &self.streams
    }

    pub(crate) fn background(&self) -> &[Stream] {
        &self.streams[..self.background_len]
    }

    pub(crate) fn foreground(&self) -> &[Stream] {
        &self.streams[self.background_len..]
    }

    /// Lays out both passes over `[0, width)`. Runs at most once; a
    /// non-positive size leaves the field empty and unbuilt.
    pub(crate) fn build<R: Entropy + ?Sized>(&mut self, width: i32, height: i32, rng: &mut R) -> bool {
        if self.built || width <= 0 || height <= 0 {
            return false;
        }

        let t = self.tuning;
        lay_pass(&mut self.streams, width, height, t.background_stride(), &t.background, &t, rng);
        self.background_len = self.streams.len();
        lay_pass(&mut self.streams, width, height, t.foreground_stride(), &t.foreground, &t, rng);
        self.built = true;

        info!(
            width,
            height,
            background = self.background().len(),
            foreground = self.foreground().len(),
            "field built"
        );
        true
    }

    /// Host size notification. Only the first usable size builds; later
    /// sizes are ignored and the field keeps its original layout.
    pub(crate) fn on_resize<R: Entropy + ?Sized>(&mut self, width: i32, height: i32, rng: &mut R) -> bool {
        if self.built {
            debug!(width, height, "resize ignored, field already laid out");
            return false;
        }
        self.build(width, height, rng)
    }

    pub(crate) fn draw<R, S>(&mut self, advance: u32, rng: &mut R, sink: &mut S)
    where
        R: Entropy + ?Sized,
        S: GlyphSink + ?Sized,
    {
        for stream in &mut self.streams {
            stream.draw(advance, rng, sink);
        }
    }
}

fn lay_pass<R: Entropy + ?Sized>(
    out: &mut Vec<Stream>,
    width: i32,
    height: i32,
    stride: i32,
    pop: &Population,
    tuning: &Tuning,
    rng: &mut R,
) {
    let stride = stride.max(1);
    let mut x = 0;
    while x < width {
        let speed = rng.int_in(pop.speed_min, pop.speed_max);
        let params = StreamParams {
            x,
            height,
            speed,
            max_glyphs: pop.max_glyphs,
            fixed_alpha: pop.fixed_alpha,
        };
        out.push(Stream::new(params, tuning, rng));
        x += stride;
    }
}
