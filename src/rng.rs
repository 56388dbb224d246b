use rand::{rngs::StdRng, Rng, SeedableRng};

/// Random draws used by the simulation.
pub(crate) trait Entropy {
    /// Uniform integer in `lo..=hi`. An empty range yields `lo`.
    fn int_in(&mut self, lo: i32, hi: i32) -> i32;

    /// Uniform float in `[0, 1)`.
    fn unit(&mut self) -> f32;
}

impl<R: Rng + ?Sized> Entropy for R {
    fn int_in(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        self.gen_range(lo..=hi)
    }

    fn unit(&mut self) -> f32 {
        self.gen::<f32>()
    }
}

pub(crate) fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Replays a fixed list of integers, then falls back to `lo`.
#[cfg(test)]
pub(crate) struct Scripted {
    ints: std::collections::VecDeque<i32>,
    unit: f32,
}

#[cfg(test)]
impl Scripted {
    pub(crate) fn new(ints: impl IntoIterator<Item = i32>) -> Self {
        Self {
            ints: ints.into_iter().collect(),
            unit: 1.0,
        }
    }

    pub(crate) fn with_unit(mut self, unit: f32) -> Self {
        self.unit = unit;
        self
    }
}

#[cfg(test)]
impl Entropy for Scripted {
    fn int_in(&mut self, lo: i32, hi: i32) -> i32 {
        let v = self.ints.pop_front().unwrap_or(lo);
        v.clamp(lo, hi.max(lo))
    }

    fn unit(&mut self) -> f32 {
        self.unit
    }
}
