use rand::{rngs::StdRng, RngCore, SeedableRng};

use crate::options::Options;

/// Draws node levels from a geometric distribution: a node starts at level 0
/// and is promoted with probability `1 / branching_factor` until the first
/// failed draw or until it reaches `max_level`.
pub(crate) struct LevelGenerator<R = StdRng> {
    rng: R,
    max_level: usize,
    branching_factor: u32,
}

impl LevelGenerator<StdRng> {
    pub fn from_options(opts: &Options) -> Self {
        let rng = match opts.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        LevelGenerator::new(rng, opts.max_level, opts.branching_factor)
    }
}

impl<R: RngCore> LevelGenerator<R> {
    /// `branching_factor` must already have passed [`Options::validate`].
    pub fn new(rng: R, max_level: usize, branching_factor: u32) -> Self {
        assert!(branching_factor >= 2);
        LevelGenerator {
            rng,
            max_level,
            branching_factor,
        }
    }

    pub fn max_level(&self) -> usize {
        self.max_level
    }

    pub fn random_level(&mut self) -> usize {
        let mut level = 0;
        while level < self.max_level && self.rng.next_u32() % self.branching_factor == 0 {
            level += 1;
        }
        level
    }
}
