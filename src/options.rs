use crate::error::{Error, Result};

pub const DEFAULT_MAX_LEVEL: usize = 32;
pub const DEFAULT_BRANCHING_FACTOR: u32 = 4;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    /// Upper bound on any node's level. The head carries `max_level + 1` slots.
    pub max_level: usize,

    /// A node is promoted one level with probability `1 / branching_factor`.
    pub branching_factor: u32,

    /// Fixed seed for the level generator, `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            max_level: DEFAULT_MAX_LEVEL,
            branching_factor: DEFAULT_BRANCHING_FACTOR,
            seed: None,
        }
    }
}

impl Options {
    pub fn with_max_level(max_level: usize) -> Self {
        Options {
            max_level,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        // the head carries max_level + 1 slots
        if self.max_level == usize::MAX {
            return Err(Error::InvalidArgument(format!(
                "max level {} leaves no room for level 0",
                self.max_level
            )));
        }
        if self.branching_factor < 2 {
            return Err(Error::InvalidArgument(format!(
                "branching factor must be at least 2, got {}",
                self.branching_factor
            )));
        }
        Ok(())
    }
}
