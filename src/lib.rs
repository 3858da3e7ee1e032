mod error;
mod options;
mod random;
mod skiplist;
mod skipmap;

#[cfg(test)]
mod datadriven;

pub use error::{Error, Result};
pub use options::{Options, DEFAULT_BRANCHING_FACTOR, DEFAULT_MAX_LEVEL};
pub use skiplist::{Iter, SkipList};
pub use skipmap::SkipMap;
