use std::{collections::TryReserveError, result};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("node allocation failed")]
    AllocationFailed {
        #[from]
        source: TryReserveError,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = result::Result<T, Error>;
