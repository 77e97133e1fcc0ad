//! Error types for sparse exact linear algebra

use std::collections::TryReserveError;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LinalgError {
    #[error("index {index} out of range for dimension {bound}")]
    Index { index: usize, bound: usize },

    #[error("arithmetic error: {0}")]
    Arithmetic(String),

    #[error("value is not invertible modulo {modulus}")]
    NotInvertible { modulus: u32 },

    #[error("allocation failed: {0}")]
    Memory(#[from] TryReserveError),

    #[error("invalid value: {0}")]
    Value(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LinalgError {
    pub(crate) fn check_index(index: usize, bound: usize) -> Result<()> {
        if index < bound {
            Ok(())
        } else {
            Err(LinalgError::Index { index, bound })
        }
    }
}

pub type Result<T> = std::result::Result<T, LinalgError>;
