//! Rendering errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid style: {0}")]
    InvalidStyle(String),

    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    #[error("invalid axes: {0}")]
    InvalidAxes(String),

    #[error("font error: {0}")]
    Font(String),

    #[error("PNG encoding failed: {0}")]
    Encode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RenderResult<T> = Result<T, RenderError>;
