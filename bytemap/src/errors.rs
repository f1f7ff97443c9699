use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot read bytemap file {}: {source}", path.display())]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Shape mismatch: expected {expected} samples, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("{axis} mismatch: expected {expected} cells, found {found}")]
    DimensionMismatch {
        axis: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("No variable spec or decoder for: {0}")]
    SpecNotFound(String),

    #[error("Config Error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Parse Error: {0}")]
    ParseError(String),

    #[error("File is not a valid verify file: {0}")]
    Nom(String),
}

impl<'a> From<nom::Err<nom::error::Error<&'a str>>> for Error {
    fn from(value: nom::Err<nom::error::Error<&'a str>>) -> Self {
        Self::Nom(value.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
