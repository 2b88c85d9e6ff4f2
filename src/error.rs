use std::{num::ParseIntError, path::PathBuf};

use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

/// Everything that can abort a run: reading either CSV file, decoding a row, or drawing a chart.
#[derive(Debug, Error)]
pub enum Error {
    #[error("error during CSV processing: {0}")]
    Csv(#[from] csv::Error),
    #[error("{file}: line {line}: missing column {column}")]
    MissingColumn {
        file: PathBuf,
        line: u64,
        column: usize,
    },
    #[error("{file}: line {line}: column {column}: {value:?} is too short to hold a violation code")]
    FieldTooShort {
        file: PathBuf,
        line: u64,
        column: usize,
        value: String,
    },
    #[error("{file}: line {line}: column {column}: invalid integer {value:?}: {source}")]
    InvalidInteger {
        file: PathBuf,
        line: u64,
        column: usize,
        value: String,
        source: ParseIntError,
    },
    #[error("failed to load map image: {0}")]
    Image(#[from] image::ImageError),
    #[error("failed to render chart: {0}")]
    Render(String),
}

impl<E> From<DrawingAreaErrorKind<E>> for Error
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        Error::Render(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
