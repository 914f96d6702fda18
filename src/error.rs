use std::{
    num::{ParseFloatError, ParseIntError},
    path::PathBuf,
};
use thiserror::Error;

pub type GtMergeResult<T> = std::result::Result<T, GtMergeError>;

#[derive(Debug, Error)]
pub enum GtMergeError {
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    ParseInt(#[from] ParseIntError),
    #[error(transparent)]
    ParseFloat(#[from] ParseFloatError),
    #[error("Malformed record: expected at least {expected} tab-delimited fields, found {found}")]
    MalformedRecord { expected: usize, found: usize },
    #[error("Record has {found} sample fields but source {source_name} lists {expected} samples")]
    SampleCountMismatch {
        source_name: String,
        expected: usize,
        found: usize,
    },
    #[error("No #CHROM sample header line found in source {source_name}")]
    MissingSampleHeader { source_name: String },
    #[error("Sample {sample} is listed more than once in source {source_name}")]
    DuplicateSample { source_name: String, sample: String },
    #[error("Source name {name} is used more than once")]
    DuplicateSource { name: String },
    #[error("Invalid gzip header: {}", path.display())]
    InvalidGzipHeader { path: PathBuf },
}

impl GtMergeError {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

#[macro_export]
macro_rules! gtmerge_error {
    ($($arg:tt)*) => {
        $crate::error::GtMergeError::message(format!($($arg)*))
    };
}
