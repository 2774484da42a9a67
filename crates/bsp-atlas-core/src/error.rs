use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Invalid atlas dimensions {width}x{height} (both must be greater than 1)")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Nothing to pack")]
    Empty,
    #[error("Failed to fit all {sprites} images into a {width}x{height} atlas")]
    InfeasibleLayout { sprites: usize, width: u32, height: u32 },
    #[error("Packing was not deterministic: seed {seed} scored {expected}, re-run scored {actual:?}")]
    NonDeterministic {
        seed: u32,
        expected: u64,
        actual: Option<u64>,
    },
}

pub type Result<T> = std::result::Result<T, AtlasError>;
