use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoiError {
    #[error("Pixel ({x}, {y}) of ROI '{name}' lies outside its {width}x{height} extent")]
    OutOfRange {
        name: String,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("Invalid ROI name: {0:?}")]
    InvalidName(String),

    #[error("Invalid ROI dimensions {width}x{height}: both must be positive")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("No *.png files found in directory {}", directory.display())]
    NoRoiFiles { directory: PathBuf },

    #[error("ROI '{0}' is already present in the index")]
    DuplicateName(String),

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RoiError>;
