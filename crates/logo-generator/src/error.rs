//! Logo generation errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
}
