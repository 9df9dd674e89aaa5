use std::fmt;
use std::io;

#[derive(Debug)]
pub enum Error {
    /// The raw image is smaller than one tile along at least one axis.
    DegenerateExtent {
        raw_width: u32,
        raw_height: u32,
        tile_width: u32,
        tile_height: u32,
    },
    InvalidTileShape {
        width: u32,
        height: u32,
    },
    InvalidKernelSize(u32),
    SizeMismatch(String),
    BackendUnavailable(String),
    KernelBuildFailure(String),
    UnsupportedTile(String),
    /// The image exceeds a device resource or dispatch limit.
    UnsupportedExtent(String),
    Gpu(String),
    Io(io::Error),
    Encoding(String),
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DegenerateExtent {
                raw_width,
                raw_height,
                tile_width,
                tile_height,
            } => write!(
                f,
                "Degenerate extent: {}x{} image is smaller than one {}x{} tile",
                raw_width, raw_height, tile_width, tile_height
            ),
            Error::InvalidTileShape { width, height } => {
                write!(f, "Invalid tile shape: {}x{}", width, height)
            }
            Error::InvalidKernelSize(size) => write!(
                f,
                "Invalid kernel size: {} (must be odd and in 1..={})",
                size,
                crate::ops::MAX_KERNEL_SIZE
            ),
            Error::SizeMismatch(msg) => write!(f, "Size mismatch: {}", msg),
            Error::BackendUnavailable(msg) => write!(f, "Compute backend unavailable: {}", msg),
            Error::KernelBuildFailure(msg) => write!(f, "Kernel build failed: {}", msg),
            Error::UnsupportedTile(msg) => write!(f, "Unsupported tile: {}", msg),
            Error::UnsupportedExtent(msg) => write!(f, "Unsupported extent: {}", msg),
            Error::Gpu(msg) => write!(f, "GPU error: {}", msg),
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::Encoding(msg) => write!(f, "Encoding error: {}", msg),
            Error::Config(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<image_lib::ImageError> for Error {
    fn from(e: image_lib::ImageError) -> Self {
        Error::Encoding(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
