mod common;

pub mod bench;
pub mod config;
pub mod extent;
pub mod gpu;
pub mod image;
pub mod ops;
pub mod tiler;

pub mod prelude;

pub use prelude::*;
