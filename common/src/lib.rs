pub mod log_setup;
pub mod yaml_format;

pub use log_setup::setup_logging;
