use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::{Error, Result};
use crate::extent::TileShape;
use crate::ops::validate_kernel_size;

/// Run settings. Every field is optional in YAML and falls back to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub tile: TileShape,
    pub kernel_size: u32,
    pub log_level: String,
    pub output_cpu: String,
    pub output_gpu_buffer: String,
    pub output_gpu_surface: String,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            tile: TileShape::default(),
            kernel_size: 5,
            log_level: "info".to_string(),
            output_cpu: "output_median_cpu.pgm".to_string(),
            output_gpu_buffer: "output_median_gpu_buffer.pgm".to_string(),
            output_gpu_surface: "output_median_gpu_image.pgm".to_string(),
        }
    }
}

impl BenchConfig {
    /// Loads settings from a YAML file, or returns defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: BenchConfig = match path {
            Some(path) => common::yaml_format::load_yaml(path)
                .map_err(|e| Error::Config(format!("{:#}", e)))?,
            None => BenchConfig::default(),
        };
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.tile.validate()?;
        validate_kernel_size(self.kernel_size)?;

        for name in [
            &self.output_cpu,
            &self.output_gpu_buffer,
            &self.output_gpu_surface,
        ] {
            if name.is_empty() {
                return Err(Error::Config("output file name is empty".to_string()));
            }
        }

        Ok(())
    }
}
