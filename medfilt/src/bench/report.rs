use std::path::Path;

use super::{FilterPath, PathRun};
use crate::common::Result;
use crate::config::BenchConfig;
use crate::extent::NormalizedExtent;

/// Outputs and timings of all three paths over the same tiled input.
#[derive(Debug, Clone)]
pub struct Comparison {
    extent: NormalizedExtent,
    kernel_size: u32,
    cpu: PathRun,
    gpu_buffer: PathRun,
    gpu_surface: PathRun,
}

impl Comparison {
    pub fn new(
        extent: NormalizedExtent,
        kernel_size: u32,
        cpu: PathRun,
        gpu_buffer: PathRun,
        gpu_surface: PathRun,
    ) -> Self {
        Self {
            extent,
            kernel_size,
            cpu,
            gpu_buffer,
            gpu_surface,
        }
    }

    pub fn extent(&self) -> &NormalizedExtent {
        &self.extent
    }

    pub fn kernel_size(&self) -> u32 {
        self.kernel_size
    }

    pub fn run(&self, path: FilterPath) -> &PathRun {
        match path {
            FilterPath::Cpu => &self.cpu,
            FilterPath::GpuBuffer => &self.gpu_buffer,
            FilterPath::GpuSurface => &self.gpu_surface,
        }
    }

    /// CPU time divided by `path`'s time. Infinite when `path` took no measurable time.
    pub fn speedup(&self, path: FilterPath) -> f64 {
        let cpu = self.cpu.elapsed.as_secs_f64();
        let other = self.run(path).elapsed.as_secs_f64();
        if other == 0.0 {
            return f64::INFINITY;
        }
        cpu / other
    }

    /// Number of samples where `path`'s output differs from the CPU output.
    pub fn mismatches(&self, path: FilterPath) -> usize {
        let reference = &self.cpu.output;
        let output = &self.run(path).output;
        if !reference.same_shape(output) {
            return reference.len().max(output.len());
        }

        reference
            .samples()
            .iter()
            .zip(output.samples())
            .filter(|(a, b)| a != b)
            .count()
    }

    /// Console lines, one per parallel path.
    pub fn report_lines(&self) -> Vec<String> {
        [FilterPath::GpuBuffer, FilterPath::GpuSurface]
            .iter()
            .map(|&path| {
                format!(
                    "MEDIAN FILTER ({}): speedup = {:.6}",
                    path,
                    self.speedup(path)
                )
            })
            .collect()
    }

    /// Writes each path's output as PGM into `dir` under its configured name.
    pub fn save_outputs(&self, dir: &Path, config: &BenchConfig) -> Result<()> {
        std::fs::create_dir_all(dir)?;

        for path in FilterPath::ALL {
            let file = dir.join(path.output_name(config));
            self.run(path).output.save_pgm(&file)?;
            log::info!("Wrote {} output to {}", path, file.display());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::extent::{TileShape, normalize};
    use crate::image::GrayImage;

    fn path_run(path: FilterPath, millis: u64, output: GrayImage) -> PathRun {
        PathRun {
            path,
            output,
            elapsed: Duration::from_millis(millis),
        }
    }

    fn comparison(buffer_output: GrayImage) -> Comparison {
        let extent = normalize(TileShape::new(4, 4).unwrap(), 8, 4).unwrap();
        let reference = GrayImage::new_filled(8, 4, 0.5);

        Comparison::new(
            extent,
            3,
            path_run(FilterPath::Cpu, 400, reference.clone()),
            path_run(FilterPath::GpuBuffer, 100, buffer_output),
            path_run(FilterPath::GpuSurface, 0, reference),
        )
    }

    #[test]
    fn test_speedup() {
        let c = comparison(GrayImage::new_filled(8, 4, 0.5));

        assert!((c.speedup(FilterPath::GpuBuffer) - 4.0).abs() < 1e-9);
        assert!((c.speedup(FilterPath::Cpu) - 1.0).abs() < 1e-9);
        assert!(c.speedup(FilterPath::GpuSurface).is_infinite());
    }

    #[test]
    fn test_mismatches() {
        let mut samples = vec![0.5; 32];
        samples[3] = 0.25;
        samples[31] = 1.0;
        let c = comparison(GrayImage::new_with_data(8, 4, samples).unwrap());

        assert_eq!(c.mismatches(FilterPath::GpuBuffer), 2);
        assert_eq!(c.mismatches(FilterPath::GpuSurface), 0);
    }

    #[test]
    fn test_report_lines() {
        let lines = comparison(GrayImage::new_filled(8, 4, 0.5)).report_lines();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "MEDIAN FILTER (gpu buffer): speedup = 4.000000");
        assert!(lines[1].starts_with("MEDIAN FILTER (gpu image): speedup = "));
    }

    #[test]
    fn test_save_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("out");
        let config = BenchConfig::default();

        comparison(GrayImage::new_filled(8, 4, 0.5))
            .save_outputs(&out_dir, &config)
            .unwrap();

        for path in FilterPath::ALL {
            let saved = GrayImage::read_file(out_dir.join(path.output_name(&config))).unwrap();
            assert_eq!((saved.width(), saved.height()), (8, 4));
        }
    }
}
