use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use medfilt::prelude::*;

const USAGE: &str = "usage: medfilt <input image> <output dir> [config.yaml]";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    if !(3..=4).contains(&args.len()) {
        eprintln!("{}", USAGE);
        return ExitCode::FAILURE;
    }

    let config = match BenchConfig::load(args.get(3).map(Path::new)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let _logger = common::setup_logging(&config.log_level);

    match run(Path::new(&args[1]), &PathBuf::from(&args[2]), &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(input: &Path, output_dir: &Path, config: &BenchConfig) -> Result<()> {
    let raw = GrayImage::read_file(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    log::info!("Loaded {} ({}x{})", input.display(), raw.width(), raw.height());

    let tiled = medfilt::bench::prepare(config, &raw)?;

    let ctx = Gpu::new()?;
    let comparison = medfilt::bench::run_prepared(&ctx, config, &tiled)?;

    comparison
        .save_outputs(output_dir, config)
        .with_context(|| format!("failed to write outputs to {}", output_dir.display()))?;

    for line in comparison.report_lines() {
        println!("{}", line);
    }

    Ok(())
}
