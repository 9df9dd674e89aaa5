use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming};

/// Starts the global logger.
///
/// `base_level` is a flexi_logger spec (e.g. `"info"` or `"medfilt=debug,wgpu=warn"`).
/// `RUST_LOG` takes precedence when set. Records go to a rotating file under
/// `logs/` and are duplicated once, to stderr.
/// Keep the returned handle alive until exit so the file writer gets flushed.
pub fn setup_logging(base_level: &str) -> LoggerHandle {
    Logger::try_with_env_or_str(base_level)
        .unwrap_or_else(|e| panic!("Logger initialization failed with {}", e))
        .log_to_file(
            FileSpec::default()
                .directory("logs")
                .basename("medfilt"),
        )
        .duplicate_to_stderr(Duplicate::All)
        .rotate(
            Criterion::Size(1024 * 1024), //1MB
            Naming::Timestamps,
            Cleanup::KeepLogFiles(5),
        )
        .start()
        .unwrap_or_else(|e| panic!("Logger initialization failed with {}", e))
}
