use std::process::{Command, Output};

use medfilt::GrayImage;

fn run_medfilt(cwd: &std::path::Path, args: &[&std::path::Path]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_medfilt"))
        .current_dir(cwd)
        .args(args)
        .output()
        .expect("medfilt binary should start")
}

fn console_text(output: &Output) -> String {
    format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

#[test]
fn image_smaller_than_tile_fails_before_gpu_setup() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tiny.pgm");
    let out_dir = dir.path().join("out");
    GrayImage::new_filled(7, 30, 0.5).save_pgm(&input).unwrap();

    let output = run_medfilt(dir.path(), &[&input, &out_dir]);

    assert!(!output.status.success());
    let console = console_text(&output);
    // Normalization runs before the backend is acquired, so this holds with or
    // without an adapter, and the error is printed exactly once.
    assert_eq!(
        console.matches("Degenerate extent").count(),
        1,
        "console output:\n{}",
        console
    );
    assert!(!console.contains("Compute backend unavailable"));
    assert!(!out_dir.exists());
}

#[test]
fn missing_arguments_print_usage() {
    let dir = tempfile::tempdir().unwrap();

    let output = run_medfilt(dir.path(), &[]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("usage: medfilt"));
}
