use super::*;

#[test]
fn test_new_with_data_checks_length() {
    let result = GrayImage::new_with_data(4, 4, vec![0.0; 15]);
    assert!(matches!(result, Err(Error::SizeMismatch(_))));

    let image = GrayImage::new_with_data(4, 4, vec![0.5; 16]).unwrap();
    assert_eq!(image.len(), 16);
    assert_eq!(image.size_in_bytes(), 64);
}

#[test]
fn test_from_fn_is_row_major() {
    let image = GrayImage::from_fn(3, 2, |x, y| (x + 10 * y) as f32);

    assert_eq!(image.samples(), &[0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
    assert_eq!(image.get(2, 1), 12.0);
}

#[test]
fn test_pgm_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gradient.pgm");

    let image = GrayImage::from_fn(17, 9, |x, y| ((x * 9 + y) % 256) as f32 / 255.0);
    image.save_pgm(&path).unwrap();

    let loaded = GrayImage::read_file(&path).unwrap();
    assert_eq!(loaded.width(), 17);
    assert_eq!(loaded.height(), 9);
    for (i, (a, b)) in image.samples().iter().zip(loaded.samples()).enumerate() {
        assert!((a - b).abs() < 1e-6, "sample {} differs: {} vs {}", i, a, b);
    }
}

#[test]
fn test_save_pgm_clamps_out_of_range() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clamped.pgm");

    let image = GrayImage::new_with_data(2, 1, vec![-3.0, 7.5]).unwrap();
    image.save_pgm(&path).unwrap();

    let loaded = GrayImage::read_file(&path).unwrap();
    assert_eq!(loaded.samples(), &[0.0, 1.0]);
}

#[test]
fn test_read_pgm_without_extension() {
    let dir = tempfile::tempdir().unwrap();
    let pgm_path = dir.path().join("frame.pgm");
    let bare_path = dir.path().join("frame");
    let odd_path = dir.path().join("frame.dat");

    let image = GrayImage::from_fn(6, 4, |x, y| ((x + 6 * y) * 10) as f32 / 255.0);
    image.save_pgm(&pgm_path).unwrap();
    std::fs::copy(&pgm_path, &bare_path).unwrap();
    std::fs::copy(&pgm_path, &odd_path).unwrap();

    for path in [bare_path, odd_path] {
        let loaded = GrayImage::read_file(&path).unwrap();
        assert_eq!((loaded.width(), loaded.height()), (6, 4));
        assert!((loaded.get(5, 3) - 230.0 / 255.0).abs() < 1e-6);
    }
}

#[test]
fn test_read_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(GrayImage::read_file(dir.path().join("missing.pgm")).is_err());
}
