use std::path::Path;

use super::GrayImage;
use crate::common::Result;

pub(crate) fn load_gray<P: AsRef<Path>>(filename: P) -> Result<GrayImage> {
    // Format comes from the file header, so PGM input needs no particular extension.
    let img = image_lib::ImageReader::open(filename)?
        .with_guessed_format()?
        .decode()?
        .to_luma32f();
    let (width, height) = img.dimensions();

    GrayImage::new_with_data(width, height, img.into_raw())
}

pub(crate) fn save_pgm<P: AsRef<Path>>(image: &GrayImage, filename: P) -> Result<()> {
    let bytes: Vec<u8> = image
        .samples()
        .iter()
        .map(|&v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
        .collect();

    image_lib::save_buffer_with_format(
        filename,
        &bytes,
        image.width(),
        image.height(),
        image_lib::ColorType::L8,
        image_lib::ImageFormat::Pnm,
    )?;

    Ok(())
}
