//! Headless capture: PNG screenshots.

use std::error::Error;
use std::fs;
use std::io::BufWriter;
use std::path::Path;

use atari_tia::FRAME_WIDTH;

use crate::Atari2600;

/// Save the display buffer as a PNG file.
///
/// The buffer holds every scanline of the frame, blanking included, at
/// one pixel per colour clock. Pixels are `0x00RRGGBB`.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_screenshot(atari: &Atari2600, path: &Path) -> Result<(), Box<dyn Error>> {
    let display = atari.display();
    let width = FRAME_WIDTH as u32;
    let height = display.len() as u32;

    let file = fs::File::create(path)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;

    let rgb: Vec<u8> = display
        .iter()
        .flatten()
        .flat_map(|&pixel| {
            [
                ((pixel >> 16) & 0xFF) as u8,
                ((pixel >> 8) & 0xFF) as u8,
                (pixel & 0xFF) as u8,
            ]
        })
        .collect();

    writer.write_image_data(&rgb)?;
    Ok(())
}
