//! PNG export and import of tile sheets.

use std::{io::Write, path::Path};

use image::{codecs::png::PngEncoder, ColorType, ImageEncoder};
use log::debug;

use super::{sheet::SampleMatrix, SheetConfig};
use crate::error::ToolError;

/// Encode `sheet` as a greyscale PNG and write it to `sink`.
///
/// The sink belongs to the caller; nothing is written until the whole image is encoded.
pub fn write_sheet_png<W: Write>(
    sheet: &SampleMatrix,
    sink: &mut W,
    config: &SheetConfig,
) -> Result<(), ToolError> {
    let image = sheet.to_grey_image();

    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ColorType::L8,
    )?;

    if config.optimise_png {
        let before = png.len();
        png = optimise_png(&png, config.optimisation_preset)?;
        debug!("PNG optimised from {} to {} bytes", before, png.len());
    }

    sink.write_all(&png)?;
    sink.flush()?;
    Ok(())
}

/// Recompress with oxipng, letting it drop the sheet to 2 bits per pixel
fn optimise_png(png: &[u8], preset: u8) -> Result<Vec<u8>, ToolError> {
    let mut options = oxipng::Options::from_preset(preset);
    options.bit_depth_reduction = true;

    Ok(oxipng::optimize_from_memory(png, &options)?)
}

/// Load any image the `image` crate understands as a sheet of 2-bit samples
pub fn read_sheet<P: AsRef<Path>>(path: P) -> Result<SampleMatrix, ToolError> {
    let image = image::open(path.as_ref())?.into_luma8();
    Ok(SampleMatrix::from_grey_image(&image)?)
}

pub fn read_sheet_from_memory(data: &[u8]) -> Result<SampleMatrix, ToolError> {
    let image = image::load_from_memory(data)?.into_luma8();
    Ok(SampleMatrix::from_grey_image(&image)?)
}
