//! # Tile Sheets
//!
//! Lays decoded tiles out as one greyscale matrix and cuts such a matrix back into tiles.
//! Tiles are placed left to right, `tiles_per_row` at a time, with tile rows stacked top
//! to bottom. This layout is only a viewing convention; the bank itself has none.

use image::{GrayImage, Luma};

use crate::formats::chr::{CodecError, ShapeMismatch, Tile, CHR_TILE_DIM};

/// 8-bit grey used for each of the four 2-bit samples
pub const GREY_LEVELS: [u8; 4] = [0, 85, 170, 255];

/// A width × height grid of 2-bit grey samples, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleMatrix {
    width: usize,
    height: usize,
    samples: Vec<u8>,
}

impl SampleMatrix {
    pub fn new(width: usize, height: usize) -> Self {
        SampleMatrix {
            width,
            height,
            samples: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.samples[y * self.width + x]
    }

    fn set(&mut self, x: usize, y: usize, sample: u8) {
        self.samples[y * self.width + x] = sample;
    }

    /// Map an 8-bit greyscale image onto 2-bit samples.
    ///
    /// Only the four exact levels in [`GREY_LEVELS`] are accepted.
    pub fn from_grey_image(image: &GrayImage) -> Result<Self, CodecError> {
        let (width, height) = image.dimensions();
        let mut matrix = SampleMatrix::new(width as usize, height as usize);

        for (x, y, Luma([level])) in image.enumerate_pixels() {
            let sample = GREY_LEVELS
                .iter()
                .position(|l| l == level)
                .ok_or_else(|| CodecError::InvalidPixelValue {
                    row: y as usize,
                    column: x as usize,
                    value: i64::from(*level),
                })?;
            matrix.set(x as usize, y as usize, sample as u8);
        }
        Ok(matrix)
    }

    pub fn to_grey_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            Luma([GREY_LEVELS[(self.get(x as usize, y as usize) & 3) as usize]])
        })
    }
}

/// Arrange `tiles` into a sheet `tiles_per_row` tiles wide
pub fn compose_sheet(tiles: &[Tile], tiles_per_row: usize) -> SampleMatrix {
    let tiles_per_row = tiles_per_row.max(1);
    let rows = tiles.len().div_ceil(tiles_per_row);
    let mut sheet = SampleMatrix::new(tiles_per_row * CHR_TILE_DIM, rows * CHR_TILE_DIM);

    for (idx, tile) in tiles.iter().enumerate() {
        let bx = (idx % tiles_per_row) * CHR_TILE_DIM;
        let by = (idx / tiles_per_row) * CHR_TILE_DIM;

        for (py, row) in tile.rows().enumerate() {
            for (px, &value) in row.iter().enumerate() {
                sheet.set(bx + px, by + py, value);
            }
        }
    }
    sheet
}

/// Cut a sheet back into tiles, in the order [`compose_sheet`] placed them
pub fn split_sheet(sheet: &SampleMatrix, tiles_per_row: usize) -> Result<Vec<Tile>, CodecError> {
    let tiles_per_row = tiles_per_row.max(1);
    let expected_width = tiles_per_row * CHR_TILE_DIM;
    if sheet.width() != expected_width {
        return Err(CodecError::InvalidBitmapShape {
            mismatch: ShapeMismatch::SheetWidth,
            expected: expected_width,
            actual: sheet.width(),
        });
    }
    if sheet.height() % CHR_TILE_DIM != 0 {
        return Err(CodecError::InvalidBitmapShape {
            mismatch: ShapeMismatch::SheetHeight,
            expected: sheet.height().next_multiple_of(CHR_TILE_DIM),
            actual: sheet.height(),
        });
    }

    let rows = sheet.height() / CHR_TILE_DIM;
    let mut tiles = Vec::with_capacity(rows * tiles_per_row);
    for idx in 0..rows * tiles_per_row {
        let bx = (idx % tiles_per_row) * CHR_TILE_DIM;
        let by = (idx / tiles_per_row) * CHR_TILE_DIM;

        let mut pixels = [[0u8; CHR_TILE_DIM]; CHR_TILE_DIM];
        for (py, row) in pixels.iter_mut().enumerate() {
            for (px, value) in row.iter_mut().enumerate() {
                *value = sheet.get(bx + px, by + py);
            }
        }
        tiles.push(Tile::from_pixels(pixels).map_err(|e| e.in_tile(idx))?);
    }
    Ok(tiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::chr::CodecErrorKind;

    fn numbered_tile(n: usize) -> Tile {
        let mut pixels = [[0u8; 8]; 8];
        for (y, row) in pixels.iter_mut().enumerate() {
            for (x, p) in row.iter_mut().enumerate() {
                *p = ((n + x + y * 2) % 4) as u8;
            }
        }
        Tile::from_pixels(pixels).unwrap()
    }

    #[test]
    fn test_bank_sheet_dimensions() {
        let tiles: Vec<Tile> = (0..256).map(numbered_tile).collect();
        let sheet = compose_sheet(&tiles, 16);
        assert_eq!(sheet.width(), 128);
        assert_eq!(sheet.height(), 128);
    }

    #[test]
    fn test_tile_placement() {
        let tiles: Vec<Tile> = (0..20).map(numbered_tile).collect();
        let sheet = compose_sheet(&tiles, 16);
        assert_eq!((sheet.width(), sheet.height()), (128, 16));

        // Tile 17 sits in the second tile row, second column
        let tile = &tiles[17];
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(sheet.get(8 + x, 8 + y), tile.pixel(x, y));
            }
        }
        // Padding after the last tile stays background
        assert_eq!(sheet.get(127, 15), 0);
    }

    #[test]
    fn test_split_inverts_compose() {
        let tiles: Vec<Tile> = (0..256).map(numbered_tile).collect();
        let sheet = compose_sheet(&tiles, 16);
        assert_eq!(split_sheet(&sheet, 16).unwrap(), tiles);
    }

    #[test]
    fn test_split_rejects_partial_tiles() {
        let err = split_sheet(&SampleMatrix::new(120, 128), 16).unwrap_err();
        assert_eq!(
            err,
            CodecError::InvalidBitmapShape {
                mismatch: ShapeMismatch::SheetWidth,
                expected: 128,
                actual: 120,
            }
        );

        let err = split_sheet(&SampleMatrix::new(128, 130), 16).unwrap_err();
        assert_eq!(err.kind(), CodecErrorKind::InvalidBitmapShape);
    }

    #[test]
    fn test_grey_levels_round_trip() {
        let tiles: Vec<Tile> = (0..32).map(numbered_tile).collect();
        let sheet = compose_sheet(&tiles, 16);
        let image = sheet.to_grey_image();
        assert_eq!(image.get_pixel(0, 0), &Luma([0]));
        assert_eq!(image.get_pixel(3, 0), &Luma([255]));
        assert_eq!(SampleMatrix::from_grey_image(&image).unwrap(), sheet);
    }

    #[test]
    fn test_unknown_grey_level() {
        let mut image = GrayImage::new(8, 8);
        image.put_pixel(5, 2, Luma([100]));
        assert_eq!(
            SampleMatrix::from_grey_image(&image).unwrap_err(),
            CodecError::InvalidPixelValue {
                row: 2,
                column: 5,
                value: 100,
            }
        );
    }
}
