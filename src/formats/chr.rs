//! # Character ROM (CHR) Pattern Tables
//!
//! Each 8x8 tile is stored as two bitplanes of 8 bytes. Plane 0 carries bit 0 of every
//! pixel, plane 1 carries bit 1. Within a plane byte, bit 7 is the leftmost pixel.
//!
//! A bank is 256 tile records of 16 bytes laid end to end, with no header.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

pub const CHR_TILE_DIM: usize = 8;
pub const CHR_PLANE_SIZE: usize = 8;
pub const CHR_BYTES_PER_TILE: usize = 16; // 2 planes × 8 rows
pub const CHR_TILES_PER_BANK: usize = 256;
pub const CHR_BANK_SIZE: usize = CHR_BYTES_PER_TILE * CHR_TILES_PER_BANK; // 4096
pub const CHR_MAX_PIXEL: u8 = 3;

/// Which part of a bitmap had the wrong dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeMismatch {
    Rows,
    Columns { row: usize },
    Tiles,
    SheetWidth,
    SheetHeight,
}

impl fmt::Display for ShapeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeMismatch::Rows => write!(f, "row count"),
            ShapeMismatch::Columns { row } => write!(f, "length of row {}", row),
            ShapeMismatch::Tiles => write!(f, "tile count"),
            ShapeMismatch::SheetWidth => write!(f, "sheet width"),
            ShapeMismatch::SheetHeight => write!(f, "sheet height"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecErrorKind {
    InvalidBitmapShape,
    InvalidPixelValue,
    InvalidBankSize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("Invalid bitmap shape: {mismatch} is {actual}, expected {expected}")]
    InvalidBitmapShape {
        mismatch: ShapeMismatch,
        expected: usize,
        actual: usize,
    },
    #[error("Invalid pixel value {value} at row {row}, column {column} (must be 0-3)")]
    InvalidPixelValue { row: usize, column: usize, value: i64 },
    #[error("Invalid CHR bank size: {actual} bytes, expected {expected}")]
    InvalidBankSize { expected: usize, actual: usize },
    #[error("Tile {index}: {source}")]
    InTile {
        index: usize,
        #[source]
        source: Box<CodecError>,
    },
}

impl CodecError {
    pub fn kind(&self) -> CodecErrorKind {
        match self {
            CodecError::InvalidBitmapShape { .. } => CodecErrorKind::InvalidBitmapShape,
            CodecError::InvalidPixelValue { .. } => CodecErrorKind::InvalidPixelValue,
            CodecError::InvalidBankSize { .. } => CodecErrorKind::InvalidBankSize,
            CodecError::InTile { source, .. } => source.kind(),
        }
    }

    /// Attach the index of the tile the error was raised for
    pub fn in_tile(self, index: usize) -> Self {
        CodecError::InTile {
            index,
            source: Box::new(self),
        }
    }
}

fn check_len(mismatch: ShapeMismatch, expected: usize, actual: usize) -> Result<(), CodecError> {
    if actual != expected {
        return Err(CodecError::InvalidBitmapShape {
            mismatch,
            expected,
            actual,
        });
    }
    Ok(())
}

fn check_shape<T, R: AsRef<[T]>>(rows: &[R]) -> Result<(), CodecError> {
    check_len(ShapeMismatch::Rows, CHR_TILE_DIM, rows.len())?;
    for (y, row) in rows.iter().enumerate() {
        check_len(
            ShapeMismatch::Columns { row: y },
            CHR_TILE_DIM,
            row.as_ref().len(),
        )?;
    }
    Ok(())
}

/// A validated 8x8 grid of 2-bit palette indices, row-major.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Tile {
    pixels: [[u8; CHR_TILE_DIM]; CHR_TILE_DIM],
}

impl Tile {
    /// Build a tile from loosely shaped rows.
    ///
    /// The whole shape is checked before any pixel value, so a ragged bitmap always
    /// reports `InvalidBitmapShape` even if it also holds out-of-range values.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, CodecError> {
        check_shape::<u8, R>(rows)?;

        let mut pixels = [[0u8; CHR_TILE_DIM]; CHR_TILE_DIM];
        for (dst, src) in pixels.iter_mut().zip(rows) {
            dst.copy_from_slice(src.as_ref());
        }
        Self::from_pixels(pixels)
    }

    /// Same as [`Tile::from_rows`] for values that may not even fit in a byte
    pub fn from_wide_rows<R: AsRef<[i64]>>(rows: &[R]) -> Result<Self, CodecError> {
        check_shape::<i64, R>(rows)?;

        let mut pixels = [[0u8; CHR_TILE_DIM]; CHR_TILE_DIM];
        for (row, (dst, src)) in pixels.iter_mut().zip(rows).enumerate() {
            for (column, (pixel, &value)) in dst.iter_mut().zip(src.as_ref()).enumerate() {
                *pixel = u8::try_from(value)
                    .ok()
                    .filter(|&p| p <= CHR_MAX_PIXEL)
                    .ok_or(CodecError::InvalidPixelValue { row, column, value })?;
            }
        }
        Ok(Tile { pixels })
    }

    pub fn from_pixels(pixels: [[u8; CHR_TILE_DIM]; CHR_TILE_DIM]) -> Result<Self, CodecError> {
        for (row, values) in pixels.iter().enumerate() {
            for (column, &value) in values.iter().enumerate() {
                if value > CHR_MAX_PIXEL {
                    return Err(CodecError::InvalidPixelValue {
                        row,
                        column,
                        value: value.into(),
                    });
                }
            }
        }
        Ok(Tile { pixels })
    }

    pub fn pixels(&self) -> &[[u8; CHR_TILE_DIM]; CHR_TILE_DIM] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.pixels[y][x]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8; CHR_TILE_DIM]> {
        self.pixels.iter()
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.iter().flatten().all(|&p| p == 0)
    }
}

/// The two bitplanes of one tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BitplanePair {
    pub plane0: [u8; CHR_PLANE_SIZE],
    pub plane1: [u8; CHR_PLANE_SIZE],
}

impl BitplanePair {
    pub fn from_record(record: &[u8; CHR_BYTES_PER_TILE]) -> Self {
        let mut pair = BitplanePair::default();
        pair.plane0.copy_from_slice(&record[..CHR_PLANE_SIZE]);
        pair.plane1.copy_from_slice(&record[CHR_PLANE_SIZE..]);
        pair
    }

    /// Serialise plane-major: all of plane 0, then all of plane 1
    pub fn to_record(&self) -> [u8; CHR_BYTES_PER_TILE] {
        let mut record = [0u8; CHR_BYTES_PER_TILE];
        record[..CHR_PLANE_SIZE].copy_from_slice(&self.plane0);
        record[CHR_PLANE_SIZE..].copy_from_slice(&self.plane1);
        record
    }

    /// The (plane 0, plane 1) byte pair for a single row
    pub fn row(&self, y: usize) -> (u8, u8) {
        (self.plane0[y], self.plane1[y])
    }
}

/// Pack one row of pixels into its plane 0 and plane 1 bytes
pub fn encode_row(row: &[u8; CHR_TILE_DIM]) -> (u8, u8) {
    let mut lo = 0u8;
    let mut hi = 0u8;
    for (x, &value) in row.iter().enumerate() {
        let bit = 7 - x;
        lo |= (value & 1) << bit;
        hi |= ((value >> 1) & 1) << bit;
    }
    (lo, hi)
}

/// Unpack a plane 0 / plane 1 byte pair into one row of pixels
pub fn decode_row(lo: u8, hi: u8) -> [u8; CHR_TILE_DIM] {
    let mut row = [0u8; CHR_TILE_DIM];
    for (x, value) in row.iter_mut().enumerate() {
        let bit = 7 - x;
        *value = ((lo >> bit) & 1) | (((hi >> bit) & 1) << 1);
    }
    row
}

pub fn encode_planes(tile: &Tile) -> BitplanePair {
    let mut pair = BitplanePair::default();
    for (y, row) in tile.rows().enumerate() {
        let (lo, hi) = encode_row(row);
        pair.plane0[y] = lo;
        pair.plane1[y] = hi;
    }
    pair
}

pub fn encode_tile(tile: &Tile) -> [u8; CHR_BYTES_PER_TILE] {
    encode_planes(tile).to_record()
}

/// Validate a raw bitmap and encode it to a 16 byte tile record
pub fn encode<R: AsRef<[u8]>>(bitmap: &[R]) -> Result<[u8; CHR_BYTES_PER_TILE], CodecError> {
    Tile::from_rows(bitmap).map(|tile| encode_tile(&tile))
}

/// Encode a full bank of 256 tiles into 4096 bytes
pub fn encode_bank(tiles: &[Tile]) -> Result<Vec<u8>, CodecError> {
    check_len(ShapeMismatch::Tiles, CHR_TILES_PER_BANK, tiles.len())?;

    let mut bank = Vec::with_capacity(CHR_BANK_SIZE);
    for tile in tiles {
        bank.extend_from_slice(&encode_tile(tile));
    }
    Ok(bank)
}

/// Validate and encode raw nested bitmaps. Errors name the offending tile.
pub fn encode_bank_rows<R: AsRef<[u8]>>(bitmaps: &[Vec<R>]) -> Result<Vec<u8>, CodecError> {
    check_len(ShapeMismatch::Tiles, CHR_TILES_PER_BANK, bitmaps.len())?;

    let tiles = collect_tiles(bitmaps, |rows| Tile::from_rows(rows))?;
    encode_bank(&tiles)
}

/// Build one tile per bitmap, tagging any failure with the index of its tile
pub fn collect_tiles<B, F>(bitmaps: &[B], mut build: F) -> Result<Vec<Tile>, CodecError>
where
    F: FnMut(&B) -> Result<Tile, CodecError>,
{
    bitmaps
        .iter()
        .enumerate()
        .map(|(i, bitmap)| build(bitmap).map_err(|e| e.in_tile(i)))
        .collect()
}

pub fn decode_tile(record: &[u8; CHR_BYTES_PER_TILE]) -> Tile {
    let pair = BitplanePair::from_record(record);
    let mut pixels = [[0u8; CHR_TILE_DIM]; CHR_TILE_DIM];
    for (y, row) in pixels.iter_mut().enumerate() {
        let (lo, hi) = pair.row(y);
        *row = decode_row(lo, hi);
    }
    // Every decoded value is two bits wide
    Tile { pixels }
}

/// Decode a single record held in an arbitrary slice
pub fn decode_record(record: &[u8]) -> Result<Tile, CodecError> {
    let fixed: &[u8; CHR_BYTES_PER_TILE] =
        record.try_into().map_err(|_| CodecError::InvalidBankSize {
            expected: CHR_BYTES_PER_TILE,
            actual: record.len(),
        })?;
    Ok(decode_tile(fixed))
}

/// Decode a 4096 byte bank into its 256 tiles, in record order
pub fn decode_bank(data: &[u8]) -> Result<Vec<Tile>, CodecError> {
    if data.len() != CHR_BANK_SIZE {
        return Err(CodecError::InvalidBankSize {
            expected: CHR_BANK_SIZE,
            actual: data.len(),
        });
    }

    data.chunks_exact(CHR_BYTES_PER_TILE)
        .map(decode_record)
        .collect()
}
