use std::{fs, path::Path};

use log::{info, warn};

use crate::{
    error::ToolError,
    filesystem::{write_bytes, TileFormat},
    formats::chr::{collect_tiles, encode_bank, CodecError, Tile, CHR_TILES_PER_BANK},
    graphics::{
        png::read_sheet,
        sheet::{split_sheet, SampleMatrix},
        SheetConfig,
    },
};

/// Collects tiles from a sheet image or tile list and packs them into a CHR bank.
#[derive(Debug)]
pub struct BankBuilder {
    tiles: Vec<Tile>,
}

impl BankBuilder {
    /// Load tiles from `source`, choosing the layout from its extension
    pub fn open<P: AsRef<Path>>(source: P, config: &SheetConfig) -> Result<Self, ToolError> {
        let source = source.as_ref();
        let builder = match TileFormat::from_path(source) {
            TileFormat::Sheet => {
                let sheet = read_sheet(source)?;
                Self::from_sheet(&sheet, config)?
            }
            TileFormat::TileList => Self::from_tile_list(&fs::read(source)?)?,
        };

        info!("Loaded {} tiles from {}", builder.tiles.len(), source.display());
        if builder.tiles.len() != CHR_TILES_PER_BANK {
            warn!(
                "{} holds {} tiles; a bank needs exactly {}",
                source.display(),
                builder.tiles.len(),
                CHR_TILES_PER_BANK
            );
        }
        Ok(builder)
    }

    pub fn from_sheet(sheet: &SampleMatrix, config: &SheetConfig) -> Result<Self, CodecError> {
        Ok(BankBuilder {
            tiles: split_sheet(sheet, config.tiles_per_row)?,
        })
    }

    /// Parse a JSON array of tiles, each an array of 8 rows of 8 values.
    ///
    /// Values are read as plain integers so that 256 or -1 is a pixel error rather
    /// than a JSON error.
    pub fn from_tile_list(json: &[u8]) -> Result<Self, ToolError> {
        let bitmaps: Vec<Vec<Vec<i64>>> = serde_json::from_slice(json)?;
        let tiles = collect_tiles(&bitmaps, |rows| Tile::from_wide_rows(rows))?;
        Ok(BankBuilder { tiles })
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        encode_bank(&self.tiles)
    }

    /// Encode the bank and write it to `dest`. Nothing is written if encoding fails.
    pub fn write_bank(&self, dest: &Path) -> Result<(), ToolError> {
        let bank = self.encode()?;
        write_bytes(dest, &bank)?;
        info!("Wrote {} byte bank to {}", bank.len(), dest.display());
        Ok(())
    }
}
