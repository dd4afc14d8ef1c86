use std::{
    io::Write,
    path::{Path, PathBuf},
};

use log::info;

use crate::{
    error::ToolError,
    filesystem::{read_bank, write_bytes, TileFormat},
    formats::chr::{decode_bank, CodecError, Tile},
    graphics::{png::write_sheet_png, sheet::compose_sheet, SheetConfig},
};

/// Decodes a CHR bank and writes its tiles out as a sheet image or tile list.
pub struct BankExtractor {
    bank_path: Option<PathBuf>,
    tiles: Vec<Tile>,
}

impl BankExtractor {
    pub fn new<P: AsRef<Path>>(bank_path: P) -> Result<Self, ToolError> {
        let bank_path = bank_path.as_ref().to_path_buf();
        let data = read_bank(&bank_path)?;
        let tiles = decode_bank(&data)?;

        info!("Decoded {} tiles from {}", tiles.len(), bank_path.display());
        Ok(BankExtractor {
            bank_path: Some(bank_path),
            tiles,
        })
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, CodecError> {
        Ok(BankExtractor {
            bank_path: None,
            tiles: decode_bank(data)?,
        })
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn write_sheet<W: Write>(&self, sink: &mut W, config: &SheetConfig) -> Result<(), ToolError> {
        let sheet = compose_sheet(&self.tiles, config.tiles_per_row);
        write_sheet_png(&sheet, sink, config)
    }

    pub fn write_tile_list<W: Write>(&self, sink: &mut W) -> Result<(), ToolError> {
        serde_json::to_writer(&mut *sink, &self.tiles)?;
        sink.flush()?;
        Ok(())
    }

    /// Write the tiles to `dest`, choosing the layout from its extension.
    ///
    /// The output is fully rendered in memory before `dest` is created.
    pub fn extract_to(&self, dest: &Path, config: &SheetConfig) -> Result<TileFormat, ToolError> {
        let format = TileFormat::from_path(dest);
        let mut buffer = Vec::new();
        match format {
            TileFormat::Sheet => self.write_sheet(&mut buffer, config)?,
            TileFormat::TileList => self.write_tile_list(&mut buffer)?,
        }
        write_bytes(dest, &buffer)?;

        let source = self
            .bank_path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<memory>".to_string());
        info!(
            "Wrote {} tiles from {} to {} ({:?})",
            self.tiles.len(),
            source,
            dest.display(),
            format
        );
        Ok(format)
    }
}
