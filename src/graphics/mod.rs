//! Tile sheet images
//!
//! Turns decoded tiles into greyscale PNG sheets and reads such sheets back.

pub mod png;
pub mod sheet;

/// Configuration options for sheet images
#[derive(Debug, Clone)]
pub struct SheetConfig {
    pub tiles_per_row: usize,
    pub optimise_png: bool,
    pub optimisation_preset: u8,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            tiles_per_row: 16,
            optimise_png: true,
            optimisation_preset: 4,
        }
    }
}
