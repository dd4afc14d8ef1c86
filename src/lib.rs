//! Conversion between 2-bit tile bitmaps and NES CHR pattern table banks.

pub mod bank_builder;
pub mod bank_extractor;
pub mod bank_info;
pub mod error;
pub mod filesystem;
pub mod formats;
pub mod graphics;

pub use error::ToolError;
pub use formats::chr::{
    decode_bank, decode_tile, encode, encode_bank, encode_tile, BitplanePair, CodecError,
    CodecErrorKind, Tile,
};
