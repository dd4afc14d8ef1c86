//! Reading and writing whole CHR banks on disk.
//!
//! Banks are always moved as a single buffer. The size on disk is checked before the
//! body is read so an oversized file is never pulled into memory.

use std::{
    fs::{self, File},
    io::{self, Read, Write},
    path::{Path, PathBuf},
};

use log::debug;

use crate::{
    error::ToolError,
    formats::chr::{CodecError, CHR_BANK_SIZE},
};

/// Exact size of the file at `path` in bytes
pub fn file_size<P: AsRef<Path>>(path: P) -> io::Result<u64> {
    Ok(fs::metadata(path.as_ref())?.len())
}

/// Read a bank file, refusing anything that is not exactly one bank long
pub fn read_bank<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, ToolError> {
    let path = path.as_ref();
    let size = file_size(path)?;
    if size != CHR_BANK_SIZE as u64 {
        return Err(CodecError::InvalidBankSize {
            expected: CHR_BANK_SIZE,
            actual: usize::try_from(size).unwrap_or(usize::MAX),
        }
        .into());
    }

    let data = read_bank_body(File::open(path)?, path)?;
    debug!("Read {} bytes from {}", data.len(), path.display());
    Ok(data)
}

/// Read at most one byte past a bank so a file that grew after the size check is
/// still caught without being read in full
fn read_bank_body<R: Read>(reader: R, origin: &Path) -> io::Result<Vec<u8>> {
    let mut data = Vec::with_capacity(CHR_BANK_SIZE + 1);
    reader
        .take(CHR_BANK_SIZE as u64 + 1)
        .read_to_end(&mut data)?;

    // The file can change between the metadata call and the read
    if data.len() != CHR_BANK_SIZE {
        let kind = if data.len() < CHR_BANK_SIZE {
            io::ErrorKind::UnexpectedEof
        } else {
            io::ErrorKind::InvalidData
        };
        return Err(io::Error::new(
            kind,
            format!(
                "{} changed while reading: expected {} bytes",
                origin.display(),
                CHR_BANK_SIZE
            ),
        ));
    }
    Ok(data)
}

/// Write `data` to `path`, creating parent directories as needed.
///
/// The bytes go to a sibling `.part` file that is renamed over `path` once complete,
/// so a failed write never leaves a truncated destination behind.
pub fn write_bytes<P: AsRef<Path>>(path: P, data: &[u8]) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp = partial_path(path)?;
    let written = write_file(&tmp, data).and_then(|()| fs::rename(&tmp, path));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }

    debug!("Wrote {} bytes to {}", data.len(), path.display());
    Ok(())
}

fn partial_path(path: &Path) -> io::Result<PathBuf> {
    let mut name = path
        .file_name()
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} does not name a file", path.display()),
            )
        })?
        .to_os_string();
    name.push(".part");
    Ok(path.with_file_name(name))
}

fn write_file(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}

/// How a file of tiles is laid out, judged by its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileFormat {
    /// A greyscale image holding a sheet of tiles
    Sheet,
    /// A JSON array of tiles, each an array of 8 rows
    TileList,
}

impl TileFormat {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => TileFormat::TileList,
            _ => TileFormat::Sheet,
        }
    }
}
