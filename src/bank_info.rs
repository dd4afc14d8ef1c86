//! Bank summaries for the `info` command.

use std::{
    collections::HashMap,
    hash::{Hash, Hasher},
};

use serde::Serialize;
use twox_hash::XxHash64;

use crate::formats::chr::{decode_bank, CodecError, CHR_BYTES_PER_TILE};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct BankSummary {
    pub size: usize,
    pub tile_count: usize,
    /// Tiles whose pixels are all background
    pub blank_tiles: usize,
    pub unique_tiles: usize,
    /// Number of pixels holding each of the values 0-3
    pub pixel_histogram: [usize; 4],
    /// Non-blank tiles that appear more than once, as lists of tile indices
    pub duplicate_groups: Vec<Vec<usize>>,
}

pub fn summarise_bank(data: &[u8]) -> Result<BankSummary, CodecError> {
    let tiles = decode_bank(data)?;
    let records: Vec<&[u8]> = data.chunks_exact(CHR_BYTES_PER_TILE).collect();
    let (unique, mapping) = deduplicate_records(&records);

    let mut pixel_histogram = [0usize; 4];
    for tile in &tiles {
        for &value in tile.pixels().iter().flatten() {
            pixel_histogram[value as usize] += 1;
        }
    }

    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); unique.len()];
    for (tile_idx, &unique_idx) in mapping.iter().enumerate() {
        groups[unique_idx].push(tile_idx);
    }
    let duplicate_groups = groups
        .into_iter()
        .filter(|group| group.len() > 1 && !tiles[group[0]].is_blank())
        .collect();

    Ok(BankSummary {
        size: data.len(),
        tile_count: tiles.len(),
        blank_tiles: tiles.iter().filter(|t| t.is_blank()).count(),
        unique_tiles: unique.len(),
        pixel_histogram,
        duplicate_groups,
    })
}

/// Deduplicates tile records by hashing their bytes.
///
/// Returns the unique records in first-seen order and a mapping where
/// `mapping[original_index] = unique_index`.
pub fn deduplicate_records<'a>(records: &[&'a [u8]]) -> (Vec<&'a [u8]>, Vec<usize>) {
    let mut buckets: HashMap<u64, Vec<usize>> = HashMap::new();
    let mut unique: Vec<&'a [u8]> = Vec::new();
    let mut mapping = Vec::with_capacity(records.len());

    for &record in records {
        let bucket = buckets.entry(record_hash(record)).or_default();

        // Confirm byte equality in case of a hash collision
        let found = bucket.iter().copied().find(|&idx| unique[idx] == record);
        let unique_idx = match found {
            Some(idx) => idx,
            None => {
                let idx = unique.len();
                unique.push(record);
                bucket.push(idx);
                idx
            }
        };
        mapping.push(unique_idx);
    }

    (unique, mapping)
}

fn record_hash(record: &[u8]) -> u64 {
    let mut hasher = XxHash64::default();
    record.hash(&mut hasher);
    hasher.finish()
}
