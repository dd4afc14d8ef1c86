//! Encode and decode through real files, as the command line tool does

use std::{fs, path::PathBuf};

use chr_tool::{
    bank_builder::BankBuilder,
    bank_extractor::BankExtractor,
    filesystem::{read_bank, TileFormat},
    formats::chr::{CodecErrorKind, CHR_BANK_SIZE},
    graphics::SheetConfig,
    ToolError,
};

fn test_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("chr_tool_pipeline").join(name);
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn sample_bank() -> Vec<u8> {
    (0..CHR_BANK_SIZE)
        .map(|i| ((i * 37) ^ (i / 16)) as u8)
        .collect()
}

#[test]
fn test_png_sheet_round_trip() {
    let dir = test_dir("png");
    let bank_path = dir.join("in.chr");
    let sheet_path = dir.join("sheet.png");
    let out_path = dir.join("out.chr");
    let bank = sample_bank();
    fs::write(&bank_path, &bank).unwrap();

    let config = SheetConfig::default();
    let format = BankExtractor::new(&bank_path)
        .unwrap()
        .extract_to(&sheet_path, &config)
        .unwrap();
    assert_eq!(format, TileFormat::Sheet);

    let sheet = image::open(&sheet_path).unwrap();
    assert_eq!((sheet.width(), sheet.height()), (128, 128));

    BankBuilder::open(&sheet_path, &config)
        .unwrap()
        .write_bank(&out_path)
        .unwrap();
    assert_eq!(read_bank(&out_path).unwrap(), bank);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_json_tile_list_round_trip() {
    let dir = test_dir("json");
    let bank_path = dir.join("in.chr");
    let list_path = dir.join("tiles.json");
    let out_path = dir.join("out.chr");
    let bank = sample_bank();
    fs::write(&bank_path, &bank).unwrap();

    let config = SheetConfig::default();
    BankExtractor::new(&bank_path)
        .unwrap()
        .extract_to(&list_path, &config)
        .unwrap();

    let builder = BankBuilder::open(&list_path, &config).unwrap();
    assert_eq!(builder.tiles().len(), 256);
    builder.write_bank(&out_path).unwrap();
    assert_eq!(fs::read(&out_path).unwrap(), bank);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_wider_sheet_layout() {
    let dir = test_dir("wide");
    let bank_path = dir.join("in.chr");
    let sheet_path = dir.join("sheet.png");
    let bank = sample_bank();
    fs::write(&bank_path, &bank).unwrap();

    let config = SheetConfig {
        tiles_per_row: 32,
        optimise_png: false,
        ..SheetConfig::default()
    };
    BankExtractor::new(&bank_path)
        .unwrap()
        .extract_to(&sheet_path, &config)
        .unwrap();

    let sheet = image::open(&sheet_path).unwrap();
    assert_eq!((sheet.width(), sheet.height()), (256, 64));

    let rebuilt = BankBuilder::open(&sheet_path, &config).unwrap().encode().unwrap();
    assert_eq!(rebuilt, bank);

    // Reading with the wrong layout is a shape error, not a silent reshuffle
    let err = BankBuilder::open(&sheet_path, &SheetConfig::default()).unwrap_err();
    assert_eq!(err.exit_code(), 3);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_short_bank_writes_nothing() {
    let dir = test_dir("short");
    let bank_path = dir.join("short.chr");
    let sheet_path = dir.join("sheet.png");
    fs::write(&bank_path, vec![0u8; CHR_BANK_SIZE - 1]).unwrap();

    match BankExtractor::new(&bank_path) {
        Err(ToolError::Codec(e)) => assert_eq!(e.kind(), CodecErrorKind::InvalidBankSize),
        Err(other) => panic!("unexpected error: {:?}", other),
        Ok(_) => panic!("short bank was accepted"),
    }
    assert!(!sheet_path.exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_incomplete_tile_list_writes_nothing() {
    let dir = test_dir("incomplete");
    let list_path = dir.join("tiles.json");
    let out_path = dir.join("out.chr");
    let tiles = vec![vec![vec![1u8; 8]; 8]; 10];
    fs::write(&list_path, serde_json::to_vec(&tiles).unwrap()).unwrap();

    let builder = BankBuilder::open(&list_path, &SheetConfig::default()).unwrap();
    let err = builder.write_bank(&out_path).unwrap_err();
    assert_eq!(err.exit_code(), 3);
    assert!(!out_path.exists());

    let _ = fs::remove_dir_all(&dir);
}
