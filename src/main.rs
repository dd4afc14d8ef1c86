use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use log::{error, info};

use chr_tool::{
    bank_builder::BankBuilder, bank_extractor::BankExtractor, bank_info::summarise_bank,
    filesystem::read_bank, graphics::SheetConfig, ToolError,
};

#[derive(Parser)]
#[command(version, about = "Convert between tile bitmaps and NES CHR banks")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Tiles per row when reading or writing sheet images
    #[arg(long, global = true, default_value_t = 16, value_parser = clap::value_parser!(u16).range(1..=256))]
    tiles_per_row: u16,

    /// Write sheet PNGs without running them through oxipng
    #[arg(long, global = true, default_value_t = false)]
    no_optimise: bool,

    /// oxipng preset level (0-6)
    #[arg(long, global = true, default_value_t = 4, value_parser = clap::value_parser!(u8).range(0..=6))]
    preset: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Pack a sheet image or JSON tile list into a 4096 byte CHR bank
    Encode { source: PathBuf, dest: PathBuf },
    /// Unpack a CHR bank into a sheet image, or a tile list if dest ends in .json
    Decode { source: PathBuf, dest: PathBuf },
    /// Print a JSON summary of a CHR bank
    Info { source: PathBuf },
}

impl Args {
    fn sheet_config(&self) -> SheetConfig {
        SheetConfig {
            tiles_per_row: self.tiles_per_row as usize,
            optimise_png: !self.no_optimise,
            optimisation_preset: self.preset,
        }
    }
}

fn run(args: &Args) -> Result<(), ToolError> {
    let config = args.sheet_config();

    match &args.command {
        Command::Encode { source, dest } => {
            BankBuilder::open(source, &config)?.write_bank(dest)?;
        }
        Command::Decode { source, dest } => {
            BankExtractor::new(source)?.extract_to(dest, &config)?;
        }
        Command::Info { source } => {
            let data = read_bank(source)?;
            let summary = summarise_bank(&data)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => {
            info!("Done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
