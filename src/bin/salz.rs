//! salz - command line interface.
//!
//! Works on whole files:
//!   salz file.txt file.txt.salz        compress
//!   salz -d file.txt.salz file.txt     decompress
//!   salz -b 20 big.bin big.bin.salz    compress with 1 MiB blocks

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use salz::container;

#[derive(Parser, Debug)]
#[command(version, about = "Compress or decompress files with SALZ", long_about = None)]
struct Args {
    /// Decompress instead of compress.
    #[arg(short, long)]
    decompress: bool,

    /// Log2 of the block size used for compression.
    #[arg(
        short = 'b',
        long,
        default_value_t = 16,
        value_parser = clap::value_parser!(u32).range(10..=24)
    )]
    log2_block_size: u32,

    /// Verbosity (repeat for more detail).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Input file.
    input: PathBuf,

    /// Output file.
    output: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    stderrlog::new()
        .verbosity(args.verbose as usize + 2)
        .timestamp(stderrlog::Timestamp::Second)
        .init()
        .unwrap();

    let input =
        fs::read(&args.input).with_context(|| format!("could not read {}", args.input.display()))?;

    let clock = Instant::now();
    let output = if args.decompress {
        container::decompress(&input)
            .with_context(|| format!("{} is not a valid salz stream", args.input.display()))?
    } else {
        container::compress(&input, 1usize << args.log2_block_size)?
    };
    let elapsed = clock.elapsed().as_secs_f64();

    fs::write(&args.output, &output)
        .with_context(|| format!("could not write {}", args.output.display()))?;

    if args.decompress {
        info!(
            "decompressed {} bytes into {} bytes in {:.3}s",
            input.len(),
            output.len(),
            elapsed
        );
    } else {
        info!(
            "compressed {} bytes into {} bytes (ratio: {:.3}) in {:.3}s",
            input.len(),
            output.len(),
            input.len() as f64 / output.len().max(1) as f64,
            elapsed
        );
    }

    Ok(())
}
