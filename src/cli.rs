use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use crate::{converter::Options, segments::MergePolicy};

/// Convert a 64-bit little-endian ELF executable into an SBF image.
#[derive(Parser, Debug)]
#[command(name = "elf2sbf", version, about)]
pub struct Cli {
    /// ELF64 executable to read.
    pub input: PathBuf,

    /// Where to write the SBF image.
    pub output: PathBuf,

    /// Append every TEXT/DATA segment instead of keeping only the last one.
    #[arg(long)]
    pub merge_segments: bool,

    /// Log each program header as it is classified.
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors.
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    pub fn options(&self) -> Options {
        Options {
            merge_policy: if self.merge_segments {
                MergePolicy::Concatenate
            } else {
                MergePolicy::LastWins
            },
        }
    }

    /// `RUST_LOG` still overrides this.
    pub fn log_level(&self) -> LevelFilter {
        match (self.verbose, self.quiet) {
            (true, _) => LevelFilter::Debug,
            (_, true) => LevelFilter::Error,
            _ => LevelFilter::Warn,
        }
    }
}
