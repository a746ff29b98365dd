use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use mergepack::artifacts::{Artifacts, DEFAULT_INPUT};
use mergepack::packing::MergeRanks;
use mergepack::{BitWidth, ConvertOptions, WidthPolicy, convert_tokenizer_file};

/// Convert a `tokenizer.json` into compact vocabulary and merge artifacts.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Increase log verbosity (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Silence all logging.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Defaults to `convert` with default options.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Convert a tokenizer document into artifacts.
    Convert {
        /// Path to the tokenizer document.
        #[arg(long, default_value = DEFAULT_INPUT)]
        input: PathBuf,

        /// Directory to write artifacts into.
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Fixed bits per vocabulary index.
        #[arg(long, conflicts_with = "minimal_width")]
        bit_width: Option<u32>,

        /// Use the smallest width covering the vocabulary.
        #[arg(long)]
        minimal_width: bool,

        /// Re-read and check the written artifacts.
        #[arg(long)]
        verify: bool,
    },

    /// Decode and summarize previously written artifacts.
    Inspect {
        /// Directory holding the artifacts.
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        /// Bits per vocabulary index.
        #[arg(long, default_value_t = BitWidth::DEFAULT.bits())]
        bit_width: u32,

        /// Merge count; inferred from the stream when omitted.
        #[arg(long)]
        count: Option<usize>,

        /// Number of leading merges to show.
        #[arg(long, default_value_t = 10)]
        show: usize,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::Convert {
            input: DEFAULT_INPUT.into(),
            output_dir: ".".into(),
            bit_width: None,
            minimal_width: false,
            verify: false,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    stderrlog::new()
        .module(module_path!())
        .module("mergepack")
        .quiet(args.quiet)
        .verbosity(args.verbose as usize + 2)
        .init()?;

    match args.command.unwrap_or_default() {
        Command::Convert {
            input,
            output_dir,
            bit_width,
            minimal_width,
            verify,
        } => run_convert(input, output_dir, bit_width, minimal_width, verify),
        Command::Inspect {
            dir,
            bit_width,
            count,
            show,
        } => run_inspect(dir, bit_width, count, show),
    }
}

fn width_policy(
    bit_width: Option<u32>,
    minimal_width: bool,
) -> anyhow::Result<WidthPolicy> {
    Ok(match (bit_width, minimal_width) {
        (_, true) => WidthPolicy::Minimal,
        (Some(bits), false) => WidthPolicy::Fixed(BitWidth::new(bits)?),
        (None, false) => WidthPolicy::default(),
    })
}

fn run_convert(
    input: PathBuf,
    output_dir: PathBuf,
    bit_width: Option<u32>,
    minimal_width: bool,
    verify: bool,
) -> anyhow::Result<()> {
    let options = ConvertOptions::default()
        .with_width(width_policy(bit_width, minimal_width)?)
        .with_verify(verify);

    let summary = convert_tokenizer_file(&input, &output_dir, &options)
        .with_context(|| format!("failed to convert {}", input.display()))?;

    log::info!(
        "{} tokens, {} merges at {} bits ({} bytes, {} padding bits)",
        summary.vocab_size,
        summary.merge_count,
        summary.width,
        summary.packed_bytes,
        summary.padding_bits
    );

    Ok(())
}

fn run_inspect(
    dir: PathBuf,
    bit_width: u32,
    count: Option<usize>,
    show: usize,
) -> anyhow::Result<()> {
    let width = BitWidth::new(bit_width)?;

    let decoded = Artifacts::read_from_dir(&dir)
        .and_then(|artifacts| artifacts.decode(width, count))
        .with_context(|| format!("failed to decode artifacts in {}", dir.display()))?;

    let ranks = MergeRanks::from_pairs(&decoded.merges);

    println!("vocabulary: {} tokens", decoded.vocab.len());
    println!(
        "merges: {} ({} distinct) at {width} bits",
        decoded.merges.len(),
        ranks.len()
    );

    for (i, pair) in decoded.merges.iter().take(show).enumerate() {
        let rule = pair.to_rule(&decoded.vocab)?;
        println!("{:>6}: {:?} + {:?}", i + 1, rule.left, rule.right);
    }

    Ok(())
}
