use clap::Parser;
use spfeatures::config::{DEFAULT_FEATURE_SET, DEFAULT_MINCOUNT, ExtractConfig};
use spfeatures::driver::{CorpusFiles, extract};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Extract reranker features from n-best parses.
///
/// Features are discovered over the first n-best/gold pair, their
/// definitions go to stdout, and a feature-counts file is written for
/// every triple.
#[derive(Parser)]
#[command(name = "extract-spfeatures", version)]
struct Args {
    /// Export absolute rather than relative counts
    #[arg(short = 'a')]
    absolute_counts: bool,

    /// Collect features from the correct (first) parse
    #[arg(short = 'c')]
    collect_correct: bool,

    /// Collect features from the incorrect parses
    #[arg(short = 'i')]
    collect_incorrect: bool,

    /// Debug level: 0 info, 1 debug, 2 or more trace
    #[arg(short = 'd', default_value_t = 0)]
    debug: u8,

    /// Feature set to extract
    #[arg(short = 'f', default_value = DEFAULT_FEATURE_SET)]
    feature_set: String,

    /// Lowercase words
    #[arg(short = 'l')]
    lowercase: bool,

    /// Minimum number of sentences a feature must be informative in
    #[arg(short = 's', default_value_t = DEFAULT_MINCOUNT)]
    mincount: u32,

    /// train.nbest train.gold train.counts [nbest gold counts]...
    #[arg(required = true, num_args = 3..)]
    files: Vec<PathBuf>,
}

fn init_logging(debug: u8) {
    let level = match debug {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(args: Args) -> spfeatures::Result<()> {
    let config = ExtractConfig {
        absolute_counts: args.absolute_counts,
        collect_correct: args.collect_correct,
        collect_incorrect: args.collect_incorrect,
        lowercase: args.lowercase,
        mincount: args.mincount,
        feature_set: args.feature_set,
    };
    log::info!("{config:?}");
    config.validate()?;
    let corpora = CorpusFiles::from_paths(&args.files)?;

    let stdout = io::stdout();
    let mut definitions = io::BufWriter::new(stdout.lock());
    let nids = extract(&config, &corpora, &mut definitions)?;
    definitions.flush()?;
    log::info!("Done, {nids} feature ids");
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.debug);
    if let Err(e) = run(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
