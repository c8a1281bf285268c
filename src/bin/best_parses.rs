use clap::Parser;
use spfeatures::config::{DEFAULT_FEATURE_SET, OutputMode, ScoreConfig};
use spfeatures::io::open_input;
use spfeatures::scorer::Scorer;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Rerank n-best parses read from stdin with trained feature weights.
#[derive(Parser)]
#[command(name = "best-parses", version)]
struct Args {
    /// Use relative rather than absolute counts
    #[arg(short = 'a')]
    relative_counts: bool,

    /// Debug level: 0 info, 1 debug, 2 or more trace
    #[arg(short = 'd', default_value_t = 0)]
    debug: u8,

    /// Feature set the definitions were extracted with
    #[arg(short = 'f', default_value = DEFAULT_FEATURE_SET)]
    feature_set: String,

    /// Lowercase words
    #[arg(short = 'l')]
    lowercase: bool,

    /// Output: 0 best tree, 1 ranked trees, 2 weighted feature values
    #[arg(short = 'm', default_value_t = 0)]
    mode: u8,

    /// Feature definitions written by extract-spfeatures
    definitions: PathBuf,

    /// Feature weights, `id=weight`
    weights: PathBuf,
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
    let config = ScoreConfig {
        absolute_counts: !args.relative_counts,
        lowercase: args.lowercase,
        mode: OutputMode::try_from(args.mode)?,
        feature_set: args.feature_set,
    };
    log::info!("{config:?}");
    let scorer = Scorer::load(
        &config,
        open_input(&args.definitions)?,
        open_input(&args.weights)?,
    )?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    scorer.run(stdin.lock(), config.lowercase, config.mode, &mut out)?;
    out.flush()?;
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
