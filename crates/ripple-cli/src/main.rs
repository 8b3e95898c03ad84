//! ripple: incremental prefix-checksum harness
//!
//! Commands:
//!   bench                 - time Ripple, Naive and Trivial on one replaced block
//!   checksum <file>       - split a file into blocks and print cumulative CRC-32s
//!   modify <file>         - change one byte in memory and repair the table
//!   config show           - display the active configuration

mod harness;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use ripple_checksum::{
    apply, BlockSequence, ChecksumFunction, ChecksumTable, CountingSource, Crc32,
};
use ripple_core::config::{HarnessConfig, RippleConfig};
use ripple_core::StrategyKind;

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "ripple",
    version,
    about = "Incremental CRC-32 prefix-checksum maintenance",
    long_about = "ripple: compare strategies for repairing a cumulative checksum table after one block changes"
)]
struct Cli {
    /// Path to ripple.toml configuration file
    #[arg(long, short = 'c', env = "RIPPLE_CONFIG", default_value = "ripple.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, env = "RIPPLE_LOG", global = true)]
    log: Option<String>,

    /// Log format; overrides the config file
    #[arg(long, env = "RIPPLE_LOG_FORMAT", global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Time each update strategy over the same random block sequence
    Bench {
        /// Number of blocks
        #[arg(long)]
        blocks: Option<usize>,
        /// Bytes per block
        #[arg(long)]
        block_size: Option<usize>,
        /// Index of the replaced block
        #[arg(long)]
        index: Option<usize>,
        /// Timed repetitions per strategy
        #[arg(long)]
        trials: Option<u32>,
        /// RNG seed for block content
        #[arg(long)]
        seed: Option<u64>,
        /// Strategies to run, comma separated (ripple,naive,trivial)
        #[arg(long, value_delimiter = ',')]
        strategies: Option<Vec<StrategyKind>>,
        /// Skip the rebuild-and-compare check
        #[arg(long)]
        no_verify: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the cumulative checksum of every block of a file
    Checksum {
        file: PathBuf,
        /// Block size in bytes (default: harness.block_size)
        #[arg(long, short = 'b')]
        block_size: Option<usize>,
    },

    /// Overwrite one byte in memory and repair the checksum table
    ///
    /// The file on disk is not modified.
    Modify {
        file: PathBuf,
        /// Byte offset in the file
        #[arg(long)]
        offset: u64,
        /// New byte: a single character or a hex value such as 0x51
        #[arg(long, value_parser = parse_byte)]
        byte: u8,
        /// Block size in bytes (default: harness.block_size)
        #[arg(long, short = 'b')]
        block_size: Option<usize>,
        /// Update strategy
        #[arg(long, short = 's', default_value = "ripple")]
        strategy: StrategyKind,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (defaults merged with the config file)
    Show,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, found) = load_config(&cli.config)?;

    let level = cli.log.clone().unwrap_or_else(|| config.log.level.clone());
    let format = match cli.log_format {
        Some(format) => format,
        None => LogFormat::from_str(&config.log.format, true)
            .map_err(|e| anyhow::anyhow!("invalid log.format '{}': {e}", config.log.format))?,
    };
    init_logging(&level, format);

    if !found {
        warn!("config file not found: {}  (using defaults)", cli.config.display());
    }

    match cli.command {
        Commands::Bench {
            blocks,
            block_size,
            index,
            trials,
            seed,
            strategies,
            no_verify,
            json,
        } => {
            let mut harness = config.harness.clone();
            if let Some(v) = blocks {
                harness.blocks = v;
            }
            if let Some(v) = block_size {
                harness.block_size = v;
            }
            if let Some(v) = index {
                harness.modify_index = v;
            }
            if let Some(v) = trials {
                harness.trials = v;
            }
            if let Some(v) = strategies {
                harness.strategies = v;
            }
            harness.seed = seed.or(harness.seed);
            harness.verify = harness.verify && !no_verify;
            cmd_bench(&harness, json)
        }
        Commands::Checksum { file, block_size } => {
            cmd_checksum(&file, block_size.unwrap_or(config.harness.block_size))
        }
        Commands::Modify {
            file,
            offset,
            byte,
            block_size,
            strategy,
        } => cmd_modify(
            &file,
            offset,
            byte,
            block_size.unwrap_or(config.harness.block_size),
            strategy,
        ),
        Commands::Config {
            action: ConfigAction::Show,
        } => cmd_config_show(&config, &cli.config),
    }
}

// ── Config loading ────────────────────────────────────────────────────────────

/// Load the config file, or defaults if it does not exist.
///
/// Returns whether the file was found so the caller can warn once logging is up.
fn load_config(path: &Path) -> Result<(RippleConfig, bool)> {
    if path.exists() {
        let config = RippleConfig::from_file(path)
            .with_context(|| format!("loading config: {}", path.display()))?;
        Ok((config, true))
    } else {
        Ok((RippleConfig::default(), false))
    }
}

fn init_logging(level: &str, format: LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn parse_byte(s: &str) -> Result<u8, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u8::from_str_radix(hex, 16).map_err(|e| format!("invalid hex byte '{s}': {e}"));
    }
    match s.as_bytes() {
        [b] => Ok(*b),
        _ => Err(format!("expected one ASCII character or 0xNN, got '{s}'")),
    }
}

fn make_progress_bar(prefix: &str) -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template("{prefix:.bold} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    pb.set_prefix(prefix.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

// ── `ripple bench` ────────────────────────────────────────────────────────────

fn cmd_bench(settings: &HarnessConfig, json: bool) -> Result<()> {
    let pb = if json {
        ProgressBar::hidden()
    } else {
        make_progress_bar("bench")
    };

    let report = harness::run(settings, &pb)?;
    pb.finish_and_clear();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serializing report")?
        );
    } else {
        print!("{}", harness::render_table(&report));
    }

    if report.results.iter().any(|r| r.verified == Some(false)) {
        anyhow::bail!("at least one strategy produced an inconsistent table");
    }
    Ok(())
}

// ── `ripple checksum` ─────────────────────────────────────────────────────────

fn cmd_checksum(file: &Path, block_size: usize) -> Result<()> {
    let data = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let seq = BlockSequence::from_chunks(&data, block_size)?;
    let algebra = Crc32::new();
    let table = ChecksumTable::rebuild(&algebra, &seq)?;

    info!(file = %file.display(), blocks = seq.len(), block_size, "checksummed file");

    println!("{:>6} {:>12} {:>8} {:>10}", "block", "offset", "length", "crc32");
    let mut offset = 0u64;
    for (index, (block, crc)) in seq.iter().zip(table.entries()).enumerate() {
        println!("{:>6} {:>12} {:>8} {:>10}", index, offset, block.len(), crc);
        offset += block.len();
    }

    let direct = algebra.checksum(&data);
    let total = table.total().unwrap_or_else(|| algebra.empty());
    println!();
    println!("  file crc32: {direct}");
    println!("  table:      {total}");
    if total != direct {
        anyhow::bail!("cumulative checksum {total} does not match file checksum {direct}");
    }
    Ok(())
}

// ── `ripple modify` ───────────────────────────────────────────────────────────

fn cmd_modify(
    file: &Path,
    offset: u64,
    byte: u8,
    block_size: usize,
    strategy: StrategyKind,
) -> Result<()> {
    let data = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let mut seq = BlockSequence::from_chunks(&data, block_size)?;
    let algebra = Crc32::new();
    let mut table = ChecksumTable::rebuild(&algebra, &seq)?;
    let before = table.clone();

    let index = seq
        .modify_byte(offset, byte)
        .with_context(|| format!("modifying byte at offset {offset}"))?;

    let counting = CountingSource::new(&seq);
    let report = apply(strategy, &algebra, &counting, &mut table, index)?;

    println!(
        "offset {offset} -> block {index}; {strategy} rewrote {} entries, read {} block(s)",
        report.entries_rewritten,
        counting.read_count()
    );
    for (i, (old, new)) in before.entries().iter().zip(table.entries()).enumerate().skip(index) {
        println!("{:>6}  {old} -> {new}", i);
    }

    let direct = algebra.checksum(&seq.concat());
    let total = table.total().unwrap_or_else(|| algebra.empty());
    println!();
    println!("  modified crc32: {direct}");
    println!("  table:          {total}");
    if total != direct {
        anyhow::bail!("updated checksum {total} does not match modified content {direct}");
    }
    Ok(())
}

// ── `ripple config show` ──────────────────────────────────────────────────────

fn cmd_config_show(config: &RippleConfig, config_path: &Path) -> Result<()> {
    println!("# config: {}", config_path.display());
    print!(
        "{}",
        toml::to_string_pretty(config).context("serializing config")?
    );
    Ok(())
}
