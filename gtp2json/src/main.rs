//! gtp2json - GTPv2-C packet decoder
//!
//! Reads hex-encoded GTPv2-C packets one per line, from a file or
//! stdin, and prints one JSON record per packet. A line that fails to
//! decode is logged and skipped; the stream keeps going.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;

use gtpv2_codec::{Decoder, FormatMode};

/// gtp2json - decode GTPv2-C packets into JSON
#[derive(Parser, Debug)]
#[command(name = "gtp2json")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Decode hex-encoded GTPv2-C packets into JSON records", long_about = None)]
struct Args {
    /// Input file with one hex-encoded packet per line, "-" for stdin
    #[arg(short, long, default_value = "-")]
    file: String,

    /// Rendering for enumerated fields (numeric, text, mixed)
    #[arg(long, default_value = "numeric")]
    format: FormatMode,

    /// Pretty-print the JSON records
    #[arg(short, long)]
    pretty: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'e', long, default_value = "info")]
    log_level: String,

    /// Disable color output
    #[arg(short = 'm', long)]
    no_color: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args)?;

    let source = if args.file == "-" {
        "stdin".to_owned()
    } else {
        args.file.clone()
    };
    let reader: Box<dyn BufRead> = if args.file == "-" {
        Box::new(io::stdin().lock())
    } else {
        let file = File::open(&args.file).with_context(|| format!("failed to open {source}"))?;
        Box::new(BufReader::new(file))
    };

    let decoder = Decoder::new(args.format);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut decoded = 0usize;
    let mut skipped = 0usize;
    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read from {source}"))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let data = match hex::decode(line) {
            Ok(data) => data,
            Err(err) => {
                log::warn!("line {}: invalid hex: {}", index + 1, err);
                skipped += 1;
                continue;
            }
        };

        let record = match decoder.decode_packet(Utc::now(), &data) {
            Ok(record) => record,
            Err(err) => {
                log::warn!("line {}: {}", index + 1, err);
                skipped += 1;
                continue;
            }
        };

        let json = if args.pretty {
            serde_json::to_string_pretty(&record)?
        } else {
            serde_json::to_string(&record)?
        };
        writeln!(out, "{json}")?;
        decoded += 1;
    }

    log::info!("{decoded} packets decoded, {skipped} skipped");
    Ok(())
}

fn init_logging(args: &Args) -> Result<()> {
    let mut builder = env_logger::Builder::new();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Info,
    };
    builder.filter_level(level);
    builder.format_timestamp_millis();

    if args.no_color {
        builder.write_style(env_logger::WriteStyle::Never);
    }

    builder.init();

    Ok(())
}
