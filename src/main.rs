use anyhow::Context;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use clap::Parser;
use pgoutput_decoder::{Config, JsonSerializer, PgOutputDecoder, SerializationFormat, XLogData};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "pgoutput-dump")]
#[command(about = "Decode pgoutput replication messages into JSON events", long_about = None)]
struct Args {
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "One base64-encoded message per line (defaults to stdin)"
    )]
    input: Option<PathBuf>,

    #[arg(long, help = "Input lines are XLogData CopyData frames")]
    xlog: bool,

    #[arg(short, long, help = "Pretty-print JSON events")]
    pretty: bool,

    #[arg(short, long, help = "Enable JSON output for logs")]
    json_logs: bool,

    #[arg(short, long, help = "Verbose logging")]
    verbose: bool,
}

#[derive(Debug, Default)]
struct Stats {
    lines: u64,
    decoded: u64,
    skipped: u64,
    failed: u64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path))?,
        None => Config::from_env().context("Failed to load configuration from environment")?,
    };

    init_logging(
        args.json_logs || config.logging.json,
        args.verbose,
        &config.logging.filter,
    );

    info!(
        cstring_scan_limit = config.decoder.cstring_scan_limit,
        xlog = args.xlog,
        input = ?args.input,
        "Starting pgoutput-dump"
    );

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open input {:?}", path))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(io::stdin().lock()),
    };

    let decoder = PgOutputDecoder::with_config(config.decoder.clone());
    let serializer = JsonSerializer::new(if args.pretty {
        SerializationFormat::JsonPretty
    } else {
        SerializationFormat::JsonCompact
    });

    let mut out = io::stdout().lock();
    let mut stats = Stats::default();

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.context("Failed to read input")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        stats.lines += 1;

        let raw = match STANDARD.decode(line) {
            Ok(raw) => Bytes::from(raw),
            Err(e) => {
                warn!(line = line_no, "Skipping line that is not valid base64: {}", e);
                stats.failed += 1;
                continue;
            }
        };

        let payload = if args.xlog {
            match XLogData::parse(raw) {
                Ok(frame) => {
                    debug!(
                        line = line_no,
                        wal_start = %frame.wal_start,
                        wal_end = %frame.wal_end,
                        "XLogData frame"
                    );
                    frame.payload
                }
                Err(e) => {
                    error!(line = line_no, "Failed to parse frame: {}", e);
                    stats.failed += 1;
                    continue;
                }
            }
        } else {
            raw
        };

        match decoder.decode(&payload) {
            Ok(Some(event)) => {
                writeln!(out, "{}", serializer.serialize(&event)?)?;
                stats.decoded += 1;
            }
            Ok(None) => stats.skipped += 1,
            Err(e) => {
                error!(line = line_no, "Failed to decode message: {}", e);
                stats.failed += 1;
            }
        }
    }

    out.flush()?;

    info!(
        lines = stats.lines,
        decoded = stats.decoded,
        skipped = stats.skipped,
        failed = stats.failed,
        "Finished"
    );

    Ok(())
}

fn init_logging(json: bool, verbose: bool, default_filter: &str) {
    let env_filter = if verbose {
        EnvFilter::new("pgoutput_decoder=debug,pgoutput_dump=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
    };

    // Events go to stdout, so logs stay on stderr.
    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_span_list(false)
            .with_writer(io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
