//! CLI tool for replaying an order event log into depth snapshots.
//!
//! # Usage
//!
//! ```bash
//! # Final book state at or before a timestamp (start defaults to 0)
//! cargo run --release --bin replay_snapshots -- \
//!     --input SCH.log --symbol SCH --end 1609722840027
//!
//! # Every snapshot inside a window, 3 levels deep, written to a file
//! cargo run --release --bin replay_snapshots -- \
//!     --input SCH.log --symbol SCH \
//!     --start 1609722840000 --end 1609722841000 \
//!     --depth 3 --output snapshots.txt
//! ```

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use lob_replay::{BookConfig, CaptureWindow, OrderBook, Replayer, DEFAULT_DEPTH};

/// Command-line arguments
struct Args {
    /// Input event log file
    input: PathBuf,
    /// Symbol the book tracks
    symbol: String,
    /// Capture window start (0 = final state only)
    start: i64,
    /// Capture window end (inclusive)
    end: i64,
    /// Snapshot depth per side
    depth: usize,
    /// Output file for snapshot lines (stdout if absent)
    output: Option<PathBuf>,
    /// Write replay counters as JSON next to the output
    stats_json: Option<PathBuf>,
}

fn parse_args() -> std::result::Result<Args, String> {
    let args: Vec<String> = env::args().collect();

    let mut input: Option<PathBuf> = None;
    let mut symbol: Option<String> = None;
    let mut start = 0i64;
    let mut end = i64::MAX;
    let mut depth = DEFAULT_DEPTH;
    let mut output: Option<PathBuf> = None;
    let mut stats_json: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--input" | "-i" => {
                i += 1;
                if i >= args.len() {
                    return Err("--input requires a path".to_string());
                }
                input = Some(PathBuf::from(&args[i]));
            }
            "--symbol" | "-s" => {
                i += 1;
                if i >= args.len() {
                    return Err("--symbol requires a value".to_string());
                }
                symbol = Some(args[i].clone());
            }
            "--start" => {
                i += 1;
                if i >= args.len() {
                    return Err("--start requires a timestamp".to_string());
                }
                start = args[i]
                    .parse()
                    .map_err(|_| format!("invalid --start '{}'", args[i]))?;
            }
            "--end" => {
                i += 1;
                if i >= args.len() {
                    return Err("--end requires a timestamp".to_string());
                }
                end = args[i]
                    .parse()
                    .map_err(|_| format!("invalid --end '{}'", args[i]))?;
            }
            "--depth" | "-d" => {
                i += 1;
                if i >= args.len() {
                    return Err("--depth requires a value".to_string());
                }
                depth = args[i]
                    .parse()
                    .map_err(|_| format!("invalid --depth '{}'", args[i]))?;
            }
            "--output" | "-o" => {
                i += 1;
                if i >= args.len() {
                    return Err("--output requires a path".to_string());
                }
                output = Some(PathBuf::from(&args[i]));
            }
            "--stats-json" => {
                i += 1;
                if i >= args.len() {
                    return Err("--stats-json requires a path".to_string());
                }
                stats_json = Some(PathBuf::from(&args[i]));
            }
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            arg => {
                return Err(format!("Unknown argument: {arg}"));
            }
        }
        i += 1;
    }

    let input = input.ok_or("Input path is required")?;
    let symbol = symbol.ok_or("Symbol is required")?;
    if depth == 0 {
        return Err("--depth must be at least 1".to_string());
    }

    Ok(Args {
        input,
        symbol,
        start,
        end,
        depth,
        output,
        stats_json,
    })
}

fn print_help() {
    eprintln!(
        r#"
Replay Order Event Log to Depth Snapshots

Reconstructs a two-sided limit order book from a text event log and
writes the captured depth snapshots as flat lines.

USAGE:
    replay_snapshots --input <LOG> --symbol <SYM> [OPTIONS]

OPTIONS:
    -i, --input <LOG>      Event log file (one event per line, 7 fields)
    -s, --symbol <SYM>     Symbol the book tracks; other symbols are skipped
        --start <TS>       Window start; 0 keeps only the final snapshot
                           at or before --end (default: 0)
        --end <TS>         Window end, inclusive (default: i64::MAX)
    -d, --depth <K>        Price levels per snapshot side (default: 5)
    -o, --output <FILE>    Write snapshot lines here instead of stdout
        --stats-json <F>   Also write replay counters as JSON
    -h, --help             Print this help message

EXAMPLES:
    # Final book state for SCH
    replay_snapshots -i SCH.log -s SCH

    # All snapshots between two timestamps, 3 levels deep
    replay_snapshots -i SCH.log -s SCH --start 100 --end 200 -d 3
"#
    );
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    // Parse arguments
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Use --help for usage information");
            process::exit(1);
        }
    };

    let window = CaptureWindow::new(args.start, args.end);
    let config = BookConfig::new(args.depth).with_window(window);
    let mut replayer = Replayer::new(OrderBook::with_config(&args.symbol, config));

    let start_time = Instant::now();
    if let Err(e) = replayer.replay_file(&args.input) {
        eprintln!("Replay aborted: {e}");
        process::exit(1);
    }
    let elapsed = start_time.elapsed().as_secs_f64();

    let (book, stats) = replayer.finish();
    let recorder = book.into_recorder();

    let write_result = match &args.output {
        Some(path) => recorder.save(path),
        None => recorder.write_to(&mut io::stdout().lock()),
    };
    if let Err(e) = write_result {
        eprintln!("Error writing snapshots: {e}");
        process::exit(1);
    }

    if let Some(path) = &args.stats_json {
        if let Err(e) = stats.save_json(path) {
            eprintln!("Error writing stats: {e}");
            process::exit(1);
        }
    }

    eprintln!("\n{}", "=".repeat(60));
    eprintln!("Replay Complete!");
    eprintln!("  Lines read: {}", stats.lines_read);
    eprintln!("  Events applied: {}", stats.events_applied);
    eprintln!("  Events rejected: {}", stats.events_rejected);
    eprintln!("  Parse errors: {}", stats.parse_errors);
    eprintln!("  Other symbols skipped: {}", stats.other_symbols);
    eprintln!("  Snapshots retained: {}", recorder.len());
    eprintln!("  Total time: {elapsed:.2}s");
    let _ = io::stderr().flush();
}
