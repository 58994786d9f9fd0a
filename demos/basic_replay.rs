//! Basic usage example for lob-replay.
//!
//! Run with: cargo run --example basic_replay

use lob_replay::{BookConfig, CaptureWindow, OrderBook, Replayer};

fn main() {
    println!("=================================================================");
    println!("lob-replay - Basic Usage Example");
    println!("=================================================================\n");

    // A tiny event log: five NEW orders for SCH
    let log = "\
1609722840021 1000001 SCH BUY NEW 9.9 20
1609722840022 1000002 SCH SELL NEW 9.7 30
1609722840023 1000003 SCH BUY NEW 9.5 5
1609722840024 1000004 SCH BUY NEW 9.9 40
1609722840025 1000005 SCH SELL NEW 9.7 15
";

    // Capture every snapshot in the window, two levels deep
    let window = CaptureWindow::new(1609722840021, 1609722840025);
    let config = BookConfig::new(2).with_window(window);
    let mut replayer = Replayer::new(OrderBook::with_config("SCH", config));
    println!("✓ Created replayer (depth 2, ranged window)\n");

    replayer
        .replay_from(log.as_bytes())
        .expect("replay failed");

    let (book, stats) = replayer.finish();
    println!("Processed {} events:", stats.events_applied);
    println!("  Best bid: {:?}", book.best_bid());
    println!("  Best ask: {:?}", book.best_ask());
    println!();

    println!("Captured snapshots:");
    for line in book.into_recorder().render().lines() {
        println!("  {line}");
    }
}
