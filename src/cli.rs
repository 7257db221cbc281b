use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::engine::OrderBook;
use crate::input;
use crate::orders::{OrderType, Side};
use crate::simulate::{self, TrafficConfig};

/// Simple CLI to interact with the matching engine
#[derive(Parser)]
#[command(name = "matching-engine")]
#[command(version = "0.1", about = "A single-instrument limit order book matching engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay an event file and check the expected book shape
    Run {
        file: PathBuf,

        /// Dump the final book as JSON instead of the plain listing
        #[arg(long)]
        json: bool,
    },
    /// Push random traffic through the request queue
    Bench {
        #[arg(long, default_value_t = 100_000)]
        events: usize,

        #[arg(long, default_value_t = 4)]
        submitters: usize,
    },
    /// Seed a small book and display it
    Demo,
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Per-order logging would dominate a traffic run, so bench quiets it.
    let level = match cli.command {
        Commands::Bench { .. } => Level::WARN,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run { file, json } => run_file(&file, json),
        Commands::Bench { events, submitters } => run_bench(events, submitters),
        Commands::Demo => run_demo(),
    }
}

fn run_file(path: &Path, json: bool) -> anyhow::Result<()> {
    let (events, expected) = input::parse_event_file(path)?;

    let book = OrderBook::new();
    for event in events {
        book.enqueue(event);
    }
    book.wait_for_drain();

    let snapshot = book.order_infos();
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        book.display();
    }

    let total = book.size();
    if total == expected.total_orders
        && snapshot.bids.len() == expected.bid_levels
        && snapshot.asks.len() == expected.ask_levels
    {
        println!(
            "result check passed: {} orders, {} bid levels, {} ask levels",
            total,
            snapshot.bids.len(),
            snapshot.asks.len()
        );
        Ok(())
    } else {
        anyhow::bail!(
            "result check failed: expected ({}, {}, {}), got ({}, {}, {})",
            expected.total_orders,
            expected.bid_levels,
            expected.ask_levels,
            total,
            snapshot.bids.len(),
            snapshot.asks.len()
        )
    }
}

fn run_bench(events: usize, submitters: usize) -> anyhow::Result<()> {
    let book = OrderBook::new();
    let report = simulate::run_traffic(&book, &TrafficConfig::new(events, submitters));

    println!(
        "processed {} events in {:?} ({} resting orders, {} bid levels, {} ask levels)",
        report.events,
        report.elapsed,
        report.resting_orders,
        report.bid_levels,
        report.ask_levels
    );
    Ok(())
}

fn run_demo() -> anyhow::Result<()> {
    let book = OrderBook::new();

    book.enqueue_add(1, OrderType::GoodTillCancel, Side::Buy, 100, 10);
    book.enqueue_add(2, OrderType::GoodTillCancel, Side::Buy, 90, 10);
    book.enqueue_add(3, OrderType::FillAndKill, Side::Sell, 95, 5);
    book.enqueue_add(4, OrderType::Market, Side::Sell, 0, 5);
    book.display();

    Ok(())
}
