//! End-to-end scenarios driven by event files, the way external test inputs
//! arrive in production: parse, enqueue, drain, compare against the expected
//! book shape from the file's `R` line.

use std::path::Path;

use matching_engine::engine::OrderBook;
use matching_engine::input;

fn run_scenario(name: &str) {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name);
    let (events, expected) = input::parse_event_file(&path).expect("event file should parse");

    let book = OrderBook::new();
    for event in events {
        book.enqueue(event);
    }
    book.wait_for_drain();

    let snapshot = book.order_infos();
    assert_eq!(book.size(), expected.total_orders, "total orders in {name}");
    assert_eq!(snapshot.bids.len(), expected.bid_levels, "bid levels in {name}");
    assert_eq!(snapshot.asks.len(), expected.ask_levels, "ask levels in {name}");
}

#[test]
fn match_good_till_cancel() {
    run_scenario("Match_GoodTillCancel.txt");
}

#[test]
fn match_fill_and_kill() {
    run_scenario("Match_FillAndKill.txt");
}

#[test]
fn match_fill_or_kill_hit() {
    run_scenario("Match_FillOrKill_Hit.txt");
}

#[test]
fn match_fill_or_kill_miss() {
    run_scenario("Match_FillOrKill_Miss.txt");
}

#[test]
fn match_market() {
    run_scenario("Match_Market.txt");
}

#[test]
fn cancel_success() {
    run_scenario("Cancel_Success.txt");
}

#[test]
fn modify_side() {
    run_scenario("Modify_Side.txt");
}
