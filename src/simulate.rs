//! Simulation harness for noisy order flow against the engine.
//!
//! Several submitter threads draw random add/modify/cancel requests and push
//! them through the request queue concurrently, the way external clients
//! would. Ids are drawn from a deliberately small range so that modifies and
//! cancels regularly hit orders that are actually resting.

use std::thread;
use std::time::{Duration, Instant};

use rand::Rng;
use rand::distr::weighted::WeightedIndex;
use rand_distr::{Distribution, LogNormal, Normal};
use tracing::info;

use crate::engine::OrderBook;
use crate::orders::{OrderType, Side};
use crate::queue::Request;

#[derive(Debug, Clone)]
pub struct TrafficConfig {
    pub events: usize,
    pub submitters: usize,
    /// Inclusive id range; reuse within the range drives duplicate adds,
    /// modifies and cancels onto live orders.
    pub id_range: (u64, u64),
    /// Relative weights of add / modify / cancel.
    pub event_weights: [u32; 3],
    /// Relative weights of GoodTillCancel / Market / FillAndKill / FillOrKill.
    pub order_type_weights: [u32; 4],
    pub buy_probability: f64,
    /// Prices are drawn from N(mean, std_dev), clamped to >= 1.
    pub price_mean: f64,
    pub price_std_dev: f64,
    /// Quantities are drawn log-normally, clamped to >= 1.
    pub quantity_location: f64,
    pub quantity_scale: f64,
}

impl TrafficConfig {
    pub fn new(events: usize, submitters: usize) -> Self {
        Self {
            events,
            submitters,
            id_range: (1, (events as u64 * 4 / 5).max(1)),
            event_weights: [90, 5, 5],
            order_type_weights: [60, 10, 25, 5],
            buy_probability: 0.5,
            price_mean: 1000.0,
            price_std_dev: 100.0,
            quantity_location: 6.0,
            quantity_scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TrafficReport {
    pub events: usize,
    pub elapsed: Duration,
    pub resting_orders: usize,
    pub bid_levels: usize,
    pub ask_levels: usize,
}

const ORDER_TYPES: [OrderType; 4] = [
    OrderType::GoodTillCancel,
    OrderType::Market,
    OrderType::FillAndKill,
    OrderType::FillOrKill,
];

/// Pre-built distributions for one submitter thread.
struct RequestSampler {
    id_range: (u64, u64),
    buy_probability: f64,
    event_dist: WeightedIndex<u32>,
    order_type_dist: WeightedIndex<u32>,
    price_dist: Normal<f64>,
    quantity_dist: LogNormal<f64>,
}

impl RequestSampler {
    fn new(cfg: &TrafficConfig) -> Self {
        Self {
            id_range: cfg.id_range,
            buy_probability: cfg.buy_probability,
            event_dist: WeightedIndex::new(cfg.event_weights)
                .expect("event weights must not all be zero"),
            order_type_dist: WeightedIndex::new(cfg.order_type_weights)
                .expect("order type weights must not all be zero"),
            price_dist: Normal::new(cfg.price_mean, cfg.price_std_dev)
                .expect("price std dev must be >= 0"),
            quantity_dist: LogNormal::new(cfg.quantity_location, cfg.quantity_scale)
                .expect("quantity scale must be >= 0"),
        }
    }

    fn sample(&self, rng: &mut impl Rng) -> Request {
        let id = rng.random_range(self.id_range.0..=self.id_range.1);
        let side = if rng.random_bool(self.buy_probability) {
            Side::Buy
        } else {
            Side::Sell
        };
        let price = self.price_dist.sample(rng).max(1.0).round() as u64;
        let quantity = self.quantity_dist.sample(rng).max(1.0).round() as u64;

        match self.event_dist.sample(rng) {
            0 => Request::Add {
                id,
                order_type: ORDER_TYPES[self.order_type_dist.sample(rng)],
                side,
                price,
                quantity,
            },
            1 => Request::Modify {
                id,
                side,
                price,
                quantity,
            },
            _ => Request::Cancel { id },
        }
    }
}

/// Pushes `cfg.events` random requests through the queue from
/// `cfg.submitters` threads, waits for the book to drain and reports the
/// final shape.
pub fn run_traffic(book: &OrderBook, cfg: &TrafficConfig) -> TrafficReport {
    let started = Instant::now();
    let submitters = cfg.submitters.max(1);

    thread::scope(|scope| {
        for submitter in 0..submitters {
            // Spread the events over the submitters.
            let share = cfg.events / submitters + usize::from(submitter < cfg.events % submitters);
            let sampler = RequestSampler::new(cfg);
            scope.spawn(move || {
                let mut rng = rand::rng();
                for _ in 0..share {
                    book.enqueue(sampler.sample(&mut rng));
                }
            });
        }
    });

    book.wait_for_drain();
    let snapshot = book.order_infos();
    let report = TrafficReport {
        events: cfg.events,
        elapsed: started.elapsed(),
        resting_orders: book.size(),
        bid_levels: snapshot.bids.len(),
        ask_levels: snapshot.asks.len(),
    };

    info!(
        events = report.events,
        elapsed_ms = report.elapsed.as_millis() as u64,
        resting_orders = report.resting_orders,
        bid_levels = report.bid_levels,
        ask_levels = report.ask_levels,
        "traffic run complete"
    );
    report
}
