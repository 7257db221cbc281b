use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use matching_engine::engine::OrderBook;
use matching_engine::orderbook::Book;
use matching_engine::orders::{Order, OrderType, Side};

fn seeded_book(depth: u64, orders_per_level: u64) -> Book {
    let mut book = Book::new();
    let mut id = 0u64;
    // Bids rest at 1..=depth, asks at depth+1..=2*depth, so nothing crosses.
    for price in 1..=depth {
        for _ in 0..orders_per_level {
            id += 1;
            book.add_order(Order::new(id, OrderType::GoodTillCancel, Side::Buy, price, 1));
            id += 1;
            book.add_order(Order::new(
                id,
                OrderType::GoodTillCancel,
                Side::Sell,
                depth + price,
                1,
            ));
        }
    }
    book
}

fn bench_matching(c: &mut Criterion) {
    let depth = 100;
    let orders_per_level = 10;
    let book = seeded_book(depth, orders_per_level);

    c.bench_function("crossing sell sweeps half the bids", |b| {
        b.iter_batched(
            || book.clone(),
            |mut book| {
                book.add_order(Order::new(
                    0,
                    OrderType::GoodTillCancel,
                    Side::Sell,
                    depth / 2,
                    depth * orders_per_level / 2,
                ))
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("market buy walks the asks", |b| {
        b.iter_batched(
            || book.clone(),
            |mut book| {
                book.add_order(Order::new(
                    0,
                    OrderType::Market,
                    Side::Buy,
                    0,
                    depth * orders_per_level / 2,
                ))
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("cancel a deep resting order", |b| {
        b.iter_batched(
            || book.clone(),
            |mut book| book.cancel_order(1),
            BatchSize::SmallInput,
        )
    });
}

fn bench_queue(c: &mut Criterion) {
    c.bench_function("queue 10k adds and drain", |b| {
        b.iter(|| {
            let book = OrderBook::new();
            for i in 0..10_000u64 {
                let side = if i % 2 == 0 { Side::Buy } else { Side::Sell };
                book.enqueue_add(i + 1, OrderType::GoodTillCancel, side, 50 + i % 10, 1);
            }
            book.wait_for_drain();
        })
    });
}

criterion_group!(benches, bench_matching, bench_queue);
criterion_main!(benches);
