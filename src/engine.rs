//! Public order book engine: the matching core behind a request queue.
//!
//! Submitters enqueue add/modify/cancel requests from any thread; the
//! queue's worker applies them to the book one at a time under the book
//! mutex. Reads drain the queue first, so a thread always observes the
//! effect of everything it enqueued before reading.

use std::sync::{Arc, Mutex};

use crate::orderbook::{Book, BookSnapshot};
use crate::orders::{Order, OrderId, OrderModify, OrderType, Price, Quantity, Side};
use crate::queue::{Request, RequestQueue};

/// Thread-safe order book. Cheap to construct; owns one worker thread for
/// the lifetime of the value.
pub struct OrderBook {
    book: Arc<Mutex<Book>>,
    queue: RequestQueue,
}

impl OrderBook {
    pub fn new() -> Self {
        let book = Arc::new(Mutex::new(Book::new()));
        let worker_book = Arc::clone(&book);

        // The queue mutex is released before this runs, so submitters are
        // never blocked behind matching work.
        let queue = RequestQueue::spawn(move |request| {
            let mut book = worker_book.lock().unwrap();
            match request {
                Request::Add {
                    id,
                    order_type,
                    side,
                    price,
                    quantity,
                } => {
                    book.add_order(Order::new(id, order_type, side, price, quantity));
                }
                Request::Modify {
                    id,
                    side,
                    price,
                    quantity,
                } => {
                    book.modify_order(OrderModify {
                        id,
                        side,
                        price,
                        quantity,
                    });
                }
                Request::Cancel { id } => book.cancel_order(id),
            }
        });

        Self { book, queue }
    }

    /// Queues a new order. The effect on the book is asynchronous.
    pub fn enqueue_add(
        &self,
        id: OrderId,
        order_type: OrderType,
        side: Side,
        price: Price,
        quantity: Quantity,
    ) {
        self.queue.enqueue(Request::Add {
            id,
            order_type,
            side,
            price,
            quantity,
        });
    }

    /// Queues a replacement of a resting order.
    pub fn enqueue_modify(&self, id: OrderId, side: Side, price: Price, quantity: Quantity) {
        self.queue.enqueue(Request::Modify {
            id,
            side,
            price,
            quantity,
        });
    }

    /// Queues a cancellation.
    pub fn enqueue_cancel(&self, id: OrderId) {
        self.queue.enqueue(Request::Cancel { id });
    }

    /// Queues an already-built request, e.g. one parsed from an event file.
    pub fn enqueue(&self, request: Request) {
        self.queue.enqueue(request);
    }

    /// Blocks until every currently queued request has been applied.
    pub fn wait_for_drain(&self) {
        self.queue.wait_for_drain();
    }

    /// Number of resting orders, after draining the queue.
    pub fn size(&self) -> usize {
        self.queue.wait_for_drain();
        self.book.lock().unwrap().size()
    }

    /// Depth snapshot (bids descending, asks ascending), after draining the
    /// queue.
    pub fn order_infos(&self) -> BookSnapshot {
        self.queue.wait_for_drain();
        self.book.lock().unwrap().snapshot()
    }

    /// Prints a human-readable dump of the book. Output format is not a
    /// stability surface.
    pub fn display(&self) {
        self.queue.wait_for_drain();
        let book = self.book.lock().unwrap();

        if book.size() == 0 {
            println!("order book is empty");
            return;
        }

        let snapshot = book.snapshot();
        println!("------ Order Book ------");
        println!("{} outstanding orders", book.size());
        println!("Bids (highest first):");
        for level in &snapshot.bids {
            println!("  {{ price: {}, quantity: {} }}", level.price, level.quantity);
        }
        println!("Asks (lowest first):");
        for level in &snapshot.asks {
            println!("  {{ price: {}, quantity: {} }}", level.price, level.quantity);
        }
        println!("------------------------");
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}
