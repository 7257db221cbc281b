//! Single-writer serialisation of order requests.
//!
//! Any number of submitter threads append tagged requests; exactly one
//! worker thread, owned by the queue, pops them in FIFO order and hands them
//! to the dispatch callback. Readers can block until the queue has drained
//! to observe a state that includes everything they enqueued beforehand.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, mpsc};
use std::thread::{self, JoinHandle};

use crate::orders::{OrderId, OrderType, Price, Quantity, Side};

/// A queued order request, tagged by operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Add {
        id: OrderId,
        order_type: OrderType,
        side: Side,
        price: Price,
        quantity: Quantity,
    },
    Modify {
        id: OrderId,
        side: Side,
        price: Price,
        quantity: Quantity,
    },
    Cancel {
        id: OrderId,
    },
}

struct QueueState {
    requests: VecDeque<Request>,
    /// True while the worker is applying a popped request outside the lock.
    /// Drain waiters wait for this too, so that "drained" means every
    /// request enqueued before the wait was actually applied.
    in_flight: bool,
    stop: bool,
}

struct Shared {
    state: Mutex<QueueState>,
    cond: Condvar,
}

/// FIFO request queue with a dedicated worker thread.
///
/// Dropping the queue stops the worker, but only after any requests still
/// queued at that point have been handled.
pub struct RequestQueue {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl RequestQueue {
    /// Spawns the worker thread and blocks until it is running, so that a
    /// request enqueued right after construction cannot race worker startup.
    pub fn spawn<F>(mut handler: F) -> Self
    where
        F: FnMut(Request) + Send + 'static,
    {
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                requests: VecDeque::new(),
                in_flight: false,
                stop: false,
            }),
            cond: Condvar::new(),
        });

        let worker_shared = Arc::clone(&shared);
        let (ready_tx, ready_rx) = mpsc::channel();
        let worker = thread::spawn(move || {
            ready_tx.send(()).ok();
            worker_loop(&worker_shared, &mut handler);
        });
        ready_rx
            .recv()
            .expect("queue worker exited before signalling ready");

        Self {
            shared,
            worker: Some(worker),
        }
    }

    /// Appends a request and wakes the worker. Returns immediately; the
    /// request is applied asynchronously.
    pub fn enqueue(&self, request: Request) {
        {
            let mut state = self.shared.state.lock().unwrap();
            state.requests.push_back(request);
        }
        self.shared.cond.notify_one();
    }

    /// Blocks until the queue is empty and nothing is being applied. Makes
    /// no promise about requests enqueued by other threads afterwards.
    pub fn wait_for_drain(&self) {
        let state = self.shared.state.lock().unwrap();
        let _state = self
            .shared
            .cond
            .wait_while(state, |s| !s.requests.is_empty() || s.in_flight)
            .unwrap();
    }
}

impl Drop for RequestQueue {
    fn drop(&mut self) {
        {
            let mut state = self.shared.state.lock().unwrap();
            state.stop = true;
        }
        self.shared.cond.notify_all();
        if let Some(worker) = self.worker.take() {
            worker.join().ok();
        }
    }
}

fn worker_loop(shared: &Shared, handler: &mut impl FnMut(Request)) {
    loop {
        let mut state = shared
            .cond
            .wait_while(shared.state.lock().unwrap(), |s| {
                !s.stop && s.requests.is_empty()
            })
            .unwrap();

        // On stop, remaining requests are still handled; the worker exits
        // only once the queue is empty.
        let Some(request) = state.requests.pop_front() else {
            break;
        };
        state.in_flight = true;
        drop(state);

        // The queue lock is not held while dispatching, so submitters never
        // stall behind matching work.
        handler(request);

        let mut state = shared.state.lock().unwrap();
        state.in_flight = false;
        if state.requests.is_empty() {
            shared.cond.notify_all();
        }
    }
}
