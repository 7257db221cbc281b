use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::orders::{Order, OrderId, OrderModify, OrderType, Price, Quantity, Side};
use crate::trade::{Trade, TradeInfo, Trades};

/// Aggregate view of one price level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelInfo {
    pub price: Price,
    pub quantity: Quantity,
}

/// Depth snapshot of the whole book. Bids are in descending price order,
/// asks ascending, so index 0 is the best level on either side.
#[derive(Debug, Clone, Serialize)]
pub struct BookSnapshot {
    pub bids: Vec<LevelInfo>,
    pub asks: Vec<LevelInfo>,
}

/// A resting order plus its links in the FIFO queue of its price level.
///
/// Level queues are doubly-linked lists threaded through these nodes, which
/// is what makes cancellation O(1) while keeping time priority intact.
#[derive(Debug, Clone)]
struct OrderNode {
    order: Order,
    prev: Option<OrderId>,
    next: Option<OrderId>,
}

/// Head and tail of one price level's FIFO queue. The nodes themselves live
/// in the order index.
#[derive(Debug, Clone, Copy, Default)]
struct LevelQueue {
    head: Option<OrderId>,
    tail: Option<OrderId>,
}

/// Cached aggregate depth for one price: outstanding quantity and number of
/// resting orders. Kept write-through so the fill-or-kill preflight never has
/// to walk level queues.
#[derive(Debug, Clone, Copy, Default)]
struct LevelDepth {
    quantity: Quantity,
    count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DepthChange {
    Add,
    Remove,
    Match,
}

/// A [`Book`] stores active buy and sell orders in two price-indexed
/// [`BTreeMap`]s:
/// - `bids` (buy orders), best price = highest = last key
/// - `asks` (sell orders), best price = lowest = first key
///
/// Each price level holds a FIFO queue of orders to maintain **price-time**
/// priority. Orders are owned by the id index, which also carries the queue
/// links, and `levels` caches per-price aggregate depth.
///
/// The book is single-threaded; callers that share it across threads wrap it
/// in a mutex and serialise every mutation (see [`crate::engine::OrderBook`]).
#[derive(Debug, Clone, Default)]
pub struct Book {
    bids: BTreeMap<Price, LevelQueue>,
    asks: BTreeMap<Price, LevelQueue>,
    orders: HashMap<OrderId, OrderNode>,
    levels: HashMap<Price, LevelDepth>,
}

impl Book {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of orders resting on the book.
    pub fn size(&self) -> usize {
        self.orders.len()
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.last_key_value().map(|(price, _)| *price)
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first_key_value().map(|(price, _)| *price)
    }

    /// Admits a new order and runs matching to completion.
    ///
    /// Business rejections (duplicate id, unmatchable fill-and-kill,
    /// unfillable fill-or-kill, market order against an empty side) are
    /// logged and leave the book untouched.
    pub fn add_order(&mut self, mut order: Order) -> Trades {
        let id = order.id();

        if self.orders.contains_key(&id) {
            warn!(
                order_id = id,
                event = "rejected_duplicate",
                "add denied: order id already exists"
            );
            return Vec::new();
        }

        if order.order_type() == OrderType::FillAndKill
            && !self.can_match(order.side(), order.price())
        {
            warn!(
                order_id = id,
                event = "rejected_fak_unmatchable",
                "add denied: fill-and-kill order cannot be matched"
            );
            return Vec::new();
        }

        if order.order_type() == OrderType::FillOrKill
            && !self.can_be_fully_filled(order.side(), order.price(), order.remaining_quantity())
        {
            warn!(
                order_id = id,
                event = "rejected_fok_unfillable",
                "add denied: fill-or-kill order cannot be fully filled"
            );
            return Vec::new();
        }

        if order.order_type() == OrderType::Market {
            let worst = match order.side() {
                Side::Buy => self.asks.last_key_value().map(|(price, _)| *price),
                Side::Sell => self.bids.first_key_value().map(|(price, _)| *price),
            };
            match worst {
                Some(price) => order.set_market_price(price),
                None => {
                    debug!(order_id = id, "market order rejected: opposing side is empty");
                    return Vec::new();
                }
            }
        }

        let price = order.price();
        let quantity = order.remaining_quantity();
        self.push_back(order);
        self.update_depth(price, quantity, DepthChange::Add);

        info!(
            order_id = id,
            event = "accepted",
            price,
            quantity,
            "order added to the book"
        );

        self.match_orders()
    }

    /// Replaces a resting order: cancel, then re-admit under the same id and
    /// order type with the new side, price and quantity. The re-admission may
    /// trade immediately; those trades are returned.
    pub fn modify_order(&mut self, modify: OrderModify) -> Trades {
        let Some(node) = self.orders.get(&modify.id) else {
            info!(
                order_id = modify.id,
                event = "modify_of_unknown",
                "modify denied: order does not exist"
            );
            return Vec::new();
        };
        let order_type = node.order.order_type();

        info!(
            order_id = modify.id,
            event = "modify_accepted",
            "modify accepted: replacing resting order"
        );

        self.cancel_order(modify.id);
        self.add_order(Order::new(
            modify.id,
            order_type,
            modify.side,
            modify.price,
            modify.quantity,
        ))
    }

    /// Cancels a resting order. Cancelling an unknown id is a logged no-op,
    /// so the call is idempotent.
    pub fn cancel_order(&mut self, id: OrderId) {
        let Some(order) = self.remove_resting(id) else {
            info!(
                order_id = id,
                event = "cancel_of_unknown",
                "cancel denied: order does not exist"
            );
            return;
        };

        self.update_depth(order.price(), order.remaining_quantity(), DepthChange::Remove);

        info!(
            order_id = id,
            event = "cancelled",
            price = order.price(),
            remaining = order.remaining_quantity(),
            "order cancelled"
        );
    }

    /// Matches crossing orders until the best bid is below the best ask,
    /// then cancels any fill-and-kill order left at the top of either side.
    fn match_orders(&mut self) -> Trades {
        let mut trades = Vec::new();

        loop {
            let (Some(bid_price), Some(ask_price)) = (self.best_bid(), self.best_ask()) else {
                break;
            };
            if bid_price < ask_price {
                break;
            }

            // Match the two best levels against each other by time priority.
            loop {
                let Some(bid_id) = self.bids.get(&bid_price).and_then(|level| level.head) else {
                    break;
                };
                let Some(ask_id) = self.asks.get(&ask_price).and_then(|level| level.head) else {
                    break;
                };

                let quantity = self
                    .order(bid_id)
                    .remaining_quantity()
                    .min(self.order(ask_id).remaining_quantity());

                self.order_mut(bid_id).fill(quantity);
                self.order_mut(ask_id).fill(quantity);

                let bid = *self.order(bid_id);
                let ask = *self.order(ask_id);

                trades.push(Trade {
                    bid: TradeInfo {
                        order_id: bid_id,
                        price: bid.price(),
                        quantity,
                    },
                    ask: TradeInfo {
                        order_id: ask_id,
                        price: ask.price(),
                        quantity,
                    },
                });

                if bid.is_filled() {
                    self.remove_resting(bid_id);
                    self.update_depth(bid.price(), quantity, DepthChange::Remove);
                } else {
                    self.update_depth(bid.price(), quantity, DepthChange::Match);
                }

                if ask.is_filled() {
                    self.remove_resting(ask_id);
                    self.update_depth(ask.price(), quantity, DepthChange::Remove);
                } else {
                    self.update_depth(ask.price(), quantity, DepthChange::Match);
                }
            }
        }

        // A fill-and-kill order left at the head of either side crossed as
        // far as it could during this transaction and must not rest.
        self.sweep_fill_and_kill(Side::Buy);
        self.sweep_fill_and_kill(Side::Sell);

        trades
    }

    fn sweep_fill_and_kill(&mut self, side: Side) {
        let head = match side {
            Side::Buy => self.best_bid().and_then(|price| self.bids[&price].head),
            Side::Sell => self.best_ask().and_then(|price| self.asks[&price].head),
        };
        if let Some(id) = head {
            if self.order(id).order_type() == OrderType::FillAndKill {
                self.cancel_order(id);
            }
        }
    }

    /// True iff an order at `price` on `side` would cross the best opposing
    /// price.
    pub fn can_match(&self, side: Side, price: Price) -> bool {
        match side {
            Side::Buy => self.best_ask().is_some_and(|ask| price >= ask),
            Side::Sell => self.best_bid().is_some_and(|bid| price <= bid),
        }
    }

    /// Preflight for fill-or-kill: is there enough aggregate depth, on
    /// opposing levels that both cross the current top of book and lie
    /// within the caller's limit, to fill `quantity` completely?
    ///
    /// Only consults the depth cache; never walks level queues. Iteration
    /// order over the cache does not matter because the crossable depth is
    /// summed either way.
    pub fn can_be_fully_filled(&self, side: Side, price: Price, mut quantity: Quantity) -> bool {
        if !self.can_match(side, price) {
            return false;
        }
        let Some(threshold) = (match side {
            Side::Buy => self.best_ask(),
            Side::Sell => self.best_bid(),
        }) else {
            return false;
        };

        for (&level_price, depth) in &self.levels {
            let crosses = match side {
                Side::Buy => level_price >= threshold,
                Side::Sell => level_price <= threshold,
            };
            let within_limit = match side {
                Side::Buy => level_price <= price,
                Side::Sell => level_price >= price,
            };
            if !crosses || !within_limit {
                continue;
            }

            if quantity <= depth.quantity {
                return true;
            }
            quantity -= depth.quantity;
        }

        false
    }

    /// Per-level depth snapshot of both sides, best prices first.
    pub fn snapshot(&self) -> BookSnapshot {
        let level_info = |price: Price, level: &LevelQueue| LevelInfo {
            price,
            quantity: self.iter_level(level).map(Order::remaining_quantity).sum(),
        };

        BookSnapshot {
            bids: self
                .bids
                .iter()
                .rev()
                .map(|(price, level)| level_info(*price, level))
                .collect(),
            asks: self
                .asks
                .iter()
                .map(|(price, level)| level_info(*price, level))
                .collect(),
        }
    }

    fn order(&self, id: OrderId) -> &Order {
        &self.orders[&id].order
    }

    fn order_mut(&mut self, id: OrderId) -> &mut Order {
        &mut self
            .orders
            .get_mut(&id)
            .expect("order index out of sync with level queues")
            .order
    }

    /// Appends an order at the tail of its price level, creating the level
    /// if absent, and records it in the id index.
    fn push_back(&mut self, order: Order) {
        let id = order.id();
        let level = match order.side() {
            Side::Buy => self.bids.entry(order.price()).or_default(),
            Side::Sell => self.asks.entry(order.price()).or_default(),
        };

        let prev = level.tail;
        level.tail = Some(id);
        if level.head.is_none() {
            level.head = Some(id);
        }
        if let Some(tail_id) = prev {
            self.order_node_mut(tail_id).next = Some(id);
        }

        self.orders.insert(
            id,
            OrderNode {
                order,
                prev,
                next: None,
            },
        );
    }

    /// Unlinks an order from its level queue and erases it from the id
    /// index, pruning the level if it became empty. O(1). Does not touch the
    /// depth cache; callers subtract what was actually removed.
    fn remove_resting(&mut self, id: OrderId) -> Option<Order> {
        let node = self.orders.remove(&id)?;

        if let Some(prev_id) = node.prev {
            self.order_node_mut(prev_id).next = node.next;
        }
        if let Some(next_id) = node.next {
            self.order_node_mut(next_id).prev = node.prev;
        }

        let price = node.order.price();
        let side_map = match node.order.side() {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        if let Some(level) = side_map.get_mut(&price) {
            if level.head == Some(id) {
                level.head = node.next;
            }
            if level.tail == Some(id) {
                level.tail = node.prev;
            }
            if level.head.is_none() {
                side_map.remove(&price);
            }
        }

        Some(node.order)
    }

    fn order_node_mut(&mut self, id: OrderId) -> &mut OrderNode {
        self.orders
            .get_mut(&id)
            .expect("order index out of sync with level queues")
    }

    fn update_depth(&mut self, price: Price, quantity: Quantity, change: DepthChange) {
        let depth = self.levels.entry(price).or_default();
        match change {
            DepthChange::Add => {
                depth.quantity += quantity;
                depth.count += 1;
            }
            DepthChange::Remove => {
                depth.quantity -= quantity;
                depth.count -= 1;
            }
            DepthChange::Match => {
                depth.quantity -= quantity;
            }
        }
        if depth.count == 0 {
            self.levels.remove(&price);
        }
    }

    fn iter_level<'a>(&'a self, level: &LevelQueue) -> LevelIter<'a> {
        LevelIter {
            book: self,
            next: level.head,
        }
    }
}

/// Walks one price level in time priority.
struct LevelIter<'a> {
    book: &'a Book,
    next: Option<OrderId>,
}

impl<'a> Iterator for LevelIter<'a> {
    type Item = &'a Order;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let node = &self.book.orders[&id];
        self.next = node.next;
        Some(&node.order)
    }
}
