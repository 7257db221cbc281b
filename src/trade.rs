use serde::Serialize;

use crate::orders::{OrderId, Price, Quantity};

/// One leg of a trade, as seen from the order on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TradeInfo {
    pub order_id: OrderId,
    pub price: Price,
    pub quantity: Quantity,
}

/// A trade represents a matched transaction between two orders.
///
/// Each leg reports its own order's price, so the legs can disagree when a
/// re-priced market order is involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Trade {
    pub bid: TradeInfo,
    pub ask: TradeInfo,
}

pub type Trades = Vec<Trade>;
