use serde::{Deserialize, Serialize};

pub type OrderId = u64;
pub type Price = u64;
pub type Quantity = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    GoodTillCancel,
    Market,
    FillAndKill,
    FillOrKill,
}

/// A single order resting on (or entering) the book.
///
/// `id`, `order_type` and `side` are fixed at construction. `price` is fixed
/// too, except for a [`OrderType::Market`] order, which is re-priced exactly
/// once at admission via [`Order::set_market_price`]. The remaining quantity
/// only ever decreases, through [`Order::fill`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    id: OrderId,
    order_type: OrderType,
    side: Side,
    price: Price,
    initial_quantity: Quantity,
    remaining_quantity: Quantity,
}

impl Order {
    pub fn new(
        id: OrderId,
        order_type: OrderType,
        side: Side,
        price: Price,
        quantity: Quantity,
    ) -> Self {
        Self {
            id,
            order_type,
            side,
            price,
            initial_quantity: quantity,
            remaining_quantity: quantity,
        }
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn initial_quantity(&self) -> Quantity {
        self.initial_quantity
    }

    pub fn remaining_quantity(&self) -> Quantity {
        self.remaining_quantity
    }

    pub fn filled_quantity(&self) -> Quantity {
        self.initial_quantity - self.remaining_quantity
    }

    pub fn is_filled(&self) -> bool {
        self.remaining_quantity == 0
    }

    /// Fills `quantity` units. Overfilling is a bug in the matching loop.
    pub fn fill(&mut self, quantity: Quantity) {
        assert!(
            quantity <= self.remaining_quantity,
            "order {} overfilled: {} > {}",
            self.id,
            quantity,
            self.remaining_quantity
        );
        self.remaining_quantity -= quantity;
    }

    /// Re-prices a market order to the worst opposing price so that matching
    /// walks the entire opposing side. Only valid before insertion.
    pub fn set_market_price(&mut self, price: Price) {
        assert!(
            self.order_type == OrderType::Market,
            "only market orders can be re-priced"
        );
        self.price = price;
    }
}

/// Replacement parameters for a resting order.
///
/// A modify cannot change the order type; the type is carried over from the
/// order being replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderModify {
    pub id: OrderId,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
}
