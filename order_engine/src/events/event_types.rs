use crate::db_types::Order;

#[derive(Debug, Clone)]
pub struct OrderCreatedEvent {
    pub order: Order,
}

impl OrderCreatedEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

#[derive(Debug, Clone)]
pub struct OrderDeliveredEvent {
    pub order: Order,
}

impl OrderDeliveredEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

#[derive(Debug, Clone)]
pub struct OrderCompletedEvent {
    pub order: Order,
    /// True when the sweeper completed the order, false for an explicit buyer approval.
    pub auto_approved: bool,
}

impl OrderCompletedEvent {
    pub fn new(order: Order, auto_approved: bool) -> Self {
        Self { order, auto_approved }
    }
}
