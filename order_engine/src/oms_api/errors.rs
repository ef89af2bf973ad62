use thiserror::Error;

use crate::{db_types::OrderStatusType, traits::OrderStoreError};

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Invalid request. {0}")]
    InvalidRequest(String),
    #[error("Order validation failed. {0}")]
    ValidationError(String),
    #[error("The requested order (id {0}) does not exist")]
    OrderNotFound(i64),
    #[error("The requested product {0} does not exist")]
    ProductNotFound(String),
    #[error("Product {product_id} does not belong to order {order_id}")]
    ProductMismatch { order_id: i64, product_id: String },
    #[error("User {0} is not the seller on this order")]
    SellerMismatch(String),
    #[error("Orders cannot move from {from} to {to}")]
    InvalidTransition { from: OrderStatusType, to: OrderStatusType },
    #[error("The order status changed concurrently and the update was not applied")]
    StatusRaced,
    #[error("Could not generate a unique order number after several attempts")]
    OrderNumberExhausted,
    #[error("{0}")]
    StoreError(#[from] OrderStoreError),
}
