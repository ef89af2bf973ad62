//! Marketplace Order Engine
//!
//! The order engine is the core of the marketplace order service. It owns the order lifecycle
//! (pending → confirmed → in_progress → delivered → completed, with branches for revisions,
//! cancellations, refunds and disputes) and the two automated processes that drive it:
//! automatic digital delivery and deadline-based auto-approval.
//!
//! The library is divided into three main sections:
//! 1. The backend contract ([`mod@traits`]). Storage backends implement [`traits::OrderStore`] to
//!    provide durable, consistently-readable order records with conditional (compare-and-swap)
//!    status updates. The SQLite backend ([`SqliteOrderStore`]) is the reference implementation.
//!    You should never need to access the database directly; use the APIs instead. The exception
//!    is the data types stored in the database, which are defined in [`mod@db_types`] and public.
//! 2. The engine APIs ([`OrderFlowApi`], [`AutoDeliveryApi`], [`LifecycleApi`]). These implement
//!    order creation and the status state machine, the exactly-once digital delivery trigger, and
//!    the auto-approval sweeper respectively. Each API takes its backend as an injected handle at
//!    construction, so tests can substitute a double without touching global state.
//! 3. Events ([`mod@events`]). A small actor-style hook system that emits an event whenever an
//!    order is created, delivered or completed, so external collaborators (mailers, webhooks) can
//!    react without being wired into the engine.
pub mod db_types;
pub mod events;
pub mod helpers;
mod oms_api;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteOrderStore;

pub use oms_api::{
    auto_delivery_api::{AutoDeliveryApi, AUTO_DELIVERY_MARKER, COURSE_ACCESS_PREFIX},
    errors::OrderFlowError,
    lifecycle_api::{LifecycleApi, AUTO_APPROVAL_PREFIX, ORDER_COMPLETED_NOTIFICATION},
    order_flow_api::OrderFlowApi,
    order_objects,
};
