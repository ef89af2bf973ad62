//! The engine's public APIs.
//!
//! Three cooperating components, each constructed over an injected [`OrderStore`] handle:
//!
//! * [`order_flow_api::OrderFlowApi`] — order creation and the status state machine, driven by
//!   buyer and seller actions.
//! * [`auto_delivery_api::AutoDeliveryApi`] — the delivery trigger: fulfils digital orders
//!   exactly once per order, however often it is invoked.
//! * [`lifecycle_api::LifecycleApi`] — the sweeper: promotes delivered orders past their approval
//!   deadline to completed, notifying both parties exactly once.
//!
//! [`OrderStore`]: crate::traits::OrderStore
pub mod auto_delivery_api;
pub mod errors;
pub mod lifecycle_api;
pub mod order_flow_api;
pub mod order_objects;
