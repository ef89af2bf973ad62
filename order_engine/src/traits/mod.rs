//! # Backend contract for the order engine.
//!
//! This module defines the interface that storage backends must expose in order to host the
//! marketplace order service.
//!
//! ## Orders
//! An order is the single purchase transaction linking a buyer, a seller and a product. The
//! [`OrderStore`] trait owns its durability and consistent reads, and crucially exposes a
//! *conditional* status update: every writer matches on the current status rather than blindly
//! overwriting, which is what makes concurrent sweeps and human actions race-safe.
//!
//! ## Side tables
//! Messages, deliverables and notifications are insert-only. Each insert has a companion
//! existence check scoped to an (order, discriminator) pair; automated writers check before
//! inserting so that a retried invocation converges instead of duplicating its effects.
mod data_objects;
mod order_store;

pub use data_objects::{DeliveryArtifact, DeliveryOutcome, StatusStamps, SweepResult, UserRole, UserRoleConversionError};
pub use order_store::{OrderStore, OrderStoreError};
