//! Order lifecycle engine.
//!
//! This crate orchestrates everything that moves an order through its
//! lifecycle:
//! - [`OrderService`] — cart CRUD, queries, status updates and soft delete
//! - [`CheckoutCoordinator`] — the checkout protocol (inventory decrement
//!   without two-phase commit) and the compensating cancel
//! - [`RedoService`] — rebuilding a cart from a past order against live
//!   stock availability
//! - [`DeliveryScheduler`] — the jittered one-shot task advancing shipped
//!   orders to delivered
//!
//! There is no distributed transaction across the order store and the
//! product service; consistency comes from operation ordering, the
//! scheduler's recheck-on-fire guard, and compensating stock adjustments.

pub mod checkout;
pub mod error;
pub mod redo;
pub mod scheduler;
pub mod service;

pub use checkout::{CheckoutCoordinator, CheckoutOutcome, CheckoutRequest};
pub use error::{FulfillmentError, Result};
pub use redo::{RedoOutcome, RedoService};
pub use scheduler::{DeliveryScheduler, DeliveryWindow};
pub use service::OrderService;
