//! Domain layer for the order lifecycle system.
//!
//! This crate provides the core order model:
//! - [`OrderStatus`] state machine governing legal transitions
//! - [`Order`] aggregate, which doubles as the user's cart while pending
//! - Value objects: [`OrderItem`], [`Money`], [`ProductId`]

pub mod order;

pub use order::{Money, Order, OrderError, OrderItem, OrderStatus, ProductId};
