//! View implementations.

mod buyer_stats;
mod seller_orders;
mod seller_stats;

pub use buyer_stats::{BuyerStats, BuyerStatsView, MostPurchased};
pub use seller_orders::{SellerOrder, SellerOrderSearch, SellerOrdersView};
pub use seller_stats::{SellerStats, SellerStatsView};
