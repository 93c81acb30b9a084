//! Seller-scoped order views and statistics.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use clients::InventoryClient;
use common::{PageRequest, SellerId};
use domain::{Money, OrderStatus};
use order_store::OrderStore;
use projections::{SellerOrder, SellerOrderSearch};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;
use crate::routes::orders::{OrderItemResponse, PageResponse, item_response};

#[derive(Deserialize)]
pub struct SearchSellerOrdersRequest {
    pub keyword: Option<String>,
    pub statuses: Option<Vec<OrderStatus>>,
    pub placed_after: Option<DateTime<Utc>>,
    pub placed_before: Option<DateTime<Utc>>,
    pub min_subtotal_cents: Option<i64>,
    pub max_subtotal_cents: Option<i64>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Serialize)]
pub struct SellerOrderResponse {
    pub order_id: String,
    pub status: String,
    pub order_date: String,
    pub created_at: String,
    pub subtotal_cents: i64,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Serialize)]
pub struct SellerStatsResponse {
    pub total_revenue_cents: i64,
    pub items_sold: u64,
    pub delivered_orders: u64,
    pub cancelled_orders: u64,
    pub unique_customers: u64,
    pub last_sale_date: Option<String>,
    pub delivery_rating: f64,
    pub cancellation_rate: f64,
}

fn seller_order_response(order: &SellerOrder) -> SellerOrderResponse {
    SellerOrderResponse {
        order_id: order.order_id.to_string(),
        status: order.status.to_string(),
        order_date: order.order_date.to_rfc3339(),
        created_at: order.created_at.to_rfc3339(),
        subtotal_cents: order.subtotal.cents(),
        items: order.items.iter().map(item_response).collect(),
    }
}

fn parse_seller_id(id: &str) -> Result<SellerId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid seller id: {e}")))?;
    Ok(SellerId::from(uuid))
}

/// GET /sellers/{seller_id}/orders — the seller's order view, paged.
#[tracing::instrument(skip(state))]
pub async fn list_orders<S, I>(
    State(state): State<Arc<AppState<S, I>>>,
    Path(seller_id): Path<String>,
    Query(page): Query<PageRequest>,
) -> Result<Json<PageResponse<SellerOrderResponse>>, ApiError>
where
    S: OrderStore + Clone + 'static,
    I: InventoryClient + Clone + 'static,
{
    let seller_id = parse_seller_id(&seller_id)?;
    let result = state.seller_orders.orders_for_seller(seller_id, page).await?;

    Ok(Json(PageResponse {
        items: result.items.iter().map(seller_order_response).collect(),
        total: result.total,
        page: result.page,
        per_page: result.per_page,
    }))
}

/// POST /sellers/{seller_id}/orders/search — filtered seller view.
#[tracing::instrument(skip(state, req))]
pub async fn search_orders<S, I>(
    State(state): State<Arc<AppState<S, I>>>,
    Path(seller_id): Path<String>,
    Json(req): Json<SearchSellerOrdersRequest>,
) -> Result<Json<PageResponse<SellerOrderResponse>>, ApiError>
where
    S: OrderStore + Clone + 'static,
    I: InventoryClient + Clone + 'static,
{
    let seller_id = parse_seller_id(&seller_id)?;

    let search = SellerOrderSearch {
        keyword: req.keyword,
        statuses: req.statuses,
        placed_after: req.placed_after,
        placed_before: req.placed_before,
        min_subtotal: req.min_subtotal_cents.map(Money::from_cents),
        max_subtotal: req.max_subtotal_cents.map(Money::from_cents),
    };
    let page = PageRequest {
        page: req.page,
        per_page: req.per_page,
    };
    let result = state
        .seller_orders
        .search_for_seller(seller_id, search, page)
        .await?;

    Ok(Json(PageResponse {
        items: result.items.iter().map(seller_order_response).collect(),
        total: result.total,
        page: result.page,
        per_page: result.per_page,
    }))
}

/// GET /sellers/{seller_id}/stats — seller statistics.
#[tracing::instrument(skip(state))]
pub async fn stats<S, I>(
    State(state): State<Arc<AppState<S, I>>>,
    Path(seller_id): Path<String>,
) -> Result<Json<SellerStatsResponse>, ApiError>
where
    S: OrderStore + Clone + 'static,
    I: InventoryClient + Clone + 'static,
{
    let seller_id = parse_seller_id(&seller_id)?;
    let stats = state.seller_stats.stats_for_seller(seller_id).await?;

    Ok(Json(SellerStatsResponse {
        total_revenue_cents: stats.total_revenue.cents(),
        items_sold: stats.items_sold,
        delivered_orders: stats.delivered_orders,
        cancelled_orders: stats.cancelled_orders,
        unique_customers: stats.unique_customers,
        last_sale_date: stats.last_sale_date.map(|d| d.to_rfc3339()),
        delivery_rating: stats.delivery_rating,
        cancellation_rate: stats.cancellation_rate,
    }))
}
