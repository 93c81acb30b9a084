//! Buyer-scoped order queries and statistics.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use clients::InventoryClient;
use common::PageRequest;
use domain::{Money, OrderStatus};
use order_store::{OrderFilter, OrderStore};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;
use crate::routes::orders::{OrderResponse, PageResponse, order_response, parse_user_id};

#[derive(Deserialize)]
pub struct SearchOrdersRequest {
    pub keyword: Option<String>,
    pub statuses: Option<Vec<OrderStatus>>,
    pub min_total_cents: Option<i64>,
    pub max_total_cents: Option<i64>,
    pub placed_after: Option<DateTime<Utc>>,
    pub placed_before: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Serialize)]
pub struct BuyerStatsResponse {
    pub total_orders: u64,
    pub total_spent_cents: i64,
    pub last_order_date: Option<String>,
    pub most_purchased: Option<MostPurchasedResponse>,
}

#[derive(Serialize)]
pub struct MostPurchasedResponse {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u64,
}

/// GET /users/{user_id}/orders — paged order history, newest first.
#[tracing::instrument(skip(state))]
pub async fn list_orders<S, I>(
    State(state): State<Arc<AppState<S, I>>>,
    Path(user_id): Path<String>,
    Query(page): Query<PageRequest>,
) -> Result<Json<PageResponse<OrderResponse>>, ApiError>
where
    S: OrderStore + Clone + 'static,
    I: InventoryClient + Clone + 'static,
{
    let user_id = parse_user_id(&user_id)?;
    let result = state.orders.list_orders(user_id, page).await?;

    Ok(Json(PageResponse {
        items: result.items.iter().map(order_response).collect(),
        total: result.total,
        page: result.page,
        per_page: result.per_page,
    }))
}

/// POST /users/{user_id}/orders/search — filtered order search.
#[tracing::instrument(skip(state, req))]
pub async fn search_orders<S, I>(
    State(state): State<Arc<AppState<S, I>>>,
    Path(user_id): Path<String>,
    Json(req): Json<SearchOrdersRequest>,
) -> Result<Json<PageResponse<OrderResponse>>, ApiError>
where
    S: OrderStore + Clone + 'static,
    I: InventoryClient + Clone + 'static,
{
    let user_id = parse_user_id(&user_id)?;

    let mut filter = OrderFilter::new();
    if let Some(keyword) = req.keyword {
        filter = filter.keyword(keyword);
    }
    if let Some(statuses) = req.statuses {
        filter = filter.statuses(statuses);
    }
    if let Some(min) = req.min_total_cents {
        filter = filter.min_total(Money::from_cents(min));
    }
    if let Some(max) = req.max_total_cents {
        filter = filter.max_total(Money::from_cents(max));
    }
    if let Some(after) = req.placed_after {
        filter = filter.placed_after(after);
    }
    if let Some(before) = req.placed_before {
        filter = filter.placed_before(before);
    }

    let page = PageRequest {
        page: req.page,
        per_page: req.per_page,
    };
    let result = state.orders.search_orders(user_id, filter, page).await?;

    Ok(Json(PageResponse {
        items: result.items.iter().map(order_response).collect(),
        total: result.total,
        page: result.page,
        per_page: result.per_page,
    }))
}

/// GET /users/{user_id}/stats — buyer statistics over delivered orders.
#[tracing::instrument(skip(state))]
pub async fn stats<S, I>(
    State(state): State<Arc<AppState<S, I>>>,
    Path(user_id): Path<String>,
) -> Result<Json<BuyerStatsResponse>, ApiError>
where
    S: OrderStore + Clone + 'static,
    I: InventoryClient + Clone + 'static,
{
    let user_id = parse_user_id(&user_id)?;
    let stats = state.buyer_stats.stats_for_user(user_id).await?;

    Ok(Json(BuyerStatsResponse {
        total_orders: stats.total_orders,
        total_spent_cents: stats.total_spent.cents(),
        last_order_date: stats.last_order_date.map(|d| d.to_rfc3339()),
        most_purchased: stats.most_purchased.map(|m| MostPurchasedResponse {
            product_id: m.product_id.to_string(),
            product_name: m.product_name,
            quantity: m.quantity,
        }),
    }))
}
