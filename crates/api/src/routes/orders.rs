//! Order lifecycle endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use clients::InventoryClient;
use common::{OrderId, UserId};
use domain::{Money, Order, OrderItem, OrderStatus, ProductId};
use order_store::OrderStore;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: String,
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Deserialize)]
pub struct OrderItemRequest {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub seller_id: Option<String>,
}

#[derive(Deserialize)]
pub struct CheckoutRequestBody {
    pub shipping_address: String,
    pub payment_method: String,
}

#[derive(Deserialize)]
pub struct RedoRequestBody {
    pub user_id: String,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub user_id: String,
    pub status: String,
    pub shipping_address: Option<String>,
    pub payment_method: Option<String>,
    pub order_date: String,
    pub created_at: String,
    pub updated_at: String,
    pub total_cents: i64,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub seller_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Serialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub order: OrderResponse,
    pub next_cart_id: String,
}

#[derive(Serialize)]
pub struct RedoResponse {
    pub cart: Option<OrderResponse>,
    pub message: String,
    pub partially_filled: Vec<String>,
    pub out_of_stock: Vec<String>,
}

pub(crate) fn order_response(order: &Order) -> OrderResponse {
    OrderResponse {
        id: order.id().to_string(),
        user_id: order.user_id().to_string(),
        status: order.status().to_string(),
        shipping_address: order.shipping_address().map(String::from),
        payment_method: order.payment_method().map(String::from),
        order_date: order.order_date().to_rfc3339(),
        created_at: order.created_at().to_rfc3339(),
        updated_at: order.updated_at().to_rfc3339(),
        total_cents: order.total().cents(),
        items: order.items().iter().map(item_response).collect(),
    }
}

pub(crate) fn item_response(item: &OrderItem) -> OrderItemResponse {
    OrderItemResponse {
        product_id: item.product_id.to_string(),
        product_name: item.product_name.clone(),
        quantity: item.quantity,
        unit_price_cents: item.unit_price.cents(),
        seller_id: item.seller_id.map(|id| id.to_string()),
        image_url: None,
    }
}

pub(crate) fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid order id: {e}")))?;
    Ok(OrderId::from(uuid))
}

pub(crate) fn parse_user_id(id: &str) -> Result<UserId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid user id: {e}")))?;
    Ok(UserId::from(uuid))
}

fn request_item(item: &OrderItemRequest) -> Result<OrderItem, ApiError> {
    let seller_id = match &item.seller_id {
        Some(id) => Some(
            uuid::Uuid::parse_str(id)
                .map(common::SellerId::from)
                .map_err(|e| ApiError::BadRequest(format!("Invalid seller id: {e}")))?,
        ),
        None => None,
    };

    Ok(OrderItem {
        product_id: ProductId::new(item.product_id.as_str()),
        product_name: item.product_name.clone(),
        quantity: item.quantity,
        unit_price: Money::from_cents(item.unit_price_cents),
        seller_id,
    })
}

// -- Handlers --

/// POST /orders — create a new pending order, optionally pre-filled.
#[tracing::instrument(skip(state, req))]
pub async fn create<S, I>(
    State(state): State<Arc<AppState<S, I>>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(axum::http::StatusCode, Json<OrderResponse>), ApiError>
where
    S: OrderStore + Clone + 'static,
    I: InventoryClient + Clone + 'static,
{
    let user_id = parse_user_id(&req.user_id)?;
    let items = req
        .items
        .iter()
        .map(request_item)
        .collect::<Result<Vec<_>, _>>()?;

    let order = state.orders.create_order(user_id, items).await?;
    Ok((axum::http::StatusCode::CREATED, Json(order_response(&order))))
}

/// GET /orders/{id} — load an order with media enrichment.
#[tracing::instrument(skip(state))]
pub async fn get<S, I>(
    State(state): State<Arc<AppState<S, I>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    S: OrderStore + Clone + 'static,
    I: InventoryClient + Clone + 'static,
{
    let order_id = parse_order_id(&id)?;
    let order = state.orders.get_order(order_id).await?;

    let mut response = order_response(&order);
    for (item, rendered) in order.items().iter().zip(response.items.iter_mut()) {
        // Image absence never blocks order display.
        rendered.image_url = state
            .media
            .first_image_url(&item.product_id)
            .await
            .unwrap_or_default();
    }

    Ok(Json(response))
}

/// DELETE /orders/{id} — soft-delete an order.
#[tracing::instrument(skip(state))]
pub async fn remove<S, I>(
    State(state): State<Arc<AppState<S, I>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    S: OrderStore + Clone + 'static,
    I: InventoryClient + Clone + 'static,
{
    let order_id = parse_order_id(&id)?;
    let order = state.orders.remove_order(order_id).await?;
    Ok(Json(order_response(&order)))
}

/// POST /orders/{id}/checkout — run the checkout protocol.
#[tracing::instrument(skip(state, req))]
pub async fn checkout<S, I>(
    State(state): State<Arc<AppState<S, I>>>,
    Path(id): Path<String>,
    Json(req): Json<CheckoutRequestBody>,
) -> Result<Json<CheckoutResponse>, ApiError>
where
    S: OrderStore + Clone + 'static,
    I: InventoryClient + Clone + 'static,
{
    let order_id = parse_order_id(&id)?;
    let outcome = state
        .checkout
        .checkout(
            order_id,
            fulfillment::CheckoutRequest {
                shipping_address: req.shipping_address,
                payment_method: req.payment_method,
            },
        )
        .await?;

    Ok(Json(CheckoutResponse {
        order: order_response(&outcome.order),
        next_cart_id: outcome.next_cart.id().to_string(),
    }))
}

/// POST /orders/{id}/cancel — cancel from any non-terminal status.
#[tracing::instrument(skip(state))]
pub async fn cancel<S, I>(
    State(state): State<Arc<AppState<S, I>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    S: OrderStore + Clone + 'static,
    I: InventoryClient + Clone + 'static,
{
    let order_id = parse_order_id(&id)?;
    let order = state.checkout.cancel(order_id).await?;
    Ok(Json(order_response(&order)))
}

/// POST /orders/{id}/redo — rebuild a cart from this order.
#[tracing::instrument(skip(state, req))]
pub async fn redo<S, I>(
    State(state): State<Arc<AppState<S, I>>>,
    Path(id): Path<String>,
    Json(req): Json<RedoRequestBody>,
) -> Result<Json<RedoResponse>, ApiError>
where
    S: OrderStore + Clone + 'static,
    I: InventoryClient + Clone + 'static,
{
    let order_id = parse_order_id(&id)?;
    let user_id = parse_user_id(&req.user_id)?;

    let outcome = state.redo.redo(user_id, order_id).await?;
    Ok(Json(RedoResponse {
        cart: outcome.cart.as_ref().map(order_response),
        message: outcome.message,
        partially_filled: outcome.partially_filled,
        out_of_stock: outcome.out_of_stock,
    }))
}

/// PUT /orders/{id}/status — forward status update.
#[tracing::instrument(skip(state, req))]
pub async fn update_status<S, I>(
    State(state): State<Arc<AppState<S, I>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError>
where
    S: OrderStore + Clone + 'static,
    I: InventoryClient + Clone + 'static,
{
    let order_id = parse_order_id(&id)?;
    let order = state.orders.update_status(order_id, req.status).await?;
    Ok(Json(order_response(&order)))
}

/// POST /orders/{id}/items — add an item to a pending order.
#[tracing::instrument(skip(state, req))]
pub async fn add_item<S, I>(
    State(state): State<Arc<AppState<S, I>>>,
    Path(id): Path<String>,
    Json(req): Json<OrderItemRequest>,
) -> Result<Json<OrderResponse>, ApiError>
where
    S: OrderStore + Clone + 'static,
    I: InventoryClient + Clone + 'static,
{
    let order_id = parse_order_id(&id)?;
    let item = request_item(&req)?;
    let order = state.orders.add_item(order_id, item).await?;
    Ok(Json(order_response(&order)))
}

/// PUT /orders/{id}/items/{product_id} — update a line quantity.
#[tracing::instrument(skip(state, req))]
pub async fn update_item<S, I>(
    State(state): State<Arc<AppState<S, I>>>,
    Path((id, product_id)): Path<(String, String)>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<OrderResponse>, ApiError>
where
    S: OrderStore + Clone + 'static,
    I: InventoryClient + Clone + 'static,
{
    let order_id = parse_order_id(&id)?;
    let order = state
        .orders
        .update_item_quantity(order_id, &ProductId::new(product_id), req.quantity)
        .await?;
    Ok(Json(order_response(&order)))
}

/// DELETE /orders/{id}/items/{product_id} — remove one line.
#[tracing::instrument(skip(state))]
pub async fn remove_item<S, I>(
    State(state): State<Arc<AppState<S, I>>>,
    Path((id, product_id)): Path<(String, String)>,
) -> Result<Json<OrderResponse>, ApiError>
where
    S: OrderStore + Clone + 'static,
    I: InventoryClient + Clone + 'static,
{
    let order_id = parse_order_id(&id)?;
    let order = state
        .orders
        .remove_item(order_id, &ProductId::new(product_id))
        .await?;
    Ok(Json(order_response(&order)))
}

/// DELETE /orders/{id}/items — empty a pending order.
#[tracing::instrument(skip(state))]
pub async fn clear_items<S, I>(
    State(state): State<Arc<AppState<S, I>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    S: OrderStore + Clone + 'static,
    I: InventoryClient + Clone + 'static,
{
    let order_id = parse_order_id(&id)?;
    let order = state.orders.clear_items(order_id).await?;
    Ok(Json(order_response(&order)))
}
