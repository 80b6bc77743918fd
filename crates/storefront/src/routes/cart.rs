//! Cart route handlers.
//!
//! The cart lives in the session. Every write re-reads the product so a shop
//! cannot add expired or out-of-stock goods, or more units than are in stock.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use xstore_core::{Cart, CartItem, CartProduct, CityId, MINIMUM_ORDER_VALUE, Money, Product, ProductId};

use crate::db::CatalogRepository;
use crate::error::{AppError, Result};
use crate::models::session::{load_cart, load_city, save_cart};
use crate::state::AppState;

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub product_id: ProductId,
    pub name: String,
    pub category: String,
    pub image_url: Option<String>,
    pub mrp: Money,
    pub selling_price: Money,
    pub quantity: u32,
    pub line_total: Money,
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product.id,
            name: item.product.name.clone(),
            category: item.product.category.clone(),
            image_url: item.product.image_url.clone(),
            mrp: item.product.mrp,
            selling_price: item.product.selling_price,
            quantity: item.quantity,
            line_total: item.line_total(),
        }
    }
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub item_count: u32,
    pub total: Money,
    /// Total formatted for display (`₹3,450.00`).
    pub total_display: String,
    pub minimum_order_value: Money,
    /// How much more must be added before checkout is allowed.
    pub shortfall: Money,
    pub meets_minimum: bool,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let total = cart.total();
        Self {
            items: cart.items().iter().map(CartLineView::from).collect(),
            item_count: cart.item_count(),
            total,
            total_display: total.to_string(),
            minimum_order_value: MINIMUM_ORDER_VALUE,
            shortfall: cart.shortfall(),
            meets_minimum: cart.meets_minimum(),
        }
    }
}

/// Body for `POST /api/cart/items`.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    #[serde(default = "one")]
    pub quantity: u32,
}

const fn one() -> u32 {
    1
}

/// Body for `PUT /api/cart/items/{product_id}`.
#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: u32,
}

/// Check that `quantity` units of `product` may sit in a cart.
fn ensure_orderable(
    product: &Product,
    quantity: u32,
    city: Option<CityId>,
    today: NaiveDate,
) -> Result<()> {
    if product.is_expired(today) {
        return Err(AppError::Unprocessable(format!(
            "{} has expired",
            product.name
        )));
    }
    if !product.in_stock() {
        return Err(AppError::Unprocessable(format!(
            "{} is out of stock",
            product.name
        )));
    }
    if let Some(city) = city
        && !product.is_available_in(city)
    {
        return Err(AppError::Unprocessable(format!(
            "{} is not delivered to your city",
            product.name
        )));
    }
    if i64::from(quantity) > i64::from(product.quantity) {
        return Err(AppError::Unprocessable(format!(
            "only {} of {} in stock",
            product.quantity, product.name
        )));
    }
    Ok(())
}

async fn fetch_product(state: &AppState, id: ProductId) -> Result<Product> {
    CatalogRepository::new(state.pool())
        .get_product(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
}

/// Show the cart.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<CartView>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Add a product, or more units of one already in the cart.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CartView>> {
    let product = fetch_product(&state, request.product_id).await?;
    let city = load_city(&session).await?.map(|c| c.id);
    let mut cart = load_cart(&session).await?;

    let wanted = cart
        .quantity_of(product.id)
        .saturating_add(request.quantity);
    ensure_orderable(&product, wanted, city, Utc::now().date_naive())?;

    cart.add(CartProduct::from(&product), request.quantity)?;
    save_cart(&session, &cart).await?;

    tracing::debug!(product_id = %product.id, quantity = wanted, "Cart line added");
    Ok(Json(CartView::from(&cart)))
}

/// Set the quantity of a line; 0 removes it.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Path(product_id): Path<ProductId>,
    Json(request): Json<SetQuantityRequest>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;

    if request.quantity > 0 && cart.quantity_of(product_id) > 0 {
        let product = fetch_product(&state, product_id).await?;
        let city = load_city(&session).await?.map(|c| c.id);
        ensure_orderable(&product, request.quantity, city, Utc::now().date_naive())?;
    }

    cart.set_quantity(product_id, request.quantity)?;
    save_cart(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

/// Remove a line.
#[instrument(skip(session))]
pub async fn remove(
    session: Session,
    Path(product_id): Path<ProductId>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    cart.remove(product_id)?;
    save_cart(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    cart.clear();
    save_cart(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}
