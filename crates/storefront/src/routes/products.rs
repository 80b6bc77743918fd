//! Catalogue route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use xstore_core::catalog::categories;
use xstore_core::{CityId, Money, Product, ProductFilter, ProductId};

use crate::db::CatalogRepository;
use crate::error::{AppError, Result};
use crate::models::session::load_city;
use crate::state::AppState;

/// Product display data.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub mrp: Money,
    pub selling_price: Money,
    /// Selling price formatted for display (`₹1,250.00`).
    pub price_display: String,
    pub discount_percent: u8,
    pub image_url: Option<String>,
    pub expiry_date: NaiveDate,
    pub days_until_expiry: i64,
    pub stock: i32,
    pub is_hot_deal: bool,
    pub cities: Vec<CityId>,
}

impl ProductView {
    fn new(product: &Product, today: NaiveDate) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            category: product.category.clone(),
            mrp: product.mrp,
            selling_price: product.selling_price,
            price_display: product.selling_price.to_string(),
            discount_percent: product.discount_percent(),
            image_url: product.image_url.clone(),
            expiry_date: product.expiry_date,
            days_until_expiry: product.days_until_expiry(today),
            stock: product.quantity,
            is_hot_deal: product.is_hot_deal,
            cities: product.cities.clone(),
        }
    }
}

/// Query parameters for the product listing.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub q: Option<String>,
    #[serde(default)]
    pub hot_deals: bool,
    /// Overrides the session city (useful for links shared between shops).
    pub city: Option<CityId>,
}

impl ProductQuery {
    fn filter(&self) -> ProductFilter {
        ProductFilter {
            category: self.category.clone(),
            search: self.q.clone(),
            hot_deals_only: self.hot_deals,
        }
    }
}

/// Product listing response.
#[derive(Debug, Serialize)]
pub struct ProductList {
    pub city_id: CityId,
    pub count: usize,
    pub products: Vec<ProductView>,
}

/// Resolve the city to list products for. The city must still be active,
/// whether it came from the query string or the session.
async fn resolve_city(
    catalog: &CatalogRepository<'_>,
    session: &Session,
    explicit: Option<CityId>,
) -> Result<CityId> {
    let id = match explicit {
        Some(id) => id,
        None => load_city(session)
            .await?
            .map(|c| c.id)
            .ok_or_else(|| AppError::Unprocessable("select a delivery city first".to_string()))?,
    };

    catalog
        .get_active_city(id)
        .await?
        .map(|c| c.id)
        .ok_or_else(|| {
            AppError::Unprocessable("that city is not available; choose another".to_string())
        })
}

/// List products orderable in the selected city.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ProductList>> {
    let catalog = CatalogRepository::new(state.pool());
    let city = resolve_city(&catalog, &session, query.city).await?;
    let today = Utc::now().date_naive();

    let products = catalog
        .list_visible_products(city, today)
        .await?;

    let views: Vec<ProductView> = query
        .filter()
        .apply(&products)
        .into_iter()
        .map(|p| ProductView::new(p, today))
        .collect();

    Ok(Json(ProductList {
        city_id: city,
        count: views.len(),
        products: views,
    }))
}

/// Product detail. Expired products are treated as gone.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductView>> {
    let today = Utc::now().date_naive();
    let product = CatalogRepository::new(state.pool())
        .get_product(id)
        .await?
        .filter(|p| !p.is_expired(today))
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

    Ok(Json(ProductView::new(&product, today)))
}

/// Categories of the products visible in the selected city.
#[instrument(skip(state, session))]
pub async fn categories_index(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<String>>> {
    let catalog = CatalogRepository::new(state.pool());
    let city = resolve_city(&catalog, &session, query.city).await?;
    let products = catalog
        .list_visible_products(city, Utc::now().date_naive())
        .await?;

    Ok(Json(categories(&products)))
}

#[cfg(test)]
mod tests {
    use chrono::Days;

    use super::*;

    #[test]
    fn test_query_builds_filter() {
        let query = ProductQuery {
            category: Some("Dairy".into()),
            q: Some("paneer".into()),
            hot_deals: true,
            city: None,
        };
        let filter = query.filter();
        assert_eq!(filter.category.as_deref(), Some("Dairy"));
        assert_eq!(filter.search.as_deref(), Some("paneer"));
        assert!(filter.hot_deals_only);
    }

    #[test]
    fn test_view_includes_discount_and_days_left() {
        let now = Utc::now();
        let today = now.date_naive();
        let product = Product {
            id: ProductId::new(9),
            name: "Paneer 1kg".into(),
            category: "Dairy".into(),
            mrp: Money::from_rupees(400),
            selling_price: Money::from_rupees(300),
            image_url: None,
            expiry_date: today + Days::new(4),
            quantity: 12,
            is_hot_deal: true,
            cities: vec![CityId::new(1)],
            created_at: now,
            updated_at: now,
        };

        let view = ProductView::new(&product, today);
        assert_eq!(view.discount_percent, 25);
        assert_eq!(view.days_until_expiry, 4);
        assert_eq!(view.price_display, "₹300.00");
        assert_eq!(view.stock, 12);
    }
}
