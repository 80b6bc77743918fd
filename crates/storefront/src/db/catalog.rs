//! Catalogue queries: cities and the products offered in them.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use xstore_core::{City, CityId, Money, Product, ProductId};

use super::RepositoryError;

/// Columns selected for every product query. `cities` is aggregated from
/// `product_city` so a product and its availability come back in one row.
const PRODUCT_COLUMNS: &str = r"
    p.id, p.name, p.category, p.mrp, p.selling_price, p.image_url,
    p.expiry_date, p.quantity, p.is_hot_deal, p.created_at, p.updated_at,
    COALESCE(
        array_agg(pc.city_id ORDER BY pc.city_id) FILTER (WHERE pc.city_id IS NOT NULL),
        '{}'
    ) AS cities
";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct CityRow {
    id: i32,
    name: String,
    is_active: bool,
}

impl From<CityRow> for City {
    fn from(row: CityRow) -> Self {
        Self {
            id: CityId::new(row.id),
            name: row.name,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    category: String,
    mrp: Money,
    selling_price: Money,
    image_url: Option<String>,
    expiry_date: NaiveDate,
    quantity: i32,
    is_hot_deal: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    cities: Vec<i32>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        if row.quantity < 0 {
            return Err(RepositoryError::DataCorruption(format!(
                "negative stock for product {}",
                row.id
            )));
        }

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            category: row.category,
            mrp: row.mrp,
            selling_price: row.selling_price,
            image_url: row.image_url,
            expiry_date: row.expiry_date,
            quantity: row.quantity,
            is_hot_deal: row.is_hot_deal,
            cities: row.cities.into_iter().map(CityId::new).collect(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Read-only access to cities and products.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalogue repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Active cities sorted by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active_cities(&self) -> Result<Vec<City>, RepositoryError> {
        let rows = sqlx::query_as::<_, CityRow>(
            r"
            SELECT id, name, is_active
            FROM xstore.city
            WHERE is_active
            ORDER BY lower(name)
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(City::from).collect())
    }

    /// Get an active city by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active_city(&self, id: CityId) -> Result<Option<City>, RepositoryError> {
        let row = sqlx::query_as::<_, CityRow>(
            r"
            SELECT id, name, is_active
            FROM xstore.city
            WHERE id = $1 AND is_active
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(City::from))
    }

    /// Products a shop in `city` can order on `today`: offered in the city,
    /// not expired, and in stock.
    ///
    /// Hot deals come first, then the soonest to expire.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a row is invalid.
    pub async fn list_visible_products(
        &self,
        city: CityId,
        today: NaiveDate,
    ) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM xstore.product p
            LEFT JOIN xstore.product_city pc ON pc.product_id = p.id
            WHERE p.expiry_date >= $2
              AND p.quantity > 0
              AND EXISTS (
                  SELECT 1 FROM xstore.product_city v
                  WHERE v.product_id = p.id AND v.city_id = $1
              )
            GROUP BY p.id
            ORDER BY p.is_hot_deal DESC, p.expiry_date ASC, p.name ASC
            "
        );

        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(city)
            .bind(today)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a product by ID regardless of city or stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the row is invalid.
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM xstore.product p
            LEFT JOIN xstore.product_city pc ON pc.product_id = p.id
            WHERE p.id = $1
            GROUP BY p.id
            "
        );

        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Fetch the current state of several products at once.
    ///
    /// Unknown IDs are simply absent from the result.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a row is invalid.
    pub async fn get_products(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let ids: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
        let sql = format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM xstore.product p
            LEFT JOIN xstore.product_city pc ON pc.product_id = p.id
            WHERE p.id = ANY($1)
            GROUP BY p.id
            "
        );

        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(&ids)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
