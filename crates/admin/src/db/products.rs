//! Product management, including which cities a product is offered in.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgConnection, PgPool};

use xstore_core::{CityId, Money, Product, ProductId};

use super::RepositoryError;
use crate::models::ProductDraft;

/// Columns selected for every product query. `cities` is aggregated from
/// `product_city` so a product and its availability come back in one row.
const PRODUCT_SELECT: &str = r"
    SELECT p.id, p.name, p.category, p.mrp, p.selling_price, p.image_url,
           p.expiry_date, p.quantity, p.is_hot_deal, p.created_at, p.updated_at,
           COALESCE(
               array_agg(pc.city_id ORDER BY pc.city_id) FILTER (WHERE pc.city_id IS NOT NULL),
               '{}'
           ) AS cities
    FROM xstore.product p
    LEFT JOIN xstore.product_city pc ON pc.product_id = p.id
";

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

/// Repository for `product` and `product_city` rows.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every product, newest first, including expired and out-of-stock ones.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "{PRODUCT_SELECT} GROUP BY p.id ORDER BY p.created_at DESC, p.id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "{PRODUCT_SELECT} WHERE p.id = $1 GROUP BY p.id"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Insert a product and its city links in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a city does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, draft: &ProductDraft) -> Result<ProductId, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let id = Self::insert(&mut tx, draft).await?;
        tx.commit().await?;

        Ok(id)
    }

    /// Insert every draft in one transaction; either all land or none do.
    ///
    /// # Errors
    ///
    /// Returns the first failing insert's error. Nothing is written.
    pub async fn create_all(
        &self,
        drafts: &[ProductDraft],
    ) -> Result<Vec<ProductId>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let mut ids = Vec::with_capacity(drafts.len());
        for draft in drafts {
            ids.push(Self::insert(&mut tx, draft).await?);
        }

        tx.commit().await?;
        Ok(ids)
    }

    /// Insert a product and its city links on an existing transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a city does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert(
        conn: &mut PgConnection,
        draft: &ProductDraft,
    ) -> Result<ProductId, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO xstore.product
                (name, category, mrp, selling_price, image_url, expiry_date, quantity, is_hot_deal)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            ",
        )
        .bind(&draft.name)
        .bind(&draft.category)
        .bind(draft.mrp)
        .bind(draft.selling_price)
        .bind(draft.image_url.as_deref())
        .bind(draft.expiry_date)
        .bind(draft.quantity)
        .bind(draft.is_hot_deal)
        .fetch_one(&mut *conn)
        .await?;

        let id = ProductId::new(id);
        link_cities(conn, id, &draft.cities).await?;

        Ok(id)
    }

    /// Replace a product's fields and city links in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Conflict` if a city does not exist.
    pub async fn update(&self, id: ProductId, draft: &ProductDraft) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r"
            UPDATE xstore.product
            SET name = $2, category = $3, mrp = $4, selling_price = $5, image_url = $6,
                expiry_date = $7, quantity = $8, is_hot_deal = $9, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.category)
        .bind(draft.mrp)
        .bind(draft.selling_price)
        .bind(draft.image_url.as_deref())
        .bind(draft.expiry_date)
        .bind(draft.quantity)
        .bind(draft.is_hot_deal)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("DELETE FROM xstore.product_city WHERE product_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        link_cities(&mut tx, id, &draft.cities).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Delete a product. Its city links go with it; order lines keep their
    /// copied details and lose the product reference.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM xstore.product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

async fn link_cities(
    conn: &mut PgConnection,
    product: ProductId,
    cities: &[CityId],
) -> Result<(), RepositoryError> {
    if cities.is_empty() {
        return Ok(());
    }

    let raw: Vec<i32> = cities.iter().map(CityId::as_i32).collect();
    sqlx::query(
        r"
        INSERT INTO xstore.product_city (product_id, city_id)
        SELECT $1, city_id FROM unnest($2::int4[]) AS t(city_id)
        ",
    )
    .bind(product)
    .bind(&raw)
    .execute(conn)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_foreign_key_violation()
        {
            return RepositoryError::Conflict("unknown city".to_owned());
        }
        RepositoryError::Database(e)
    })?;

    Ok(())
}
