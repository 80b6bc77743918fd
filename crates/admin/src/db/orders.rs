//! Order queries, status changes, and deletion.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

use xstore_core::{Money, OrderId, OrderItemId, OrderStatus, ProductId};

use super::RepositoryError;
use crate::models::{Order, OrderItem, OrderSummary};

/// Upper bound on rows returned by one list call.
const MAX_ORDERS: i64 = 500;

/// Filters for the order list. Both are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// City name as written on the order (case-insensitive).
    pub city: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderSummaryRow {
    id: OrderId,
    shop_name: String,
    phone_number: String,
    city: String,
    total: Money,
    status: OrderStatus,
    item_count: i64,
    created_at: DateTime<Utc>,
}

impl From<OrderSummaryRow> for OrderSummary {
    fn from(row: OrderSummaryRow) -> Self {
        Self {
            id: row.id,
            shop_name: row.shop_name,
            phone_number: row.phone_number,
            city: row.city,
            total: row.total,
            status: row.status,
            item_count: row.item_count,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    shop_name: String,
    phone_number: String,
    address: String,
    landmark: Option<String>,
    city: String,
    total: Money,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: OrderItemId,
    product_id: Option<ProductId>,
    product_name: String,
    category: String,
    image_url: Option<String>,
    mrp: Money,
    quantity: i32,
    price: Money,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            product_name: row.product_name,
            category: row.category,
            image_url: row.image_url,
            mrp: row.mrp,
            quantity: row.quantity,
            price: row.price,
        }
    }
}

/// Repository for `order` and `order_item` rows.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Orders matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &OrderFilter) -> Result<Vec<OrderSummary>, RepositoryError> {
        let mut query: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            r#"
            SELECT o.id, o.shop_name, o.phone_number, o.city, o.total, o.status, o.created_at,
                   (SELECT COUNT(*) FROM xstore.order_item i WHERE i.order_id = o.id) AS item_count
            FROM xstore."order" o
            WHERE TRUE
            "#,
        );

        if let Some(status) = filter.status {
            query.push(" AND o.status = ").push_bind(status);
        }
        if let Some(city) = filter.city.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            query
                .push(" AND lower(o.city) = lower(")
                .push_bind(city.to_owned())
                .push(")");
        }
        query
            .push(" ORDER BY o.created_at DESC, o.id DESC LIMIT ")
            .push_bind(MAX_ORDERS);

        let rows = query
            .build_query_as::<OrderSummaryRow>()
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(OrderSummary::from).collect())
    }

    /// An order with its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let Some(row) = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, shop_name, phone_number, address, landmark, city, total, status,
                   created_at, updated_at
            FROM xstore."order"
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT id, product_id, product_name, category, image_url, mrp, quantity, price
            FROM xstore.order_item
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(Order {
            id: row.id,
            shop_name: row.shop_name,
            phone_number: row.phone_number,
            address: row.address,
            landmark: row.landmark,
            city: row.city,
            total: row.total,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
            items: items.into_iter().map(OrderItem::from).collect(),
        }))
    }

    /// Move an order to `next`, honouring the allowed transitions.
    ///
    /// Returns the status the order had before.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    /// Returns `RepositoryError::Conflict` if the transition is not allowed.
    pub async fn set_status(
        &self,
        id: OrderId,
        next: OrderStatus,
    ) -> Result<OrderStatus, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current: OrderStatus =
            sqlx::query_scalar(r#"SELECT status FROM xstore."order" WHERE id = $1 FOR UPDATE"#)
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(RepositoryError::NotFound)?;

        if !current.can_transition_to(next) {
            return Err(RepositoryError::Conflict(format!(
                "cannot move an order from {current} to {next}"
            )));
        }

        sqlx::query(r#"UPDATE xstore."order" SET status = $2, updated_at = NOW() WHERE id = $1"#)
            .bind(id)
            .bind(next)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(current)
    }

    /// Delete an order and its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query(r#"DELETE FROM xstore."order" WHERE id = $1"#)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
