//! Order writes.

use sqlx::PgPool;

use xstore_core::{OrderId, ValidCheckout};

use super::RepositoryError;
use crate::models::PricedOrder;

/// Repository for placing orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order and all of its lines in one transaction.
    ///
    /// If any line fails to insert the transaction is rolled back and no
    /// order row is left behind.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn create(
        &self,
        details: &ValidCheckout,
        city_name: &str,
        order: &PricedOrder,
    ) -> Result<OrderId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order_id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO xstore."order"
                (shop_name, phone_number, address, landmark, city, total, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'pending')
            RETURNING id
            "#,
        )
        .bind(&details.shop_name)
        .bind(details.phone_number.as_str())
        .bind(&details.address)
        .bind(details.landmark.as_deref())
        .bind(city_name)
        .bind(order.total)
        .fetch_one(&mut *tx)
        .await?;

        for line in &order.lines {
            let quantity = i32::try_from(line.quantity).map_err(|_| {
                RepositoryError::DataCorruption(format!(
                    "quantity {} out of range for product {}",
                    line.quantity, line.product_id
                ))
            })?;

            sqlx::query(
                r"
                INSERT INTO xstore.order_item
                    (order_id, product_id, product_name, category, image_url, mrp, quantity, price)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ",
            )
            .bind(order_id)
            .bind(line.product_id)
            .bind(&line.product_name)
            .bind(&line.category)
            .bind(line.image_url.as_deref())
            .bind(line.mrp)
            .bind(quantity)
            .bind(line.price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(OrderId::new(order_id))
    }
}
