//! City management.

use sqlx::PgPool;

use xstore_core::{City, CityId};

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct CityRow {
    id: i32,
    name: String,
    is_active: bool,
    product_count: i64,
}

/// A city with the number of products offered in it.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CityWithUsage {
    #[serde(flatten)]
    pub city: City,
    pub product_count: i64,
}

impl From<CityRow> for CityWithUsage {
    fn from(row: CityRow) -> Self {
        Self {
            city: City {
                id: CityId::new(row.id),
                name: row.name,
                is_active: row.is_active,
            },
            product_count: row.product_count,
        }
    }
}

const CITY_SELECT: &str = r"
    SELECT c.id, c.name, c.is_active,
           (SELECT COUNT(*) FROM xstore.product_city pc WHERE pc.city_id = c.id) AS product_count
    FROM xstore.city c
";

/// Repository for `city` rows.
pub struct CityRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CityRepository<'a> {
    /// Create a new city repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All cities, active or not, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<CityWithUsage>, RepositoryError> {
        let rows = sqlx::query_as::<_, CityRow>(&format!("{CITY_SELECT} ORDER BY lower(c.name)"))
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(CityWithUsage::from).collect())
    }

    /// Get a city by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CityId) -> Result<Option<CityWithUsage>, RepositoryError> {
        let row = sqlx::query_as::<_, CityRow>(&format!("{CITY_SELECT} WHERE c.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(CityWithUsage::from))
    }

    /// Create a city.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a city with the same name
    /// (ignoring case) exists.
    pub async fn create(&self, name: &str, is_active: bool) -> Result<City, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO xstore.city (name, is_active)
            VALUES ($1, $2)
            RETURNING id
            ",
        )
        .bind(name)
        .bind(is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::unique(e, "a city with this name already exists"))?;

        Ok(City {
            id: CityId::new(id),
            name: name.to_owned(),
            is_active,
        })
    }

    /// Insert a city, or update `is_active` on the city with the same name
    /// (ignoring case). The stored spelling of an existing name is kept.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(&self, name: &str, is_active: bool) -> Result<City, RepositoryError> {
        let (id, stored_name): (i32, String) = sqlx::query_as(
            r"
            INSERT INTO xstore.city (name, is_active)
            VALUES ($1, $2)
            ON CONFLICT ((lower(name))) DO UPDATE SET is_active = EXCLUDED.is_active
            RETURNING id, name
            ",
        )
        .bind(name)
        .bind(is_active)
        .fetch_one(self.pool)
        .await?;

        Ok(City {
            id: CityId::new(id),
            name: stored_name,
            is_active,
        })
    }

    /// Rename a city or change whether shops can select it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the city does not exist.
    /// Returns `RepositoryError::Conflict` if the new name is taken.
    pub async fn update(
        &self,
        id: CityId,
        name: &str,
        is_active: bool,
    ) -> Result<City, RepositoryError> {
        let result = sqlx::query("UPDATE xstore.city SET name = $2, is_active = $3 WHERE id = $1")
            .bind(id)
            .bind(name)
            .bind(is_active)
            .execute(self.pool)
            .await
            .map_err(|e| RepositoryError::unique(e, "a city with this name already exists"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(City {
            id,
            name: name.to_owned(),
            is_active,
        })
    }

    /// Delete a city that no product references.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if any product is still offered in
    /// the city. Returns `RepositoryError::NotFound` if it does not exist.
    pub async fn delete(&self, id: CityId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Lock the city so no product can be linked to it between the check
        // and the delete.
        let exists: Option<i32> =
            sqlx::query_scalar("SELECT id FROM xstore.city WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let in_use: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM xstore.product_city WHERE city_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if in_use > 0 {
            return Err(RepositoryError::Conflict(format!(
                "city is assigned to {in_use} product(s); remove it from them first"
            )));
        }

        sqlx::query("DELETE FROM xstore.city WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Which of `ids` do not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn missing(&self, ids: &[CityId]) -> Result<Vec<CityId>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let raw: Vec<i32> = ids.iter().map(CityId::as_i32).collect();
        let missing: Vec<i32> = sqlx::query_scalar(
            r"
            SELECT wanted.id
            FROM unnest($1::int4[]) AS wanted(id)
            WHERE NOT EXISTS (SELECT 1 FROM xstore.city c WHERE c.id = wanted.id)
            ORDER BY wanted.id
            ",
        )
        .bind(&raw)
        .fetch_all(self.pool)
        .await?;

        Ok(missing.into_iter().map(CityId::new).collect())
    }
}
