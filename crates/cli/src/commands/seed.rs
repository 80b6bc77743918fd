//! Seed the catalogue from a YAML file.
//!
//! ```yaml
//! cities:
//!   - name: Mumbai
//!   - name: Nagpur
//!     is_active: false
//! products:
//!   - name: Marie Biscuits 250g
//!     category: Biscuits
//!     mrp: "40.00"
//!     selling_price: "22.00"
//!     expiry_date: 2026-12-31
//!     quantity: 120
//!     is_hot_deal: true
//!     cities: [Mumbai]
//! ```
//!
//! Cities are upserted by name (ignoring case). Products are always
//! inserted, so running the same file twice duplicates them. Products name
//! their cities; a name that is neither in the file nor in the database
//! aborts the run before any product is written. All products go in one
//! transaction, so a failed insert leaves none of them behind.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use xstore_admin::db::{CityRepository, ProductRepository, RepositoryError};
use xstore_admin::models::{CityInput, ProductInput, ProductInputError};
use xstore_core::{CityId, Money};

use super::{ConnectError, connect};

/// Errors from seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{entry}: {source}")]
    Invalid {
        entry: String,
        source: ProductInputError,
    },

    #[error("product {product}: unknown city {city}")]
    UnknownCity { product: String, city: String },

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Top-level seed document.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub cities: Vec<CityInput>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

/// A product as written in the seed file: cities by name, not id.
#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub name: String,
    pub category: String,
    pub mrp: Money,
    pub selling_price: Money,
    #[serde(default)]
    pub image_url: Option<String>,
    pub expiry_date: NaiveDate,
    pub quantity: i32,
    #[serde(default)]
    pub is_hot_deal: bool,
    #[serde(default)]
    pub cities: Vec<String>,
}

impl SeedProduct {
    /// Resolve city names against `city_ids` (keys lowercased).
    fn into_input(self, city_ids: &HashMap<String, CityId>) -> Result<ProductInput, SeedError> {
        let cities = self
            .cities
            .iter()
            .map(|name| {
                city_ids
                    .get(&name.trim().to_lowercase())
                    .copied()
                    .ok_or_else(|| SeedError::UnknownCity {
                        product: self.name.clone(),
                        city: name.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ProductInput {
            name: self.name,
            category: self.category,
            mrp: self.mrp,
            selling_price: self.selling_price,
            image_url: self.image_url,
            expiry_date: self.expiry_date,
            quantity: self.quantity,
            is_hot_deal: self.is_hot_deal,
            cities,
        })
    }
}

/// Parse a seed document and check the city names.
///
/// # Errors
///
/// Returns the first invalid entry.
pub fn parse(content: &str) -> Result<SeedFile, SeedError> {
    let file: SeedFile = serde_yaml::from_str(content)?;

    for city in &file.cities {
        city.validated_name().map_err(|source| SeedError::Invalid {
            entry: format!("city {:?}", city.name),
            source,
        })?;
    }

    Ok(file)
}

/// Seed cities and products from `file_path`.
///
/// # Errors
///
/// Returns an error if the file is missing or invalid, a product names an
/// unknown city, or a database write fails.
pub async fn run(file_path: &str) -> Result<(), SeedError> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(SeedError::FileNotFound(file_path.to_owned()));
    }

    tracing::info!(path = %file_path, "Loading seed file");
    let content = tokio::fs::read_to_string(path).await?;
    let seed = parse(&content)?;
    tracing::info!(
        cities = seed.cities.len(),
        products = seed.products.len(),
        "Parsed seed file"
    );

    let pool = connect().await?;
    let city_repo = CityRepository::new(&pool);

    let mut city_ids: HashMap<String, CityId> = city_repo
        .list()
        .await?
        .into_iter()
        .map(|c| (c.city.name.to_lowercase(), c.city.id))
        .collect();

    for city in &seed.cities {
        let name = city.validated_name().map_err(|source| SeedError::Invalid {
            entry: format!("city {:?}", city.name),
            source,
        })?;
        let stored = city_repo.upsert(&name, city.is_active).await?;
        tracing::info!(city_id = %stored.id, name = %stored.name, "City upserted");
        city_ids.insert(stored.name.to_lowercase(), stored.id);
    }

    // Resolve and validate everything before the first product insert.
    let drafts = seed
        .products
        .into_iter()
        .map(|product| {
            let entry = format!("product {:?}", product.name);
            product
                .into_input(&city_ids)?
                .validate()
                .map_err(|source| SeedError::Invalid { entry, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let ids = ProductRepository::new(&pool).create_all(&drafts).await?;
    for (id, draft) in ids.iter().zip(&drafts) {
        tracing::info!(product_id = %id, name = %draft.name, "Product inserted");
    }

    tracing::info!(products = drafts.len(), "Seeding complete!");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const SEED: &str = r#"
cities:
  - name: Mumbai
  - name: Nagpur
    is_active: false
products:
  - name: Marie Biscuits 250g
    category: Biscuits
    mrp: "40.00"
    selling_price: "22.00"
    expiry_date: 2026-12-31
    quantity: 120
    is_hot_deal: true
    cities: [Mumbai, " nagpur "]
"#;

    #[test]
    fn test_parse_seed_file() {
        let seed = parse(SEED).unwrap();
        assert_eq!(seed.cities.len(), 2);
        assert!(seed.cities[0].is_active);
        assert!(!seed.cities[1].is_active);
        assert_eq!(seed.products.len(), 1);
        assert_eq!(seed.products[0].mrp, Money::from_rupees(40));
    }

    #[test]
    fn test_city_names_resolve_case_insensitively() {
        let seed = parse(SEED).unwrap();
        let ids = HashMap::from([
            ("mumbai".to_string(), CityId::new(1)),
            ("nagpur".to_string(), CityId::new(2)),
        ]);
        let product = seed.products.into_iter().next().unwrap();
        let draft = product.into_input(&ids).unwrap().validate().unwrap();
        assert_eq!(draft.cities, vec![CityId::new(1), CityId::new(2)]);
    }

    #[test]
    fn test_unknown_city_is_reported() {
        let seed = parse(SEED).unwrap();
        let ids = HashMap::from([("mumbai".to_string(), CityId::new(1))]);
        let product = seed.products.into_iter().next().unwrap();
        assert!(matches!(
            product.into_input(&ids),
            Err(SeedError::UnknownCity { city, .. }) if city == " nagpur "
        ));
    }

    #[test]
    fn test_blank_city_name_is_rejected() {
        let err = parse("cities:\n  - name: '  '\n").unwrap_err();
        assert!(matches!(err, SeedError::Invalid { .. }));
    }
}
