use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::entity::Entity;
use crate::pagination::{EntityMetadata, Field, FieldValue, QueryParams, UrlGenerator};

pub const PRODUCT_LIST_ROUTE: &str = "api_products_list";
pub const PRODUCT_SHOW_ROUTE: &str = "api_products_show";

const PRODUCT_FIELDS: &[Field] = &[
    Field::new("id", "id"),
    Field::new("name", "name"),
    Field::new("description", "description"),
    Field::new("price", "price"),
    Field::new("createdAt", "created_at"),
    Field::new("updatedAt", "updated_at"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Product {
    const METADATA: EntityMetadata = EntityMetadata {
        name: "product",
        table: "products",
        id_field: Field::new("id", "id"),
        fields: PRODUCT_FIELDS,
        default_filter_by: "name",
    };

    fn id(&self) -> i64 {
        self.id
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        let value = match field {
            "id" => self.id.into(),
            "name" => self.name.as_str().into(),
            "description" => self.description.as_str().into(),
            "price" => self.price.into(),
            "createdAt" => self.created_at.into(),
            "updatedAt" => self.updated_at.into(),
            _ => return None,
        };
        Some(value)
    }
}

/// Fields for a product about to be stored
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductLinks {
    #[serde(rename = "self")]
    pub self_link: String,
}

/// Public representation: timestamps stay internal.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(rename = "_links", skip_serializing_if = "Option::is_none")]
    pub links: Option<ProductLinks>,
}

impl ProductView {
    pub fn new(product: Product, urls: &dyn UrlGenerator) -> Self {
        let params: QueryParams = [("id", product.id.to_string())].into_iter().collect();
        let links = match urls.generate(PRODUCT_SHOW_ROUTE, &params) {
            Ok(self_link) => Some(ProductLinks { self_link }),
            Err(e) => {
                tracing::warn!("No self link for product {}: {}", product.id, e);
                None
            }
        };

        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            links,
        }
    }
}
