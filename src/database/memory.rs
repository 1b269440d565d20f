use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::repository::{
    ProductRepository, ProductSource, UserChanges, UserRepository, UserSource,
};
use crate::models::{Entity, NewProduct, NewUser, Product, User};
use crate::pagination::{PageRequest, QuerySource, SortOrder};

/// `QuerySource` over a snapshot of rows held in process.
///
/// Filtering and ordering mirror the SQL rendering: case-sensitive substring
/// match on the filter field, then the requested order with ties broken on id.
#[derive(Debug, Clone)]
pub struct MemorySource<E> {
    rows: Vec<E>,
}

impl<E: Entity> MemorySource<E> {
    pub fn new(rows: Vec<E>) -> Self {
        Self { rows }
    }

    fn matching(&self, request: &PageRequest) -> Vec<&E> {
        match &request.filter {
            Some(term) => self
                .rows
                .iter()
                .filter(|row| {
                    row.field_value(&request.filter_by)
                        .map(|v| v.contains(term))
                        .unwrap_or(false)
                })
                .collect(),
            None => self.rows.iter().collect(),
        }
    }
}

#[async_trait]
impl<E: Entity> QuerySource for MemorySource<E> {
    type Item = E;

    async fn count(&self, request: &PageRequest) -> Result<u64, DatabaseError> {
        Ok(self.matching(request).len() as u64)
    }

    async fn slice(&self, offset: u64, limit: u64, request: &PageRequest) -> Result<Vec<E>, DatabaseError> {
        if !E::METADATA.has_field(&request.order_by) {
            return Err(DatabaseError::QueryError(format!(
                "Unknown field {} on {}",
                request.order_by, E::METADATA.name
            )));
        }

        let mut rows = self.matching(request);
        rows.sort_by(|a, b| {
            let ordering = match (a.field_value(&request.order_by), b.field_value(&request.order_by)) {
                (Some(x), Some(y)) => x.compare(&y),
                _ => Ordering::Equal,
            };
            let ordering = match request.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            };
            ordering.then_with(|| a.id().cmp(&b.id()))
        });

        Ok(rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[derive(Debug, Default)]
struct Tables {
    products: Vec<Product>,
    users: Vec<User>,
    next_product_id: i64,
    next_user_id: i64,
}

/// In-process store used by `--memory` mode and the test suite.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn product_count(&self) -> usize {
        self.tables.read().await.products.len()
    }

    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn list_source(&self) -> ProductSource {
        let rows = self.tables.read().await.products.clone();
        Box::new(MemorySource::new(rows))
    }

    async fn find(&self, id: i64) -> Result<Option<Product>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.products.iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, product: NewProduct) -> Result<Product, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.products.iter().any(|p| p.name == product.name) {
            return Err(DatabaseError::Duplicate("name".to_string()));
        }
        tables.next_product_id += 1;
        let stored = Product {
            id: tables.next_product_id,
            name: product.name,
            description: product.description,
            price: product.price,
            created_at: product.created_at,
            updated_at: product.updated_at,
        };
        tables.products.push(stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn client_source(&self, client_id: i64) -> UserSource {
        let rows = self
            .tables
            .read()
            .await
            .users
            .iter()
            .filter(|u| u.id == client_id || u.client_id == Some(client_id))
            .cloned()
            .collect();
        Box::new(MemorySource::new(rows))
    }

    async fn find(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(DatabaseError::Duplicate("email".to_string()));
        }
        tables.next_user_id += 1;
        let stored = User {
            id: tables.next_user_id,
            email: user.email,
            roles: user.roles,
            password: user.password_hash,
            client_id: user.client_id,
            created_at: user.created_at,
            updated_at: user.created_at,
        };
        tables.users.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: i64, changes: UserChanges) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if let Some(email) = &changes.email {
            if tables.users.iter().any(|u| u.id != id && &u.email == email) {
                return Err(DatabaseError::Duplicate("email".to_string()));
            }
        }

        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| DatabaseError::NotFound(format!("User {} not found", id)))?;
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(hash) = changes.password_hash {
            user.password = hash;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn remove(&self, id: i64) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        if tables.users.len() == before {
            return Err(DatabaseError::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }
}
