use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::query_builder::Scope;
use crate::database::source::PgQuerySource;
use crate::models::{NewProduct, NewUser, Product, User};
use crate::pagination::QuerySource;

pub type ProductSource = Box<dyn QuerySource<Item = Product>>;
pub type UserSource = Box<dyn QuerySource<Item = User>>;

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Every product, for the paginated catalogue
    async fn list_source(&self) -> ProductSource;

    async fn find(&self, id: i64) -> Result<Option<Product>, DatabaseError>;

    async fn insert(&self, product: NewProduct) -> Result<Product, DatabaseError>;
}

/// Changes applied by an update; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// The client itself plus the users it owns
    async fn client_source(&self, client_id: i64) -> UserSource;

    async fn find(&self, id: i64) -> Result<Option<User>, DatabaseError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    /// Fails with `Duplicate("email")` when the email is taken
    async fn insert(&self, user: NewUser) -> Result<User, DatabaseError>;

    async fn update(&self, id: i64, changes: UserChanges) -> Result<User, DatabaseError>;

    async fn remove(&self, id: i64) -> Result<(), DatabaseError>;
}

/// Postgres-backed repositories
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgStore {
    async fn list_source(&self) -> ProductSource {
        Box::new(PgQuerySource::<Product>::new(self.pool.clone()))
    }

    async fn find(&self, id: i64) -> Result<Option<Product>, DatabaseError> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM \"products\" WHERE \"id\" = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    async fn insert(&self, product: NewProduct) -> Result<Product, DatabaseError> {
        sqlx::query_as::<_, Product>(
            "INSERT INTO \"products\" (\"name\", \"description\", \"price\", \"created_at\", \"updated_at\")
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.created_at)
        .bind(product.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_write(e, "name"))
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn client_source(&self, client_id: i64) -> UserSource {
        Box::new(PgQuerySource::<User>::scoped(
            self.pool.clone(),
            Scope::OwnedByClient(client_id),
        ))
    }

    async fn find(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM \"users\" WHERE \"id\" = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM \"users\" WHERE \"email\" = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn insert(&self, user: NewUser) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO \"users\" (\"email\", \"roles\", \"password\", \"client_id\", \"created_at\", \"updated_at\")
             VALUES ($1, $2, $3, $4, $5, $5)
             RETURNING *",
        )
        .bind(&user.email)
        .bind(&user.roles)
        .bind(&user.password_hash)
        .bind(user.client_id)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_write(e, "email"))
    }

    async fn update(&self, id: i64, changes: UserChanges) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            "UPDATE \"users\"
             SET \"email\" = COALESCE($2, \"email\"),
                 \"password\" = COALESCE($3, \"password\"),
                 \"updated_at\" = now()
             WHERE \"id\" = $1
             RETURNING *",
        )
        .bind(id)
        .bind(changes.email)
        .bind(changes.password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_write(e, "email"))?
        .ok_or_else(|| DatabaseError::NotFound(format!("User {} not found", id)))
    }

    async fn remove(&self, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM \"users\" WHERE \"id\" = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }
}
