use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Row};

use crate::database::manager::DatabaseError;
use crate::database::query_builder::{bind_param_query, bind_param_query_as, ListQuery, Scope};
use crate::models::Entity;
use crate::pagination::{PageRequest, QuerySource};

/// `QuerySource` over a Postgres table.
pub struct PgQuerySource<E> {
    pool: PgPool,
    scope: Option<Scope>,
    _phantom: PhantomData<fn() -> E>,
}

impl<E> PgQuerySource<E> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            scope: None,
            _phantom: PhantomData,
        }
    }

    pub fn scoped(pool: PgPool, scope: Scope) -> Self {
        Self {
            pool,
            scope: Some(scope),
            _phantom: PhantomData,
        }
    }
}

#[async_trait]
impl<E> QuerySource for PgQuerySource<E>
where
    E: Entity + for<'r> FromRow<'r, PgRow>,
{
    type Item = E;

    async fn count(&self, request: &PageRequest) -> Result<u64, DatabaseError> {
        let sql = ListQuery::new(&E::METADATA, request)
            .scope(self.scope)
            .to_count_sql()?;

        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(&self.pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count.max(0) as u64)
    }

    async fn slice(&self, offset: u64, limit: u64, request: &PageRequest) -> Result<Vec<E>, DatabaseError> {
        let sql = ListQuery::new(&E::METADATA, request)
            .scope(self.scope)
            .to_sql(offset, limit)?;

        let mut q = sqlx::query_as::<_, E>(&sql.query);
        for p in sql.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let rows = q.fetch_all(&self.pool).await?;
        Ok(rows)
    }
}
