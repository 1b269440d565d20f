use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::FromRow;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::pagination::{EntityMetadata, PageRequest};

#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Value>,
}

/// Row restriction applied before the client's filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The client itself and every user it owns
    OwnedByClient(i64),
}

/// Renders the count and page queries of a list request.
pub struct ListQuery<'a> {
    metadata: &'a EntityMetadata,
    request: &'a PageRequest,
    scope: Option<Scope>,
}

impl<'a> ListQuery<'a> {
    pub fn new(metadata: &'a EntityMetadata, request: &'a PageRequest) -> Self {
        Self {
            metadata,
            request,
            scope: None,
        }
    }

    pub fn scope(mut self, scope: Option<Scope>) -> Self {
        self.scope = scope;
        self
    }

    pub fn to_count_sql(&self) -> Result<SqlResult, DatabaseError> {
        let (where_clause, params) = self.where_clause()?;
        let mut query = format!(
            "SELECT COUNT(*) AS count FROM {}",
            DatabaseManager::quote_identifier(self.metadata.table)
        );
        if !where_clause.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&where_clause);
        }
        Ok(SqlResult { query, params })
    }

    pub fn to_sql(&self, offset: u64, limit: u64) -> Result<SqlResult, DatabaseError> {
        let (where_clause, mut params) = self.where_clause()?;
        let order_clause = self.order_clause()?;

        params.push(Value::from(limit as i64));
        let limit_index = params.len();
        params.push(Value::from(offset as i64));
        let offset_index = params.len();

        let query = [
            "SELECT *".to_string(),
            format!("FROM {}", DatabaseManager::quote_identifier(self.metadata.table)),
            if where_clause.is_empty() { String::new() } else { format!("WHERE {}", where_clause) },
            order_clause,
            format!("LIMIT ${} OFFSET ${}", limit_index, offset_index),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Ok(SqlResult { query, params })
    }

    fn where_clause(&self) -> Result<(String, Vec<Value>), DatabaseError> {
        let mut conditions = Vec::new();
        let mut params = Vec::new();

        if let Some(Scope::OwnedByClient(client_id)) = self.scope {
            params.push(Value::from(client_id));
            conditions.push(format!(
                "({id} = ${n} OR \"client_id\" = ${n})",
                id = DatabaseManager::quote_identifier(self.metadata.id_field.column),
                n = params.len()
            ));
        }

        if let Some(filter) = &self.request.filter {
            let column = self.column(&self.request.filter_by)?;
            params.push(Value::String(format!("%{}%", escape_like(filter))));
            // LIKE is case-sensitive in Postgres; casting lets numbers and dates be searched too
            conditions.push(format!(
                "CAST({} AS TEXT) LIKE ${} ESCAPE '\\'",
                DatabaseManager::quote_identifier(column),
                params.len()
            ));
        }

        Ok((conditions.join(" AND "), params))
    }

    fn order_clause(&self) -> Result<String, DatabaseError> {
        let column = self.column(&self.request.order_by)?;
        let id_column = self.metadata.id_field.column;
        let mut clause = format!(
            "ORDER BY {} {}",
            DatabaseManager::quote_identifier(column),
            self.request.order.to_sql()
        );
        if column != id_column {
            clause.push_str(&format!(", {} ASC", DatabaseManager::quote_identifier(id_column)));
        }
        Ok(clause)
    }

    fn column(&self, field: &str) -> Result<&'static str, DatabaseError> {
        self.metadata
            .field(field)
            .map(|f| f.column)
            .ok_or_else(|| DatabaseError::QueryError(format!("Unknown field {} on {}", field, self.metadata.name)))
    }
}

/// Escape LIKE wildcards so the filter is a plain substring
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub(crate) fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        Value::Array(_) | Value::Object(_) => q.bind(v.to_string()),
    }
}

pub(crate) fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        Value::Array(_) | Value::Object(_) => q.bind(v.to_string()),
    }
}
