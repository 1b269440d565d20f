use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction applied to the `orderBy` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[serde(rename = "ASC")]
    Asc,
    #[default]
    #[serde(rename = "DESC")]
    Desc,
}

impl SortOrder {
    /// Case-insensitive parse; anything but "ASC"/"DESC" is rejected
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "ASC" => Some(SortOrder::Asc),
            "DESC" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_sql())
    }
}

/// Fully resolved paging, sorting and filtering parameters for one list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
    pub order: SortOrder,
    pub order_by: String,
    pub filter: Option<String>,
    pub filter_by: String,
}

impl PageRequest {
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

/// Configured fallbacks used while resolving a list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationDefaults {
    pub items_per_page: u64,
    pub max_items_per_page: u64,
    pub order: SortOrder,
    pub order_by: String,
}

impl Default for PaginationDefaults {
    fn default() -> Self {
        Self {
            items_per_page: 5,
            max_items_per_page: 100,
            order: SortOrder::Desc,
            order_by: "createdAt".to_string(),
        }
    }
}

/// A field that list requests may sort and filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Name used in `orderBy`/`filterBy` and in serialized output
    pub name: &'static str,
    /// Storage column
    pub column: &'static str,
}

impl Field {
    pub const fn new(name: &'static str, column: &'static str) -> Self {
        Self { name, column }
    }
}

/// Static description of a listable entity.
#[derive(Debug, Clone, Copy)]
pub struct EntityMetadata {
    pub name: &'static str,
    pub table: &'static str,
    /// Primary key field, also the ordering tie-break
    pub id_field: Field,
    pub fields: &'static [Field],
    pub default_filter_by: &'static str,
}

impl EntityMetadata {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

/// Typed value of an entity field, used for in-process filtering and sorting.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
    Time(DateTime<Utc>),
    Null,
}

impl FieldValue {
    /// Text rendering the substring filter is matched against
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Int(i) => i.to_string(),
            FieldValue::Float(f) => f.to_string(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Time(t) => t.to_rfc3339(),
            FieldValue::Null => String::new(),
        }
    }

    pub fn contains(&self, needle: &str) -> bool {
        match self {
            FieldValue::Text(s) => s.contains(needle),
            FieldValue::Null => false,
            other => other.as_text().contains(needle),
        }
    }

    /// Total order used for sorting; nulls sort last like Postgres ASC.
    pub fn compare(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Null, FieldValue::Null) => Ordering::Equal,
            (FieldValue::Null, _) => Ordering::Greater,
            (_, FieldValue::Null) => Ordering::Less,
            (FieldValue::Int(a), FieldValue::Int(b)) => a.cmp(b),
            (FieldValue::Float(a), FieldValue::Float(b)) => a.total_cmp(b),
            (FieldValue::Int(a), FieldValue::Float(b)) => (*a as f64).total_cmp(b),
            (FieldValue::Float(a), FieldValue::Int(b)) => a.total_cmp(&(*b as f64)),
            (FieldValue::Time(a), FieldValue::Time(b)) => a.cmp(b),
            (a, b) => a.as_text().cmp(&b.as_text()),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        FieldValue::Time(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(FieldValue::Null)
    }
}
