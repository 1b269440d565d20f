use serde::Serialize;

use super::links::LinkSet;
use super::types::{PageRequest, SortOrder};

/// One page of results plus navigation links and the sort/filter context
/// it was produced with.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub count: u64,
    #[serde(rename = "_links")]
    pub links: LinkSet,
    pub order: SortOrder,
    pub order_by: String,
    pub filter: Option<String>,
    pub filter_by: String,
}

impl<T> Page<T> {
    pub fn assemble(items: Vec<T>, total: u64, request: &PageRequest, links: LinkSet) -> Self {
        Self {
            count: items.len() as u64,
            items,
            total,
            links,
            order: request.order,
            order_by: request.order_by.clone(),
            filter: request.filter.clone(),
            filter_by: request.filter_by.clone(),
        }
    }

    /// Convert every item, e.g. from an entity to its read view
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            count: self.count,
            links: self.links,
            order: self.order,
            order_by: self.order_by,
            filter: self.filter,
            filter_by: self.filter_by,
        }
    }
}
