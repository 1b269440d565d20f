use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::error::PaginationError;
use super::params::QueryParams;

/// Turns a named route plus parameters into a URL.
pub trait UrlGenerator: Send + Sync {
    fn generate(&self, route: &str, params: &QueryParams) -> Result<String, PaginationError>;
}

/// Named routes with `{placeholder}` path segments.
///
/// Parameters matching a placeholder are substituted into the path, the rest
/// are appended as a query string in their original order.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, String>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.routes.insert(name.into(), path.into());
        self
    }

    pub fn path(&self, name: &str) -> Option<&str> {
        self.routes.get(name).map(String::as_str)
    }
}

impl UrlGenerator for RouteTable {
    fn generate(&self, route: &str, params: &QueryParams) -> Result<String, PaginationError> {
        let template = self
            .path(route)
            .ok_or_else(|| PaginationError::UnknownRoute(route.to_string()))?;

        let mut query = params.clone();
        let mut path = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            let end = rest[start..].find('}').map(|e| start + e).ok_or_else(|| {
                PaginationError::UnknownRoute(format!("{} (unterminated placeholder)", route))
            })?;
            let name = &rest[start + 1..end];
            let value = query.remove(name).ok_or_else(|| PaginationError::MissingRouteParameter {
                route: route.to_string(),
                parameter: name.to_string(),
            })?;
            path.push_str(&rest[..start]);
            path.extend(url::form_urlencoded::byte_serialize(value.as_bytes()));
            rest = &rest[end + 1..];
        }
        path.push_str(rest);

        if !query.is_empty() {
            path.push('?');
            path.push_str(&query.to_query_string());
        }
        Ok(path)
    }
}

/// Navigation links of a paginated collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSet {
    #[serde(rename = "self")]
    pub self_link: String,
    pub first: String,
    pub last: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}

/// Build self/first/last/next/prev for `route`, carrying every parameter
/// except `page` over unchanged.
pub fn build_links(
    urls: &dyn UrlGenerator,
    route: &str,
    params: &QueryParams,
    current_page: u64,
    total_pages: u64,
) -> Result<LinkSet, PaginationError> {
    let link = |page: u64| urls.generate(route, &params.with_page(page));

    Ok(LinkSet {
        self_link: link(current_page)?,
        first: link(1)?,
        last: link(total_pages)?,
        next: if current_page < total_pages {
            Some(link(current_page + 1)?)
        } else {
            None
        },
        prev: if current_page > 1 {
            Some(link(current_page - 1)?)
        } else {
            None
        },
    })
}
