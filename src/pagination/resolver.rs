use super::params::QueryParams;
use super::types::{EntityMetadata, PageRequest, PaginationDefaults, SortOrder};

/// Resolve raw list parameters against an entity's fields and the configured
/// defaults. Never fails: anything unrecognized falls back to a default.
///
/// - `page`: positive integer, otherwise 1
/// - `count` (or `pageSize`): positive integer capped at `max_items_per_page`,
///   otherwise `items_per_page`
/// - `order`: "ASC"/"DESC" in any case, otherwise the configured order
/// - `orderBy`/`filterBy`: must name a field of the entity
/// - `filter`: kept verbatim when non-empty
pub fn resolve(
    params: &QueryParams,
    metadata: &EntityMetadata,
    defaults: &PaginationDefaults,
) -> PageRequest {
    let page = parse_positive(params.get("page")).unwrap_or(1);
    let page_size = resolve_page_size(params, defaults);

    let order = params
        .get("order")
        .and_then(SortOrder::parse)
        .unwrap_or(defaults.order);

    let order_by = match params.get("orderBy") {
        Some(name) if metadata.has_field(name) => name.to_string(),
        _ => default_order_by(metadata, defaults),
    };

    let filter_by = match params.get("filterBy") {
        Some(name) if metadata.has_field(name) => name.to_string(),
        _ => metadata.default_filter_by.to_string(),
    };

    let filter = params
        .get("filter")
        .filter(|f| !f.is_empty())
        .map(str::to_string);

    PageRequest {
        page,
        page_size,
        order,
        order_by,
        filter,
        filter_by,
    }
}

fn resolve_page_size(params: &QueryParams, defaults: &PaginationDefaults) -> u64 {
    let requested = parse_positive(params.get("count")).or_else(|| parse_positive(params.get("pageSize")));
    let max = defaults.max_items_per_page.max(1);

    match requested {
        Some(size) if size > max => {
            tracing::warn!("Page size {} exceeds max {}, capping to max", size, max);
            max
        }
        Some(size) => size,
        None => defaults.items_per_page.clamp(1, max),
    }
}

fn default_order_by(metadata: &EntityMetadata, defaults: &PaginationDefaults) -> String {
    if metadata.has_field(&defaults.order_by) {
        defaults.order_by.clone()
    } else {
        tracing::warn!(
            "Configured orderBy '{}' is not a field of {}, ordering by '{}'",
            defaults.order_by,
            metadata.name,
            metadata.id_field.name
        );
        metadata.id_field.name.to_string()
    }
}

fn parse_positive(value: Option<&str>) -> Option<u64> {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::types::Field;

    const FIELDS: &[Field] = &[
        Field::new("id", "id"),
        Field::new("name", "name"),
        Field::new("price", "price"),
        Field::new("createdAt", "created_at"),
    ];

    const PRODUCTS: EntityMetadata = EntityMetadata {
        name: "product",
        table: "products",
        id_field: Field::new("id", "id"),
        fields: FIELDS,
        default_filter_by: "name",
    };

    fn resolve_query(raw: &str) -> PageRequest {
        resolve(&QueryParams::parse(Some(raw)), &PRODUCTS, &PaginationDefaults::default())
    }

    #[test]
    fn empty_query_uses_defaults() {
        let request = resolve_query("");
        assert_eq!(request.page, 1);
        assert_eq!(request.page_size, 5);
        assert_eq!(request.order, SortOrder::Desc);
        assert_eq!(request.order_by, "createdAt");
        assert_eq!(request.filter, None);
        assert_eq!(request.filter_by, "name");
    }

    #[test]
    fn invalid_page_falls_back_to_first() {
        assert_eq!(resolve_query("page=abc").page, 1);
        assert_eq!(resolve_query("page=0").page, 1);
        assert_eq!(resolve_query("page=-4").page, 1);
        assert_eq!(resolve_query("page=7").page, 7);
    }

    #[test]
    fn order_is_normalized_or_defaulted() {
        assert_eq!(resolve_query("order=asc").order, SortOrder::Asc);
        assert_eq!(resolve_query("order=sideways").order, SortOrder::Desc);
    }

    #[test]
    fn unknown_order_by_falls_back() {
        assert_eq!(resolve_query("orderBy=nonexistent_field").order_by, "createdAt");
        assert_eq!(resolve_query("orderBy=price").order_by, "price");
    }

    #[test]
    fn unknown_filter_by_uses_entity_default() {
        assert_eq!(resolve_query("filterBy=password").filter_by, "name");
        assert_eq!(resolve_query("filterBy=price").filter_by, "price");
    }

    #[test]
    fn empty_filter_means_no_filtering() {
        assert_eq!(resolve_query("filter=").filter, None);
        assert_eq!(resolve_query("filter=a").filter.as_deref(), Some("a"));
    }

    #[test]
    fn page_size_prefers_count_and_is_capped() {
        assert_eq!(resolve_query("count=10").page_size, 10);
        assert_eq!(resolve_query("pageSize=7").page_size, 7);
        assert_eq!(resolve_query("count=3&pageSize=7").page_size, 3);
        assert_eq!(resolve_query("count=0").page_size, 5);
        assert_eq!(resolve_query("count=5000").page_size, 100);
    }

    #[test]
    fn default_order_by_missing_on_entity_uses_primary_key() {
        let defaults = PaginationDefaults {
            order_by: "email".into(),
            ..PaginationDefaults::default()
        };
        let request = resolve(&QueryParams::new(), &PRODUCTS, &defaults);
        assert_eq!(request.order_by, "id");
    }
}
