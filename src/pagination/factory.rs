use std::sync::Arc;

use super::collection::Page;
use super::error::PaginationError;
use super::links::{build_links, UrlGenerator};
use super::paginator::{paginate, QuerySource};
use super::params::QueryParams;
use super::resolver::resolve;
use super::types::{EntityMetadata, PaginationDefaults};

/// Shared entry point for every list endpoint:
/// resolve parameters, read one page, attach links.
#[derive(Clone)]
pub struct PaginationFactory {
    defaults: PaginationDefaults,
    urls: Arc<dyn UrlGenerator>,
    debug_logging: bool,
}

impl PaginationFactory {
    pub fn new(defaults: PaginationDefaults, urls: Arc<dyn UrlGenerator>) -> Self {
        Self {
            defaults,
            urls,
            debug_logging: false,
        }
    }

    pub fn with_debug_logging(mut self, enabled: bool) -> Self {
        self.debug_logging = enabled;
        self
    }

    pub async fn create_collection<S>(
        &self,
        source: &S,
        raw_query: Option<&str>,
        route: &str,
        metadata: &EntityMetadata,
    ) -> Result<Page<S::Item>, PaginationError>
    where
        S: QuerySource + ?Sized,
    {
        let params = QueryParams::parse(raw_query);
        let request = resolve(&params, metadata, &self.defaults);
        if self.debug_logging {
            tracing::debug!("Resolved {} list request: {:?}", metadata.name, request);
        }

        let slice = paginate(source, &request).await?;
        let links = build_links(
            self.urls.as_ref(),
            route,
            &params,
            slice.current_page,
            slice.total_pages,
        )?;

        Ok(Page::assemble(slice.items, slice.total, &request, links))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::links::RouteTable;
    use crate::pagination::types::{Field, FieldValue, PageRequest};
    use crate::database::DatabaseError;
    use async_trait::async_trait;

    const FIELDS: &[Field] = &[Field::new("id", "id"), Field::new("name", "name")];
    const THINGS: EntityMetadata = EntityMetadata {
        name: "thing",
        table: "things",
        id_field: Field::new("id", "id"),
        fields: FIELDS,
        default_filter_by: "name",
    };

    struct Names(Vec<&'static str>);

    impl Names {
        fn matching(&self, request: &PageRequest) -> Vec<&'static str> {
            let mut rows: Vec<_> = self
                .0
                .iter()
                .copied()
                .filter(|n| request.filter.as_deref().map_or(true, |f| FieldValue::from(*n).contains(f)))
                .collect();
            rows.sort();
            rows
        }
    }

    #[async_trait]
    impl QuerySource for Names {
        type Item = &'static str;

        async fn count(&self, request: &PageRequest) -> Result<u64, DatabaseError> {
            Ok(self.matching(request).len() as u64)
        }

        async fn slice(&self, offset: u64, limit: u64, request: &PageRequest) -> Result<Vec<&'static str>, DatabaseError> {
            Ok(self
                .matching(request)
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect())
        }
    }

    fn factory() -> PaginationFactory {
        let routes = RouteTable::new().route("things", "/api/things");
        PaginationFactory::new(PaginationDefaults::default(), Arc::new(routes))
    }

    #[tokio::test]
    async fn filtered_collection_keeps_context_in_links() {
        let source = Names(vec!["alpha", "beta", "gamma", "delta", "omega", "zeta", "Alpine"]);
        let page = factory()
            .create_collection(&source, Some("order=asc&filter=a&count=2"), "things", &THINGS)
            .await
            .unwrap();

        assert_eq!(page.total, 6);
        assert_eq!(page.count, 2);
        assert_eq!(page.links.last, "/api/things?order=asc&filter=a&count=2&page=3");
        assert_eq!(page.links.next.as_deref(), Some("/api/things?order=asc&filter=a&count=2&page=2"));
        assert!(page.links.prev.is_none());
        assert_eq!(page.filter.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn empty_collection_links_to_page_one() {
        let page = factory()
            .create_collection(&Names(vec![]), Some("page=3"), "things", &THINGS)
            .await
            .unwrap();

        assert_eq!(page.count, 0);
        assert_eq!(page.total, 0);
        assert_eq!(page.links.self_link, "/api/things?page=1");
        assert_eq!(page.links.last, "/api/things?page=1");
        assert!(page.links.next.is_none() && page.links.prev.is_none());
    }

    #[tokio::test]
    async fn unknown_route_is_an_error() {
        let err = factory()
            .create_collection(&Names(vec!["a"]), None, "missing", &THINGS)
            .await
            .unwrap_err();
        assert!(matches!(err, PaginationError::UnknownRoute(_)));
    }
}
