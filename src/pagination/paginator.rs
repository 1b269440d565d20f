use async_trait::async_trait;

use super::error::PaginationError;
use super::types::PageRequest;
use crate::database::DatabaseError;

/// A filterable, sortable, countable collection of records.
///
/// `count` and `slice` both apply the request's filter; `slice` also applies
/// its ordering, breaking ties on the primary key so page boundaries are stable.
#[async_trait]
pub trait QuerySource: Send + Sync {
    type Item: Send;

    async fn count(&self, request: &PageRequest) -> Result<u64, DatabaseError>;

    async fn slice(
        &self,
        offset: u64,
        limit: u64,
        request: &PageRequest,
    ) -> Result<Vec<Self::Item>, DatabaseError>;
}

/// One bounded page read from a `QuerySource`.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice<T> {
    pub items: Vec<T>,
    pub total: u64,
    /// Page actually served; 1 for an empty result set
    pub current_page: u64,
    pub total_pages: u64,
}

/// `max(1, ceil(total / page_size))`
pub fn total_pages(total: u64, page_size: u64) -> u64 {
    let page_size = page_size.max(1);
    total.div_ceil(page_size).max(1)
}

/// Count the matching rows, bounds-check the requested page, then fetch it.
pub async fn paginate<S>(source: &S, request: &PageRequest) -> Result<PageSlice<S::Item>, PaginationError>
where
    S: QuerySource + ?Sized,
{
    let total = source.count(request).await?;
    let total_pages = total_pages(total, request.page_size);

    if total == 0 {
        return Ok(PageSlice {
            items: Vec::new(),
            total,
            current_page: 1,
            total_pages,
        });
    }

    if request.page > total_pages {
        return Err(PaginationError::PageNotFound {
            page: request.page,
            total_pages,
        });
    }

    let items = source
        .slice(request.offset(), request.page_size, request)
        .await?;

    tracing::debug!(
        "Paginated page {}/{} ({} of {} rows)",
        request.page,
        total_pages,
        items.len(),
        total
    );

    Ok(PageSlice {
        items,
        total,
        current_page: request.page,
        total_pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::types::SortOrder;

    /// Numbers 1..=total, filter and ordering ignored
    struct Numbers {
        total: u64,
    }

    #[async_trait]
    impl QuerySource for Numbers {
        type Item = u64;

        async fn count(&self, _request: &PageRequest) -> Result<u64, DatabaseError> {
            Ok(self.total)
        }

        async fn slice(&self, offset: u64, limit: u64, _request: &PageRequest) -> Result<Vec<u64>, DatabaseError> {
            Ok((offset + 1..=self.total).take(limit as usize).collect())
        }
    }

    struct Broken;

    #[async_trait]
    impl QuerySource for Broken {
        type Item = u64;

        async fn count(&self, _request: &PageRequest) -> Result<u64, DatabaseError> {
            Err(DatabaseError::QueryError("connection reset".into()))
        }

        async fn slice(&self, _offset: u64, _limit: u64, _request: &PageRequest) -> Result<Vec<u64>, DatabaseError> {
            unreachable!("slice must not run after a failed count")
        }
    }

    fn request(page: u64, page_size: u64) -> PageRequest {
        PageRequest {
            page,
            page_size,
            order: SortOrder::Asc,
            order_by: "id".into(),
            filter: None,
            filter_by: "name".into(),
        }
    }

    #[test]
    fn total_pages_is_at_least_one() {
        assert_eq!(total_pages(0, 5), 1);
        assert_eq!(total_pages(1, 5), 1);
        assert_eq!(total_pages(5, 5), 1);
        assert_eq!(total_pages(6, 5), 2);
        assert_eq!(total_pages(40, 5), 8);
        assert_eq!(total_pages(10, 0), 10);
    }

    #[tokio::test]
    async fn count_matches_remaining_rows_on_every_page() {
        for (total, page_size) in [(40u64, 5u64), (41, 5), (3, 10), (21, 5)] {
            let source = Numbers { total };
            for page in 1..=total_pages(total, page_size) {
                let slice = paginate(&source, &request(page, page_size)).await.unwrap();
                let expected = page_size.min(total - (page - 1) * page_size);
                assert_eq!(slice.items.len() as u64, expected, "total={} page={}", total, page);
                assert_eq!(slice.total, total);
            }
        }
    }

    #[tokio::test]
    async fn empty_source_is_page_one_of_one() {
        let slice = paginate(&Numbers { total: 0 }, &request(4, 5)).await.unwrap();
        assert!(slice.items.is_empty());
        assert_eq!(slice.current_page, 1);
        assert_eq!(slice.total_pages, 1);
    }

    #[tokio::test]
    async fn page_past_the_end_is_not_found() {
        let err = paginate(&Numbers { total: 10 }, &request(100, 5)).await.unwrap_err();
        assert!(matches!(
            err,
            PaginationError::PageNotFound { page: 100, total_pages: 2 }
        ));
    }

    #[tokio::test]
    async fn source_errors_propagate() {
        let err = paginate(&Broken, &request(1, 5)).await.unwrap_err();
        assert!(matches!(err, PaginationError::Database(_)));
    }
}
