use thiserror::Error;

use crate::database::DatabaseError;

#[derive(Error, Debug)]
pub enum PaginationError {
    #[error("Page {page} does not exist, last page is {total_pages}")]
    PageNotFound { page: u64, total_pages: u64 },

    #[error("Unknown route: {0}")]
    UnknownRoute(String),

    #[error("Missing parameter '{parameter}' for route {route}")]
    MissingRouteParameter { route: String, parameter: String },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}
