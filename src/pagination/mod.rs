pub mod collection;
pub mod error;
pub mod factory;
pub mod links;
pub mod paginator;
pub mod params;
pub mod resolver;
pub mod types;

pub use collection::Page;
pub use error::PaginationError;
pub use factory::PaginationFactory;
pub use links::{build_links, LinkSet, RouteTable, UrlGenerator};
pub use paginator::{paginate, total_pages, PageSlice, QuerySource};
pub use params::QueryParams;
pub use resolver::resolve;
pub use types::*;
