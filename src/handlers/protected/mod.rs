// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route here sits behind `jwt_auth_middleware`, which places an
// `AuthUser` in the request extensions.
pub mod products;
pub mod users;

pub use products::{list_products, show_product};
pub use users::{create_user, delete_user, list_users, patch_user, put_user, show_user};
