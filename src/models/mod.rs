pub mod entity;
pub mod product;
pub mod user;

pub use entity::Entity;
pub use product::{NewProduct, Product, ProductView, PRODUCT_LIST_ROUTE, PRODUCT_SHOW_ROUTE};
pub use user::{NewUser, User, UserInput, UserView, USER_LIST_ROUTE, USER_SHOW_ROUTE};
