// handlers/public/mod.rs - Public handlers (no authentication)
pub mod health;
pub mod token;

pub use health::health;
pub use token::create_token;
