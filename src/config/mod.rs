use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

use crate::pagination::{PaginationDefaults, SortOrder};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub pagination: PaginationConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub items_per_page: u64,
    /// Upper bound applied to a client supplied `count`/`pageSize`
    pub max_items_per_page: u64,
    pub items_order: SortOrder,
    pub items_order_by: String,
    pub debug_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// No URL means the in-memory store is used
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub cors_origins: Vec<String>,
}

impl PaginationConfig {
    pub fn defaults(&self) -> PaginationDefaults {
        PaginationDefaults {
            items_per_page: self.items_per_page,
            max_items_per_page: self.max_items_per_page,
            order: self.items_order,
            order_by: self.items_order_by.clone(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Pagination overrides
        if let Ok(v) = env::var("PAGINATION_ITEMS_PER_PAGE") {
            self.pagination.items_per_page = v
                .parse()
                .ok()
                .filter(|n| *n > 0)
                .unwrap_or(self.pagination.items_per_page);
        }
        if let Ok(v) = env::var("PAGINATION_MAX_ITEMS_PER_PAGE") {
            self.pagination.max_items_per_page = v
                .parse()
                .ok()
                .filter(|n| *n > 0)
                .unwrap_or(self.pagination.max_items_per_page);
        }
        if let Ok(v) = env::var("PAGINATION_ITEMS_ORDER") {
            self.pagination.items_order = SortOrder::parse(&v).unwrap_or(self.pagination.items_order);
        }
        if let Ok(v) = env::var("PAGINATION_ITEMS_ORDERBY") {
            if !v.trim().is_empty() {
                self.pagination.items_order_by = v.trim().to_string();
            }
        }
        if let Ok(v) = env::var("PAGINATION_DEBUG_LOGGING") {
            self.pagination.debug_logging = v.parse().unwrap_or(self.pagination.debug_logging);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            if !v.is_empty() {
                self.security.jwt_secret = v;
            }
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            pagination: PaginationConfig {
                items_per_page: 5,
                max_items_per_page: 100,
                items_order: SortOrder::Desc,
                items_order_by: "createdAt".to_string(),
                debug_logging: true,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            security: SecurityConfig {
                jwt_secret: "bilemo-development-secret".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                cors_origins: vec!["http://localhost:3000".to_string()],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            pagination: PaginationConfig {
                items_per_page: 5,
                max_items_per_page: 100,
                items_order: SortOrder::Desc,
                items_order_by: "createdAt".to_string(),
                debug_logging: false,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
                run_migrations: true,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                cors_origins: vec!["https://staging.bilemo.fr".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            pagination: PaginationConfig {
                items_per_page: 5,
                max_items_per_page: 50,
                items_order: SortOrder::Desc,
                items_order_by: "createdAt".to_string(),
                debug_logging: false,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                run_migrations: false,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 1,
                cors_origins: vec!["https://api.bilemo.fr".to_string()],
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}
