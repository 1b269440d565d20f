//! Deterministic demo data: three clients, ten users for each of the first
//! two, and fifty products.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::auth::hash_password;
use crate::database::{ProductRepository, UserRepository};
use crate::models::user::{ROLE_ADMIN, ROLE_CLIENT};
use crate::models::{NewProduct, NewUser};

pub const FIXTURE_PASSWORD: &str = "bilemo";
pub const USERS_PER_CLIENT: usize = 10;
pub const PRODUCT_COUNT: usize = 50;

const BRANDS: [&str; 5] = ["Samsung Galaxy", "Apple iPhone", "Google Pixel", "Nokia", "Xiaomi Redmi"];

#[derive(Debug, Clone, Copy)]
pub struct SeedReport {
    pub clients: usize,
    pub users: usize,
    pub products: usize,
}

pub async fn seed(products: &dyn ProductRepository, users: &dyn UserRepository) -> Result<SeedReport> {
    let epoch = Utc
        .with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
        .single()
        .context("invalid fixture epoch")?;
    // one hash for every account keeps seeding fast
    let password_hash = hash_password(FIXTURE_PASSWORD).context("hashing fixture password")?;

    let clients = [
        ("magali@bilemo.fr", vec![ROLE_CLIENT.to_string()], true),
        ("client@bilemo.fr", vec![ROLE_CLIENT.to_string()], true),
        ("admin@bilemo.fr", vec![ROLE_ADMIN.to_string(), ROLE_CLIENT.to_string()], false),
    ];

    let mut report = SeedReport { clients: 0, users: 0, products: 0 };
    for (n, (email, roles, has_users)) in clients.into_iter().enumerate() {
        let client = users
            .insert(NewUser {
                email: email.to_string(),
                password_hash: password_hash.clone(),
                roles,
                client_id: None,
                created_at: epoch - Duration::days(60 - n as i64 * 10),
            })
            .await
            .with_context(|| format!("inserting client {}", email))?;
        report.clients += 1;

        if !has_users {
            continue;
        }
        let local = email.split('@').next().unwrap_or("client");
        for i in 1..=USERS_PER_CLIENT {
            users
                .insert(NewUser {
                    email: format!("{}.user{}@bilemo.fr", local, i),
                    password_hash: password_hash.clone(),
                    roles: Vec::new(),
                    client_id: Some(client.id),
                    created_at: at(epoch, (n * USERS_PER_CLIENT + i) as i64),
                })
                .await
                .with_context(|| format!("inserting user {} of {}", i, email))?;
            report.users += 1;
        }
    }

    for i in 0..PRODUCT_COUNT {
        let created_at = at(epoch, i as i64);
        products
            .insert(NewProduct {
                name: format!("{} {}", BRANDS[i % BRANDS.len()], 10 + i),
                description: format!("{} smartphone, generation {}", BRANDS[i % BRANDS.len()], 10 + i),
                price: 199.0 + ((i * 37) % 900) as f64 + 0.99,
                created_at,
                updated_at: created_at,
            })
            .await
            .with_context(|| format!("inserting product {}", i + 1))?;
        report.products += 1;
    }

    tracing::info!(
        "Seeded {} clients, {} users and {} products",
        report.clients,
        report.users,
        report.products
    );
    Ok(report)
}

fn at(epoch: DateTime<Utc>, step: i64) -> DateTime<Utc> {
    epoch + Duration::hours(step)
}
