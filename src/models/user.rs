use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::entity::Entity;
use crate::pagination::{EntityMetadata, Field, FieldValue};

pub const USER_LIST_ROUTE: &str = "api_users_list";
pub const USER_SHOW_ROUTE: &str = "api_users_show";

pub const ROLE_USER: &str = "ROLE_USER";
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";
/// Accounts allowed to own and create users
pub const ROLE_CLIENT: &str = "ROLE_CLIENT";

const DATETIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";
const PASSWORD_MIN_LENGTH: usize = 6;
const PASSWORD_MAX_LENGTH: usize = 4096;

// password and roles are deliberately absent: they must never be sortable or filterable
const USER_FIELDS: &[Field] = &[
    Field::new("id", "id"),
    Field::new("email", "email"),
    Field::new("createdAt", "created_at"),
    Field::new("updatedAt", "updated_at"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub roles: Vec<String>,
    /// Argon2 PHC string
    pub password: String,
    /// Owning client; `None` for clients themselves
    pub client_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Stored roles plus the implicit ROLE_USER, deduplicated
    pub fn roles(&self) -> Vec<String> {
        let mut roles = self.roles.clone();
        roles.push(ROLE_USER.to_string());
        roles.sort();
        roles.dedup();
        roles
    }

    /// Ownership rule: a user is managed by the client that created it
    pub fn is_owned_by(&self, client_id: i64) -> bool {
        self.client_id == Some(client_id)
    }
}

impl Entity for User {
    const METADATA: EntityMetadata = EntityMetadata {
        name: "user",
        table: "users",
        id_field: Field::new("id", "id"),
        fields: USER_FIELDS,
        default_filter_by: "email",
    };

    fn id(&self) -> i64 {
        self.id
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        let value = match field {
            "id" => self.id.into(),
            "email" => self.email.as_str().into(),
            "createdAt" => self.created_at.into(),
            "updatedAt" => self.updated_at.into(),
            _ => return None,
        };
        Some(value)
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<String>,
    pub client_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Public representation of a user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: i64,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            created_at: user.created_at.format(DATETIME_FORMAT).to_string(),
            updated_at: user.updated_at.format(DATETIME_FORMAT).to_string(),
        }
    }
}

/// Write payload for create and update; `password` is the plain password.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub type FieldErrors = BTreeMap<String, Vec<String>>;

impl UserInput {
    /// Validate for creation (`partial = false`) or update (`partial = true`,
    /// absent fields are left untouched).
    pub fn validate(&self, partial: bool) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        match self.email.as_deref().map(str::trim) {
            None if partial => {}
            None | Some("") => push(&mut errors, "email", "This value should not be blank."),
            Some(email) if !is_valid_email(email) => {
                push(&mut errors, "email", "This value is not a valid email address.")
            }
            Some(_) => {}
        }

        match self.password.as_deref() {
            None if partial => {}
            None | Some("") => push(&mut errors, "password", "This value should not be blank."),
            Some(p) if p.chars().count() < PASSWORD_MIN_LENGTH => push(
                &mut errors,
                "password",
                &format!(
                    "This value is too short. It should have {} characters or more.",
                    PASSWORD_MIN_LENGTH
                ),
            ),
            Some(p) if p.chars().count() > PASSWORD_MAX_LENGTH => push(
                &mut errors,
                "password",
                &format!(
                    "This value is too long. It should have {} characters or less.",
                    PASSWORD_MAX_LENGTH
                ),
            ),
            Some(_) => {}
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn push(errors: &mut FieldErrors, field: &str, message: &str) {
    errors.entry(field.to_string()).or_default().push(message.to_string());
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !email.chars().any(char::is_whitespace)
        && !domain.contains('@')
}
