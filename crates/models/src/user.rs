use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::base::{BaseModel, EntityKind};
use crate::entity::{self, Entity};
use crate::errors::ModelError;

/// Attributes of a user that never leave the store.
pub const SECRET_FIELDS: &[&str] = &["password"];

/// An account owning places and authoring reviews.
///
/// `password` always holds an argon2 PHC string; plain text is hashed on assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(flatten)]
    pub base: BaseModel,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    if !email.contains('@') {
        return Err(ModelError::Validation("invalid email".into()));
    }
    Ok(())
}

fn hash_password(plain: &str) -> Result<String, ModelError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ModelError::Hash(e.to_string()))
}

impl User {
    pub fn set_password(&mut self, plain: &str) -> Result<(), ModelError> {
        self.password = hash_password(plain)?;
        Ok(())
    }

    pub fn verify_password(&self, candidate: &str) -> bool {
        match PasswordHash::new(&self.password) {
            Ok(parsed) => Argon2::default().verify_password(candidate.as_bytes(), &parsed).is_ok(),
            Err(_) => false,
        }
    }
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;
    const FIELDS: &'static [&'static str] = &["email", "password", "first_name", "last_name"];
    const REQUIRED: &'static [&'static str] = &["email", "password"];
    const IMMUTABLE: &'static [&'static str] = &["email"];

    fn blank(base: BaseModel) -> Self {
        Self { base, email: String::new(), password: String::new(), first_name: None, last_name: None }
    }

    fn assign(&mut self, field: &str, value: &Value) -> Result<(), ModelError> {
        match field {
            "email" => {
                let email = entity::string(field, value)?;
                validate_email(&email)?;
                self.email = email;
            }
            "password" => {
                let plain = entity::string(field, value)?;
                self.set_password(&plain)?;
            }
            "first_name" => self.first_name = entity::opt_string(field, value)?,
            "last_name" => self.last_name = entity::opt_string(field, value)?,
            _ => return Err(ModelError::UnknownField(field.to_string())),
        }
        Ok(())
    }

    entity_accessors!(User);
}
