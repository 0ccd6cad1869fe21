use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::base::{BaseModel, EntityKind};
use crate::entity::{self, Entity};
use crate::errors::ModelError;

/// A user's review of a place. Both references are fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(flatten)]
    pub base: BaseModel,
    pub place_id: String,
    pub user_id: String,
    pub text: String,
}

impl Entity for Review {
    const KIND: EntityKind = EntityKind::Review;
    const FIELDS: &'static [&'static str] = &["place_id", "user_id", "text"];
    const REQUIRED: &'static [&'static str] = &["user_id", "text", "place_id"];
    const IMMUTABLE: &'static [&'static str] = &["place_id", "user_id"];

    fn blank(base: BaseModel) -> Self {
        Self { base, place_id: String::new(), user_id: String::new(), text: String::new() }
    }

    fn assign(&mut self, field: &str, value: &Value) -> Result<(), ModelError> {
        match field {
            "place_id" => self.place_id = entity::string(field, value)?,
            "user_id" => self.user_id = entity::string(field, value)?,
            "text" => self.text = entity::string(field, value)?,
            _ => return Err(ModelError::UnknownField(field.to_string())),
        }
        Ok(())
    }

    entity_accessors!(Review);
}
