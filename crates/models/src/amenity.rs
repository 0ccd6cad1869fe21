use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::base::{BaseModel, EntityKind};
use crate::entity::{self, Entity};
use crate::errors::ModelError;

/// A facility places can offer (wifi, pool, ...). Linked to places many-to-many.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amenity {
    #[serde(flatten)]
    pub base: BaseModel,
    pub name: String,
}

impl Entity for Amenity {
    const KIND: EntityKind = EntityKind::Amenity;
    const FIELDS: &'static [&'static str] = &["name"];
    const REQUIRED: &'static [&'static str] = &["name"];

    fn blank(base: BaseModel) -> Self {
        Self { base, name: String::new() }
    }

    fn assign(&mut self, field: &str, value: &Value) -> Result<(), ModelError> {
        match field {
            "name" => self.name = entity::string(field, value)?,
            _ => return Err(ModelError::UnknownField(field.to_string())),
        }
        Ok(())
    }

    entity_accessors!(Amenity);
}
