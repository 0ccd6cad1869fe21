use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::base::{BaseModel, EntityKind};
use crate::entity::{self, Entity};
use crate::errors::ModelError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    #[serde(flatten)]
    pub base: BaseModel,
    pub state_id: String,
    pub name: String,
}

impl Entity for City {
    const KIND: EntityKind = EntityKind::City;
    const FIELDS: &'static [&'static str] = &["name", "state_id"];
    const REQUIRED: &'static [&'static str] = &["name", "state_id"];
    const IMMUTABLE: &'static [&'static str] = &["state_id"];

    fn blank(base: BaseModel) -> Self {
        Self { base, state_id: String::new(), name: String::new() }
    }

    fn assign(&mut self, field: &str, value: &Value) -> Result<(), ModelError> {
        match field {
            "name" => self.name = entity::string(field, value)?,
            "state_id" => self.state_id = entity::string(field, value)?,
            _ => return Err(ModelError::UnknownField(field.to_string())),
        }
        Ok(())
    }

    entity_accessors!(City);
}
