//! Typed entity contract and allowlist-driven attribute assignment.
//!
//! Every record type declares which attributes a payload may set
//! ([`Entity::FIELDS`]), which must be present on creation
//! ([`Entity::REQUIRED`]) and which are frozen once the record exists
//! ([`Entity::IMMUTABLE`]). Anything else is handled by [`UnknownFields`].

use serde_json::{Map, Value};

use crate::base::{BaseModel, EntityKind, BASE_FIELDS};
use crate::errors::ModelError;
use crate::instance::Instance;

/// Policy for payload attributes an entity does not declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownFields {
    /// Drop them silently.
    #[default]
    Ignore,
    /// Fail with [`ModelError::UnknownField`].
    Reject,
}

pub trait Entity: Clone + Into<Instance> {
    const KIND: EntityKind;
    /// Attributes a payload may assign.
    const FIELDS: &'static [&'static str];
    /// Attributes that must be present on creation, in reporting order.
    const REQUIRED: &'static [&'static str];
    /// Attributes assignable on creation only.
    const IMMUTABLE: &'static [&'static str] = &[];
    /// Attributes visible in records but never assignable from a payload.
    const READ_ONLY: &'static [&'static str] = &[];

    fn blank(base: BaseModel) -> Self;
    fn base(&self) -> &BaseModel;
    fn base_mut(&mut self) -> &mut BaseModel;
    /// Assign one allowlisted attribute, type-checking the value.
    fn assign(&mut self, field: &str, value: &Value) -> Result<(), ModelError>;
    fn from_instance(instance: &Instance) -> Option<&Self>;
    fn from_instance_mut(instance: &mut Instance) -> Option<&mut Self>;

    fn id(&self) -> &str {
        &self.base().id
    }

    /// Build a record from a payload.
    ///
    /// `base` reconstructs an existing identity; `None` generates a new one.
    fn construct(
        base: Option<BaseModel>,
        attrs: &Map<String, Value>,
        policy: UnknownFields,
    ) -> Result<Self, ModelError> {
        if let Some(missing) = Self::REQUIRED.iter().find(|f| !attrs.contains_key(**f)) {
            return Err(ModelError::MissingField(*missing));
        }
        let mut entity = Self::blank(base.unwrap_or_default());
        assign_all(&mut entity, attrs, policy, false)?;
        Ok(entity)
    }

    /// Apply a partial payload, skipping immutable attributes.
    ///
    /// All-or-nothing: on error the record is left untouched. Returns the
    /// names of the attributes that were assigned.
    fn update(
        &mut self,
        attrs: &Map<String, Value>,
        policy: UnknownFields,
    ) -> Result<Vec<String>, ModelError> {
        let mut next = self.clone();
        let applied = assign_all(&mut next, attrs, policy, true)?;
        *self = next;
        Ok(applied)
    }
}

fn assign_all<E: Entity>(
    entity: &mut E,
    attrs: &Map<String, Value>,
    policy: UnknownFields,
    updating: bool,
) -> Result<Vec<String>, ModelError> {
    let mut applied = Vec::new();
    for (field, value) in attrs {
        let field = field.as_str();
        if BASE_FIELDS.contains(&field) || E::READ_ONLY.contains(&field) {
            continue;
        }
        if updating && E::IMMUTABLE.contains(&field) {
            continue;
        }
        if !E::FIELDS.contains(&field) {
            match policy {
                UnknownFields::Ignore => continue,
                UnknownFields::Reject => return Err(ModelError::UnknownField(field.to_string())),
            }
        }
        entity.assign(field, value)?;
        applied.push(field.to_string());
    }
    Ok(applied)
}

pub(crate) fn string(field: &str, value: &Value) -> Result<String, ModelError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ModelError::wrong_type(field, "a string"))
}

pub(crate) fn opt_string(field: &str, value: &Value) -> Result<Option<String>, ModelError> {
    match value {
        Value::Null => Ok(None),
        other => string(field, other).map(Some),
    }
}

pub(crate) fn count(field: &str, value: &Value) -> Result<u32, ModelError> {
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| ModelError::wrong_type(field, "a non-negative integer"))
}

pub(crate) fn float(field: &str, value: &Value) -> Result<f64, ModelError> {
    value
        .as_f64()
        .filter(|f| f.is_finite())
        .ok_or_else(|| ModelError::wrong_type(field, "a number"))
}
