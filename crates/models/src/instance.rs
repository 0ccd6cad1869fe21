use serde_json::{Map, Value};

use crate::amenity::Amenity;
use crate::base::{object_key, BaseModel, EntityKind, CLASS_FIELD};
use crate::city::City;
use crate::entity::{Entity, UnknownFields};
use crate::errors::ModelError;
use crate::place::Place;
use crate::review::Review;
use crate::state::State;
use crate::user::{User, SECRET_FIELDS};

/// One stored record of any type.
#[derive(Debug, Clone, PartialEq)]
pub enum Instance {
    Amenity(Amenity),
    City(City),
    Place(Place),
    Review(Review),
    State(State),
    User(User),
}

macro_rules! dispatch {
    ($value:expr, $inner:ident => $body:expr) => {
        match $value {
            Instance::Amenity($inner) => $body,
            Instance::City($inner) => $body,
            Instance::Place($inner) => $body,
            Instance::Review($inner) => $body,
            Instance::State($inner) => $body,
            Instance::User($inner) => $body,
        }
    };
}

macro_rules! impl_from_entity {
    ($($variant:ident),*) => {
        $(impl From<$variant> for Instance {
            fn from(value: $variant) -> Self {
                Instance::$variant(value)
            }
        })*
    };
}

impl_from_entity!(Amenity, City, Place, Review, State, User);

fn to_map<T: serde::Serialize>(value: &T) -> Result<Map<String, Value>, ModelError> {
    match serde_json::to_value(value).map_err(|e| ModelError::Decode(e.to_string()))? {
        Value::Object(map) => Ok(map),
        other => Err(ModelError::Decode(format!("expected an object, got {other}"))),
    }
}

fn decode<E: Entity + serde::de::DeserializeOwned>(value: Value) -> Result<Instance, ModelError> {
    serde_json::from_value::<E>(value)
        .map(Into::into)
        .map_err(|e| ModelError::Decode(format!("{}: {e}", E::KIND)))
}

impl Instance {
    pub fn kind(&self) -> EntityKind {
        match self {
            Instance::Amenity(_) => EntityKind::Amenity,
            Instance::City(_) => EntityKind::City,
            Instance::Place(_) => EntityKind::Place,
            Instance::Review(_) => EntityKind::Review,
            Instance::State(_) => EntityKind::State,
            Instance::User(_) => EntityKind::User,
        }
    }

    pub fn base(&self) -> &BaseModel {
        dispatch!(self, e => e.base())
    }

    pub fn base_mut(&mut self) -> &mut BaseModel {
        dispatch!(self, e => e.base_mut())
    }

    pub fn id(&self) -> &str {
        &self.base().id
    }

    /// Store key `"<Type>.<id>"`.
    pub fn key(&self) -> String {
        object_key(self.kind(), self.id())
    }

    pub fn touch(&mut self) {
        self.base_mut().touch();
    }

    pub fn downcast<E: Entity>(&self) -> Option<&E> {
        E::from_instance(self)
    }

    pub fn downcast_mut<E: Entity>(&mut self) -> Option<&mut E> {
        E::from_instance_mut(self)
    }

    /// Construct a record of `kind` from a payload; see [`Entity::construct`].
    pub fn construct(
        kind: EntityKind,
        base: Option<BaseModel>,
        attrs: &Map<String, Value>,
        policy: UnknownFields,
    ) -> Result<Instance, ModelError> {
        Ok(match kind {
            EntityKind::Amenity => Amenity::construct(base, attrs, policy)?.into(),
            EntityKind::City => City::construct(base, attrs, policy)?.into(),
            EntityKind::Place => Place::construct(base, attrs, policy)?.into(),
            EntityKind::Review => Review::construct(base, attrs, policy)?.into(),
            EntityKind::State => State::construct(base, attrs, policy)?.into(),
            EntityKind::User => User::construct(base, attrs, policy)?.into(),
        })
    }

    /// Apply a partial payload; see [`Entity::update`].
    pub fn update(
        &mut self,
        attrs: &Map<String, Value>,
        policy: UnknownFields,
    ) -> Result<Vec<String>, ModelError> {
        dispatch!(self, e => e.update(attrs, policy))
    }

    /// Full persisted form, `__class__` included.
    pub fn to_record(&self) -> Result<Map<String, Value>, ModelError> {
        let mut map = dispatch!(self, e => to_map(e))?;
        map.insert(CLASS_FIELD.to_string(), Value::String(self.kind().as_str().to_string()));
        Ok(map)
    }

    /// Transport form: the record without secret attributes.
    pub fn to_dict(&self) -> Result<Map<String, Value>, ModelError> {
        let mut map = self.to_record()?;
        if self.kind() == EntityKind::User {
            for field in SECRET_FIELDS {
                map.remove(*field);
            }
        }
        Ok(map)
    }

    /// Rebuild a record written by [`Instance::to_record`].
    ///
    /// The type comes from the caller (the store key); a conflicting
    /// `__class__` inside the record is an error.
    pub fn from_record(kind: EntityKind, value: Value) -> Result<Instance, ModelError> {
        if let Some(class) = value.get(CLASS_FIELD).and_then(Value::as_str) {
            if class != kind.as_str() {
                return Err(ModelError::Decode(format!(
                    "record class {class:?} does not match key type {kind}"
                )));
            }
        }
        match kind {
            EntityKind::Amenity => decode::<Amenity>(value),
            EntityKind::City => decode::<City>(value),
            EntityKind::Place => decode::<Place>(value),
            EntityKind::Review => decode::<Review>(value),
            EntityKind::State => decode::<State>(value),
            EntityKind::User => decode::<User>(value),
        }
    }
}
