use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;

/// Attributes owned by the base model; never assignable from a payload.
pub const BASE_FIELDS: [&str; 4] = ["id", "created_at", "updated_at", "__class__"];

/// Key under which the type name is written into serialized records.
pub const CLASS_FIELD: &str = "__class__";

/// The six record types, in the order `/stats` reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Amenity,
    City,
    Place,
    Review,
    State,
    User,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Amenity,
        EntityKind::City,
        EntityKind::Place,
        EntityKind::Review,
        EntityKind::State,
        EntityKind::User,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Amenity => "Amenity",
            EntityKind::City => "City",
            EntityKind::Place => "Place",
            EntityKind::Review => "Review",
            EntityKind::State => "State",
            EntityKind::User => "User",
        }
    }

    /// Plural collection name used by the HTTP layer.
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Amenity => "amenities",
            EntityKind::City => "cities",
            EntityKind::Place => "places",
            EntityKind::Review => "reviews",
            EntityKind::State => "states",
            EntityKind::User => "users",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ModelError::Decode(format!("unknown class {s:?}")))
    }
}

/// Store key `"<Type>.<id>"`.
pub fn object_key(kind: EntityKind, id: &str) -> String {
    format!("{}.{}", kind.as_str(), id)
}

/// Split a store key back into its type and id.
pub fn parse_object_key(key: &str) -> Result<(EntityKind, &str), ModelError> {
    let (kind, id) = key
        .split_once('.')
        .ok_or_else(|| ModelError::Decode(format!("malformed key {key:?}")))?;
    if id.is_empty() {
        return Err(ModelError::Decode(format!("malformed key {key:?}")));
    }
    Ok((kind.parse()?, id))
}

/// Identity and timestamps shared by every record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseModel {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BaseModel {
    /// Fresh identity: random UUID v4, both timestamps set to now.
    pub fn new() -> Self {
        let now = Utc::now();
        Self { id: Uuid::new_v4().to_string(), created_at: now, updated_at: now }
    }

    /// Refresh `updated_at`.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.created_at);
    }
}

impl Default for BaseModel {
    fn default() -> Self {
        Self::new()
    }
}
