use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::base::{BaseModel, EntityKind};
use crate::entity::{self, Entity};
use crate::errors::ModelError;

/// A rentable place in a city, owned by a user.
///
/// `amenity_ids` is the place side of the place/amenity link; it is only
/// changed through the store's link operations, never from a payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    #[serde(flatten)]
    pub base: BaseModel,
    pub city_id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub number_rooms: u32,
    #[serde(default)]
    pub number_bathrooms: u32,
    #[serde(default)]
    pub max_guest: u32,
    #[serde(default)]
    pub price_by_night: u32,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub amenity_ids: Vec<String>,
}

impl Place {
    pub fn has_amenity(&self, amenity_id: &str) -> bool {
        self.amenity_ids.iter().any(|a| a == amenity_id)
    }

    /// Returns whether the link is new.
    pub fn link_amenity(&mut self, amenity_id: &str) -> bool {
        if self.has_amenity(amenity_id) {
            return false;
        }
        self.amenity_ids.push(amenity_id.to_string());
        true
    }

    /// Returns whether a link existed.
    pub fn unlink_amenity(&mut self, amenity_id: &str) -> bool {
        let before = self.amenity_ids.len();
        self.amenity_ids.retain(|a| a != amenity_id);
        self.amenity_ids.len() != before
    }
}

impl Entity for Place {
    const KIND: EntityKind = EntityKind::Place;
    const FIELDS: &'static [&'static str] = &[
        "city_id",
        "user_id",
        "name",
        "description",
        "address",
        "number_rooms",
        "number_bathrooms",
        "max_guest",
        "price_by_night",
        "latitude",
        "longitude",
    ];
    const REQUIRED: &'static [&'static str] = &["user_id", "name", "city_id"];
    const IMMUTABLE: &'static [&'static str] = &["city_id", "user_id"];
    const READ_ONLY: &'static [&'static str] = &["amenity_ids"];

    fn blank(base: BaseModel) -> Self {
        Self {
            base,
            city_id: String::new(),
            user_id: String::new(),
            name: String::new(),
            description: None,
            address: None,
            number_rooms: 0,
            number_bathrooms: 0,
            max_guest: 0,
            price_by_night: 0,
            latitude: 0.0,
            longitude: 0.0,
            amenity_ids: Vec::new(),
        }
    }

    fn assign(&mut self, field: &str, value: &Value) -> Result<(), ModelError> {
        match field {
            "city_id" => self.city_id = entity::string(field, value)?,
            "user_id" => self.user_id = entity::string(field, value)?,
            "name" => self.name = entity::string(field, value)?,
            "description" => self.description = entity::opt_string(field, value)?,
            "address" => self.address = entity::opt_string(field, value)?,
            "number_rooms" => self.number_rooms = entity::count(field, value)?,
            "number_bathrooms" => self.number_bathrooms = entity::count(field, value)?,
            "max_guest" => self.max_guest = entity::count(field, value)?,
            "price_by_night" => self.price_by_night = entity::count(field, value)?,
            "latitude" => self.latitude = entity::float(field, value)?,
            "longitude" => self.longitude = entity::float(field, value)?,
            _ => return Err(ModelError::UnknownField(field.to_string())),
        }
        Ok(())
    }

    entity_accessors!(Place);
}
