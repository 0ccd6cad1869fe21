//! Entity model: the six record types, their shared base, and the
//! allowlist-driven construction/update/serialization every handler uses.

/// Base accessors and `Instance` downcasts shared by every entity impl.
macro_rules! entity_accessors {
    ($variant:ident) => {
        fn base(&self) -> &BaseModel {
            &self.base
        }

        fn base_mut(&mut self) -> &mut BaseModel {
            &mut self.base
        }

        fn from_instance(instance: &$crate::instance::Instance) -> Option<&Self> {
            match instance {
                $crate::instance::Instance::$variant(e) => Some(e),
                _ => None,
            }
        }

        fn from_instance_mut(instance: &mut $crate::instance::Instance) -> Option<&mut Self> {
            match instance {
                $crate::instance::Instance::$variant(e) => Some(e),
                _ => None,
            }
        }
    };
}

pub mod errors;
pub mod base;
pub mod entity;
pub mod instance;
pub mod amenity;
pub mod city;
pub mod place;
pub mod review;
pub mod state;
pub mod user;

pub use amenity::Amenity;
pub use base::{object_key, parse_object_key, BaseModel, EntityKind};
pub use city::City;
pub use entity::{Entity, UnknownFields};
pub use errors::ModelError;
pub use instance::Instance;
pub use place::Place;
pub use review::Review;
pub use state::State;
pub use user::User;

#[cfg(test)]
mod tests;
