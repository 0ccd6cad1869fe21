use serde_json::{json, Map, Value};

use crate::{EntityKind, Instance, ModelError, UnknownFields};

fn construct(kind: EntityKind, value: Value) -> Instance {
    let Value::Object(map) = value else { panic!("test payload must be an object") };
    Instance::construct(kind, None, &map, UnknownFields::Ignore).expect("construct")
}

/// to_dict carries identity, timestamps and class name
#[test]
fn dict_contains_base_fields_and_class() {
    let city = construct(EntityKind::City, json!({"name": "SF", "state_id": "s1"}));
    let dict = city.to_dict().expect("dict");
    assert_eq!(dict["__class__"], "City");
    assert_eq!(dict["id"], city.id());
    assert_eq!(dict["state_id"], "s1");
    assert!(dict["created_at"].is_string());
    assert!(dict["updated_at"].is_string());
}

/// Records round-trip to equal instances
#[test]
fn record_round_trip_is_lossless() {
    let place = construct(
        EntityKind::Place,
        json!({"name": "Loft", "city_id": "c1", "user_id": "u1", "latitude": 1.5, "max_guest": 4}),
    );
    let record = Value::Object(place.to_record().expect("record"));
    let back = Instance::from_record(EntityKind::Place, record).expect("decode");
    assert_eq!(back, place);
}

/// The password hash is persisted but never transported
#[test]
fn user_password_hidden_from_dict() {
    let user = construct(EntityKind::User, json!({"email": "a@b.c", "password": "secret"}));
    let record = user.to_record().expect("record");
    assert!(record.contains_key("password"));
    let dict = user.to_dict().expect("dict");
    assert!(!dict.contains_key("password"));
    assert_eq!(dict["email"], "a@b.c");
}

/// A record whose class disagrees with its key is refused
#[test]
fn class_mismatch_is_a_decode_error() {
    let state = construct(EntityKind::State, json!({"name": "Ohio"}));
    let record = Value::Object(state.to_record().expect("record"));
    let err = Instance::from_record(EntityKind::City, record).unwrap_err();
    assert!(matches!(err, ModelError::Decode(_)));

    let garbage = Value::Object(Map::new());
    assert!(Instance::from_record(EntityKind::State, garbage).is_err());
}
