use serde_json::{json, Map, Value};

use crate::{
    BaseModel, City, Entity, EntityKind, Instance, ModelError, Place, Review, State, UnknownFields, User,
};

fn attrs(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("test payload must be an object"),
    }
}

/// Fresh construction generates identity and applies attributes
#[test]
fn construct_generates_id_and_timestamps() {
    let state = State::construct(None, &attrs(json!({"name": "California"})), UnknownFields::Ignore)
        .expect("construct state");
    assert_eq!(state.name, "California");
    assert!(!state.id().is_empty());
    assert_eq!(state.base.created_at, state.base.updated_at);

    let other = State::construct(None, &attrs(json!({"name": "Nevada"})), UnknownFields::Ignore)
        .expect("construct state");
    assert_ne!(state.id(), other.id());
}

/// Reconstruction keeps the supplied identity
#[test]
fn construct_with_existing_base_keeps_identity() {
    let base = BaseModel::new();
    let city = City::construct(
        Some(base.clone()),
        &attrs(json!({"name": "SF", "state_id": "s1"})),
        UnknownFields::Ignore,
    )
    .expect("construct city");
    assert_eq!(city.base, base);
}

/// Base fields in a payload never override the generated identity
#[test]
fn payload_cannot_set_id_or_timestamps() {
    let state = State::construct(
        None,
        &attrs(json!({"name": "Texas", "id": "forged", "created_at": "2000-01-01T00:00:00Z", "__class__": "User"})),
        UnknownFields::Reject,
    )
    .expect("base fields are skipped even when rejecting unknowns");
    assert_ne!(state.id(), "forged");
}

/// Missing required attributes are reported in handler order
#[test]
fn missing_required_fields() {
    let err = City::construct(None, &attrs(json!({"state_id": "s1"})), UnknownFields::Ignore).unwrap_err();
    assert_eq!(err, ModelError::MissingField("name"));
    assert_eq!(err.to_string(), "Missing name");

    let err = Place::construct(None, &attrs(json!({"name": "Loft", "city_id": "c1"})), UnknownFields::Ignore)
        .unwrap_err();
    assert_eq!(err.to_string(), "Missing user_id");

    let err = Review::construct(None, &attrs(json!({"user_id": "u1", "place_id": "p1"})), UnknownFields::Ignore)
        .unwrap_err();
    assert_eq!(err.to_string(), "Missing text");
}

/// Unknown attributes follow the configured policy
#[test]
fn unknown_fields_policy() {
    let payload = attrs(json!({"name": "Wifi", "colour": "blue"}));
    let ignored = Instance::construct(EntityKind::Amenity, None, &payload, UnknownFields::Ignore)
        .expect("ignored");
    let dict = ignored.to_dict().expect("dict");
    assert!(!dict.contains_key("colour"));

    let err = Instance::construct(EntityKind::Amenity, None, &payload, UnknownFields::Reject).unwrap_err();
    assert_eq!(err, ModelError::UnknownField("colour".into()));
}

/// Values are type-checked against the field
#[test]
fn wrong_types_are_rejected() {
    let err = State::construct(None, &attrs(json!({"name": 42})), UnknownFields::Ignore).unwrap_err();
    assert!(matches!(err, ModelError::Validation(_)));

    let base = attrs(json!({"name": "Loft", "city_id": "c1", "user_id": "u1"}));
    let mut place = Place::construct(None, &base, UnknownFields::Ignore).expect("place");
    assert!(place.update(&attrs(json!({"number_rooms": -1})), UnknownFields::Ignore).is_err());
    assert!(place.update(&attrs(json!({"latitude": "north"})), UnknownFields::Ignore).is_err());

    place
        .update(
            &attrs(json!({"number_rooms": 3, "latitude": 37, "longitude": -122.4, "description": null})),
            UnknownFields::Ignore,
        )
        .expect("valid update");
    assert_eq!(place.number_rooms, 3);
    assert_eq!(place.latitude, 37.0);
    assert_eq!(place.description, None);
}

/// Update skips immutable references and is all-or-nothing
#[test]
fn update_skips_immutable_fields() {
    let mut review = Review::construct(
        None,
        &attrs(json!({"user_id": "u1", "place_id": "p1", "text": "ok"})),
        UnknownFields::Ignore,
    )
    .expect("review");

    let applied = review
        .update(&attrs(json!({"user_id": "u2", "place_id": "p2", "text": "great"})), UnknownFields::Reject)
        .expect("update");
    assert_eq!(applied, vec!["text".to_string()]);
    assert_eq!(review.user_id, "u1");
    assert_eq!(review.place_id, "p1");
    assert_eq!(review.text, "great");

    let before = review.clone();
    let err = review.update(&attrs(json!({"text": 7})), UnknownFields::Ignore);
    assert!(err.is_err());
    assert_eq!(review, before);
}

/// amenity_ids is visible but not assignable
#[test]
fn place_amenity_ids_are_read_only() {
    let mut place = Place::construct(
        None,
        &attrs(json!({"name": "Loft", "city_id": "c1", "user_id": "u1", "amenity_ids": ["a1"]})),
        UnknownFields::Reject,
    )
    .expect("place");
    assert!(place.amenity_ids.is_empty());

    assert!(place.link_amenity("a1"));
    assert!(!place.link_amenity("a1"));
    assert!(place.has_amenity("a1"));
    assert!(place.unlink_amenity("a1"));
    assert!(!place.unlink_amenity("a1"));
}

/// Passwords are hashed on assignment and verifiable
#[test]
fn user_password_is_hashed() {
    let mut user = User::construct(
        None,
        &attrs(json!({"email": "bob@hbnb.io", "password": "pwd", "first_name": "Bob"})),
        UnknownFields::Ignore,
    )
    .expect("user");
    assert_ne!(user.password, "pwd");
    assert!(user.password.starts_with("$argon2"));
    assert!(user.verify_password("pwd"));
    assert!(!user.verify_password("nope"));

    // email is fixed once created
    user.update(&attrs(json!({"email": "other@hbnb.io", "last_name": "B"})), UnknownFields::Ignore)
        .expect("update");
    assert_eq!(user.email, "bob@hbnb.io");
    assert_eq!(user.last_name.as_deref(), Some("B"));

    let err = User::construct(None, &attrs(json!({"email": "nobody", "password": "x"})), UnknownFields::Ignore)
        .unwrap_err();
    assert!(matches!(err, ModelError::Validation(_)));
}

/// Typed downcasts only match their own variant
#[test]
fn downcasts() {
    let inst: Instance = State::construct(None, &attrs(json!({"name": "Utah"})), UnknownFields::Ignore)
        .expect("state")
        .into();
    assert_eq!(inst.kind(), EntityKind::State);
    assert!(inst.downcast::<State>().is_some());
    assert!(inst.downcast::<City>().is_none());
    assert_eq!(inst.key(), format!("State.{}", inst.id()));
}
