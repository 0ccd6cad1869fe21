use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

use models::{
    object_key, parse_object_key, Amenity, City, Entity, EntityKind, Instance, ModelError, Place, Review,
    User,
};

use crate::errors::ServiceError;

/// Filter body of `POST /places_search`. Every list is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PlaceSearch {
    #[serde(default)]
    pub states: Vec<String>,
    #[serde(default)]
    pub cities: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
}

impl PlaceSearch {
    pub fn is_empty(&self) -> bool {
        self.states.is_empty() && self.cities.is_empty() && self.amenities.is_empty()
    }
}

/// In-memory object index keyed `"<Type>.<id>"`.
///
/// Reads are plain borrows. Mutations are crate-private and reachable from
/// outside only through a [`Transaction`](super::Transaction); each one marks
/// the index dirty until the next successful flush.
#[derive(Debug, Default)]
pub struct Index {
    objects: BTreeMap<String, Instance>,
    dirty: bool,
}

impl Index {
    pub fn get(&self, kind: EntityKind, id: &str) -> Option<&Instance> {
        self.objects.get(&object_key(kind, id))
    }

    pub fn get_as<E: Entity>(&self, id: &str) -> Option<&E> {
        self.get(E::KIND, id).and_then(E::from_instance)
    }

    pub fn contains(&self, kind: EntityKind, id: &str) -> bool {
        self.objects.contains_key(&object_key(kind, id))
    }

    /// Instances of `kind` (every instance for `None`), in key order.
    pub fn iter(&self, kind: Option<EntityKind>) -> impl Iterator<Item = &Instance> + '_ {
        self.objects.values().filter(move |i| kind.map_or(true, |k| i.kind() == k))
    }

    pub fn iter_as<'a, E: Entity + 'a>(&'a self) -> impl Iterator<Item = &'a E> + 'a {
        self.iter(Some(E::KIND)).filter_map(E::from_instance)
    }

    /// Owned copy of the matching part of the index, keyed `"<Type>.<id>"`.
    pub fn all(&self, kind: Option<EntityKind>) -> BTreeMap<String, Instance> {
        self.iter(kind).map(|i| (i.key(), i.clone())).collect()
    }

    pub fn count(&self, kind: Option<EntityKind>) -> usize {
        match kind {
            None => self.objects.len(),
            Some(_) => self.iter(kind).count(),
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn cities_of_state<'a>(&'a self, state_id: &'a str) -> impl Iterator<Item = &'a City> + 'a {
        self.iter_as::<City>().filter(move |c| c.state_id == state_id)
    }

    pub fn places_of_city<'a>(&'a self, city_id: &'a str) -> impl Iterator<Item = &'a Place> + 'a {
        self.iter_as::<Place>().filter(move |p| p.city_id == city_id)
    }

    pub fn reviews_of_place<'a>(&'a self, place_id: &'a str) -> impl Iterator<Item = &'a Review> + 'a {
        self.iter_as::<Review>().filter(move |r| r.place_id == place_id)
    }

    pub fn places_of_user<'a>(&'a self, user_id: &'a str) -> impl Iterator<Item = &'a Place> + 'a {
        self.iter_as::<Place>().filter(move |p| p.user_id == user_id)
    }

    pub fn reviews_of_user<'a>(&'a self, user_id: &'a str) -> impl Iterator<Item = &'a Review> + 'a {
        self.iter_as::<Review>().filter(move |r| r.user_id == user_id)
    }

    /// Amenities linked to a place; links to amenities that no longer exist are skipped.
    pub fn amenities_of_place(&self, place: &Place) -> Vec<&Amenity> {
        place.amenity_ids.iter().filter_map(|id| self.get_as::<Amenity>(id)).collect()
    }

    /// User with the given email, if any.
    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.iter_as::<User>().find(|u| u.email == email)
    }

    /// Places matching a search filter.
    ///
    /// States and cities contribute the union of their places; amenities then
    /// keep only places linked to all of them. Ids that resolve to nothing are ignored.
    pub fn search_places<'a>(&'a self, filter: &'a PlaceSearch) -> Vec<&'a Place> {
        let mut places: Vec<&Place> = if filter.states.is_empty() && filter.cities.is_empty() {
            self.iter_as::<Place>().collect()
        } else {
            let mut seen = HashSet::new();
            let mut out = Vec::new();
            let city_ids = filter
                .states
                .iter()
                .flat_map(|s| self.cities_of_state(s).map(|c| c.id()))
                .chain(filter.cities.iter().map(String::as_str));
            for city_id in city_ids {
                for place in self.places_of_city(city_id) {
                    if seen.insert(place.id()) {
                        out.push(place);
                    }
                }
            }
            out
        };

        let amenities: Vec<&str> = filter
            .amenities
            .iter()
            .map(String::as_str)
            .filter(|id| self.contains(EntityKind::Amenity, id))
            .collect();
        if !amenities.is_empty() {
            places.retain(|p| amenities.iter().all(|a| p.has_amenity(a)));
        }
        places
    }

    /// Fail with `Conflict` if storing `instance` would give two users one email.
    pub(crate) fn check_unique(&self, instance: &Instance) -> Result<(), ServiceError> {
        let Some(user) = instance.downcast::<User>() else {
            return Ok(());
        };
        match self.user_by_email(&user.email) {
            Some(other) if other.id() != user.id() => Err(ServiceError::Conflict("Email already exists".into())),
            _ => Ok(()),
        }
    }

    /// Register an instance, replacing any with the same type and id.
    pub(crate) fn add(&mut self, instance: Instance) -> Option<Instance> {
        self.dirty = true;
        self.objects.insert(instance.key(), instance)
    }

    /// Remove an instance and everything that depends on it.
    ///
    /// Cascade: State → City → Place → Review; User → owned Places and
    /// authored Reviews; Amenity → its id is unlinked from every Place.
    /// Returns the removed keys; empty when nothing matched.
    pub(crate) fn delete(&mut self, kind: EntityKind, id: &str) -> Vec<String> {
        let mut removed = Vec::new();
        self.delete_into(kind, id, &mut removed);
        if !removed.is_empty() {
            self.dirty = true;
        }
        removed
    }

    fn delete_into(&mut self, kind: EntityKind, id: &str, removed: &mut Vec<String>) {
        let Some(instance) = self.objects.remove(&object_key(kind, id)) else {
            return;
        };
        removed.push(instance.key());

        let children: Vec<(EntityKind, String)> = match kind {
            EntityKind::State => self
                .cities_of_state(id)
                .map(|c| (EntityKind::City, c.id().to_string()))
                .collect(),
            EntityKind::City => self
                .places_of_city(id)
                .map(|p| (EntityKind::Place, p.id().to_string()))
                .collect(),
            EntityKind::Place => self
                .reviews_of_place(id)
                .map(|r| (EntityKind::Review, r.id().to_string()))
                .collect(),
            EntityKind::User => self
                .places_of_user(id)
                .map(|p| (EntityKind::Place, p.id().to_string()))
                .chain(self.reviews_of_user(id).map(|r| (EntityKind::Review, r.id().to_string())))
                .collect(),
            EntityKind::Amenity => {
                for place in self.objects.values_mut().filter_map(Place::from_instance_mut) {
                    place.unlink_amenity(id);
                }
                Vec::new()
            }
            EntityKind::Review => Vec::new(),
        };
        for (child_kind, child_id) in children {
            self.delete_into(child_kind, &child_id, removed);
        }
    }

    /// Link an amenity to a place. Returns whether the link is new.
    pub(crate) fn link_amenity(&mut self, place_id: &str, amenity_id: &str) -> Result<bool, ServiceError> {
        if !self.contains(EntityKind::Amenity, amenity_id) {
            return Err(ServiceError::not_found("amenity"));
        }
        let place = self
            .objects
            .get_mut(&object_key(EntityKind::Place, place_id))
            .and_then(Place::from_instance_mut)
            .ok_or_else(|| ServiceError::not_found("place"))?;
        let linked = place.link_amenity(amenity_id);
        if linked {
            self.dirty = true;
        }
        Ok(linked)
    }

    /// Remove a place/amenity link. Returns whether the link existed.
    pub(crate) fn unlink_amenity(&mut self, place_id: &str, amenity_id: &str) -> Result<bool, ServiceError> {
        let place = self
            .objects
            .get_mut(&object_key(EntityKind::Place, place_id))
            .and_then(Place::from_instance_mut)
            .ok_or_else(|| ServiceError::not_found("place"))?;
        let unlinked = place.unlink_amenity(amenity_id);
        if unlinked {
            self.dirty = true;
        }
        Ok(unlinked)
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Whole-index snapshot: one JSON object of key → record.
    pub(crate) fn encode(&self) -> Result<Vec<u8>, ServiceError> {
        let mut snapshot = Map::new();
        for (key, instance) in &self.objects {
            snapshot.insert(key.clone(), Value::Object(instance.to_record()?));
        }
        serde_json::to_vec(&snapshot).map_err(|e| ServiceError::Persistence(e.to_string()))
    }

    /// Rebuild an index from a snapshot.
    ///
    /// Never fails: unparseable data yields an empty index and individual
    /// corrupt records are skipped, each with a warning.
    pub(crate) fn decode(bytes: &[u8]) -> (Index, usize) {
        let raw: Map<String, Value> = match serde_json::from_slice(bytes) {
            Ok(map) => map,
            Err(e) => {
                warn!(error = %e, "snapshot is not a JSON object; starting empty");
                return (Index::default(), 1);
            }
        };
        let mut index = Index::default();
        let mut skipped = 0;
        for (key, value) in raw {
            match decode_record(&key, value) {
                Ok(instance) => {
                    index.objects.insert(instance.key(), instance);
                }
                Err(e) => {
                    skipped += 1;
                    warn!(%key, error = %e, "skipping corrupt record");
                }
            }
        }
        (index, skipped)
    }
}

fn decode_record(key: &str, value: Value) -> Result<Instance, ModelError> {
    let (kind, id) = parse_object_key(key)?;
    let instance = Instance::from_record(kind, value)?;
    if instance.id() != id {
        return Err(ModelError::Decode(format!("record id {} does not match key", instance.id())));
    }
    Ok(instance)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use models::UnknownFields;

    fn make(kind: EntityKind, value: Value) -> Instance {
        let Value::Object(map) = value else { panic!("payload must be an object") };
        Instance::construct(kind, None, &map, UnknownFields::Ignore).expect("construct")
    }

    fn add(index: &mut Index, kind: EntityKind, value: Value) -> String {
        let inst = make(kind, value);
        let id = inst.id().to_string();
        index.add(inst);
        id
    }

    /// Small graph: one state, two cities, a place per city, reviews, amenities.
    struct Fixture {
        index: Index,
        state: String,
        sf: String,
        la: String,
        user: String,
        loft: String,
        villa: String,
        review: String,
        wifi: String,
        pool: String,
    }

    fn fixture() -> Fixture {
        let mut index = Index::default();
        let state = add(&mut index, EntityKind::State, json!({"name": "California"}));
        let sf = add(&mut index, EntityKind::City, json!({"name": "SF", "state_id": state}));
        let la = add(&mut index, EntityKind::City, json!({"name": "LA", "state_id": state}));
        // password hashing is slow in debug builds; build the user from a record instead
        let user_inst = Instance::from_record(
            EntityKind::User,
            json!({
                "id": "u1",
                "created_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-01-01T00:00:00Z",
                "email": "host@hbnb.io",
                "password": "x"
            }),
        )
        .expect("user record");
        index.add(user_inst);
        let user = "u1".to_string();
        let loft = add(&mut index, EntityKind::Place, json!({"name": "Loft", "city_id": sf, "user_id": user}));
        let villa = add(&mut index, EntityKind::Place, json!({"name": "Villa", "city_id": la, "user_id": user}));
        let review =
            add(&mut index, EntityKind::Review, json!({"text": "nice", "place_id": loft, "user_id": user}));
        let wifi = add(&mut index, EntityKind::Amenity, json!({"name": "Wifi"}));
        let pool = add(&mut index, EntityKind::Amenity, json!({"name": "Pool"}));
        index.link_amenity(&loft, &wifi).expect("link");
        index.link_amenity(&villa, &wifi).expect("link");
        index.link_amenity(&villa, &pool).expect("link");
        index.mark_clean();
        Fixture { index, state, sf, la, user, loft, villa, review, wifi, pool }
    }

    #[test]
    fn count_matches_all_for_every_kind() {
        let f = fixture();
        for kind in EntityKind::ALL {
            assert_eq!(f.index.count(Some(kind)), f.index.all(Some(kind)).len());
        }
        assert_eq!(f.index.count(None), f.index.all(None).len());
        assert_eq!(f.index.count(None), 9);
    }

    #[test]
    fn all_is_keyed_by_type_and_id() {
        let f = fixture();
        let cities = f.index.all(Some(EntityKind::City));
        assert!(cities.contains_key(&format!("City.{}", f.sf)));
        assert!(cities.contains_key(&format!("City.{}", f.la)));
        assert!(cities.values().all(|i| i.kind() == EntityKind::City));
    }

    #[test]
    fn get_missing_is_none() {
        let f = fixture();
        assert!(f.index.get(EntityKind::State, "nope").is_none());
        // right id, wrong type
        assert!(f.index.get(EntityKind::City, &f.state).is_none());
    }

    #[test]
    fn add_same_id_overwrites() {
        let mut f = fixture();
        let mut state = f.index.get(EntityKind::State, &f.state).cloned().expect("state");
        if let Some(s) = state.downcast_mut::<models::State>() {
            s.name = "CA".into();
        }
        let previous = f.index.add(state);
        assert!(previous.is_some());
        assert_eq!(f.index.count(Some(EntityKind::State)), 1);
        assert_eq!(f.index.get_as::<models::State>(&f.state).map(|s| s.name.as_str()), Some("CA"));
        assert!(f.index.is_dirty());
    }

    #[test]
    fn deleting_state_cascades_to_cities_places_reviews() {
        let mut f = fixture();
        let removed = f.index.delete(EntityKind::State, &f.state);
        assert_eq!(removed.len(), 6);
        assert_eq!(f.index.count(Some(EntityKind::City)), 0);
        assert_eq!(f.index.count(Some(EntityKind::Place)), 0);
        assert_eq!(f.index.count(Some(EntityKind::Review)), 0);
        // amenities and users are not owned by states
        assert_eq!(f.index.count(Some(EntityKind::Amenity)), 2);
        assert_eq!(f.index.count(Some(EntityKind::User)), 1);
        assert!(f.index.is_dirty());
    }

    #[test]
    fn deleting_city_keeps_sibling_city() {
        let mut f = fixture();
        f.index.delete(EntityKind::City, &f.sf);
        assert!(f.index.get(EntityKind::Place, &f.loft).is_none());
        assert!(f.index.get(EntityKind::Review, &f.review).is_none());
        assert!(f.index.get(EntityKind::Place, &f.villa).is_some());
        assert!(f.index.get(EntityKind::City, &f.la).is_some());
    }

    #[test]
    fn deleting_amenity_unlinks_it_from_places() {
        let mut f = fixture();
        let removed = f.index.delete(EntityKind::Amenity, &f.wifi);
        assert_eq!(removed, vec![format!("Amenity.{}", f.wifi)]);
        let villa = f.index.get_as::<Place>(&f.villa).expect("villa");
        assert_eq!(villa.amenity_ids, vec![f.pool.clone()]);
        let loft = f.index.get_as::<Place>(&f.loft).expect("loft");
        assert!(loft.amenity_ids.is_empty());
    }

    #[test]
    fn deleting_user_removes_owned_places_and_reviews() {
        let mut f = fixture();
        f.index.delete(EntityKind::User, &f.user);
        assert_eq!(f.index.count(Some(EntityKind::Place)), 0);
        assert_eq!(f.index.count(Some(EntityKind::Review)), 0);
        assert_eq!(f.index.count(Some(EntityKind::City)), 2);
    }

    #[test]
    fn deleting_missing_is_noop() {
        let mut f = fixture();
        assert!(f.index.delete(EntityKind::Review, "ghost").is_empty());
        assert!(!f.index.is_dirty());
    }

    #[test]
    fn relationship_helpers() {
        let f = fixture();
        assert_eq!(f.index.cities_of_state(&f.state).count(), 2);
        assert_eq!(f.index.places_of_city(&f.sf).map(|p| p.id()).collect::<Vec<_>>(), vec![f.loft.as_str()]);
        assert_eq!(f.index.reviews_of_place(&f.loft).count(), 1);
        assert_eq!(f.index.places_of_user(&f.user).count(), 2);
        assert_eq!(f.index.reviews_of_user(&f.user).count(), 1);
        let villa = f.index.get_as::<Place>(&f.villa).expect("villa");
        let names: Vec<_> = f.index.amenities_of_place(villa).iter().map(|a| a.name.clone()).collect();
        assert_eq!(names, vec!["Wifi".to_string(), "Pool".to_string()]);
        assert!(f.index.user_by_email("host@hbnb.io").is_some());
    }

    #[test]
    fn link_and_unlink_amenity() {
        let mut f = fixture();
        assert_eq!(f.index.link_amenity(&f.loft, &f.wifi).expect("link"), false);
        assert!(!f.index.is_dirty());
        assert_eq!(f.index.link_amenity(&f.loft, &f.pool).expect("link"), true);
        assert!(matches!(f.index.link_amenity(&f.loft, "ghost"), Err(ServiceError::NotFound(_))));
        assert!(matches!(f.index.link_amenity("ghost", &f.pool), Err(ServiceError::NotFound(_))));
        assert_eq!(f.index.unlink_amenity(&f.loft, &f.pool).expect("unlink"), true);
        assert_eq!(f.index.unlink_amenity(&f.loft, &f.pool).expect("unlink"), false);
    }

    #[test]
    fn search_places() {
        let f = fixture();
        let ids = |filter: &PlaceSearch| -> Vec<String> {
            let mut v: Vec<String> = f.index.search_places(filter).iter().map(|p| p.id().to_string()).collect();
            v.sort();
            v
        };
        let mut both = vec![f.loft.clone(), f.villa.clone()];
        both.sort();

        assert_eq!(ids(&PlaceSearch::default()), both);
        // state and one of its cities: no duplicates
        let filter = PlaceSearch { states: vec![f.state.clone()], cities: vec![f.sf.clone()], ..Default::default() };
        assert_eq!(ids(&filter), both);
        let filter = PlaceSearch { cities: vec![f.la.clone()], ..Default::default() };
        assert_eq!(ids(&filter), vec![f.villa.clone()]);
        // amenities only: filter over everything
        let filter = PlaceSearch { amenities: vec![f.pool.clone()], ..Default::default() };
        assert_eq!(ids(&filter), vec![f.villa.clone()]);
        let filter = PlaceSearch { amenities: vec![f.wifi.clone(), "ghost".into()], ..Default::default() };
        assert_eq!(ids(&filter), both);
        let filter = PlaceSearch { states: vec!["nowhere".into()], ..Default::default() };
        assert!(ids(&filter).is_empty());
    }

    #[test]
    fn snapshot_round_trip() {
        let f = fixture();
        let bytes = f.index.encode().expect("encode");
        let (back, skipped) = Index::decode(&bytes);
        assert_eq!(skipped, 0);
        assert_eq!(back.all(None), f.index.all(None));
        assert!(!back.is_dirty());
    }

    #[test]
    fn decode_tolerates_corruption() {
        let (index, skipped) = Index::decode(b"not json");
        assert_eq!(index.count(None), 0);
        assert_eq!(skipped, 1);

        let state = make(EntityKind::State, json!({"name": "Ohio"}));
        let mut snapshot = Map::new();
        snapshot.insert(state.key(), Value::Object(state.to_record().expect("record")));
        snapshot.insert("State.other".into(), json!({"name": 3}));
        snapshot.insert("Bogus.1".into(), json!({}));
        let bytes = serde_json::to_vec(&snapshot).expect("bytes");
        let (index, skipped) = Index::decode(&bytes);
        assert_eq!(index.count(None), 1);
        assert_eq!(skipped, 2);
        assert_eq!(index.get(EntityKind::State, state.id()), Some(&state));
    }
}
