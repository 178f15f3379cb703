// Flyweight - share the heavy, repeated part of many objects (intrinsic
// state) and pass the per-object part (extrinsic state) in at call time.

use crate::error::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, info};

// ============================================================================
// Intrinsic state and the cache key
// ============================================================================

/// Named attributes shared by every object built from the same flyweight.
/// Insertion order is kept so the JSON rendering reads the way it was built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IntrinsicState {
    attributes: IndexMap<String, String>,
}

impl IntrinsicState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Setting a name twice keeps the first position and the last value.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.attributes.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for IntrinsicState {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |state, (name, value)| state.with(name, value))
    }
}

/// Cache key: attribute values sorted and joined with `_`.
///
/// Attribute names play no part and `_` inside a value is not escaped, so
/// distinct states can share a key (`{a: "x_y"}` and `{a: "x", b: "y"}`).
/// Such states resolve to the same flyweight.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlyweightKey(String);

impl FlyweightKey {
    pub const SEPARATOR: &'static str = "_";

    pub fn from_state(state: &IntrinsicState) -> Self {
        let mut values: Vec<&str> = state.values().collect();
        values.sort_unstable();
        Self(values.join(Self::SEPARATOR))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FlyweightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&IntrinsicState> for FlyweightKey {
    fn from(state: &IntrinsicState) -> Self {
        Self::from_state(state)
    }
}

// ============================================================================
// Flyweight
// ============================================================================

#[derive(Debug, PartialEq, Eq)]
pub struct Flyweight {
    intrinsic: IntrinsicState,
}

impl Flyweight {
    pub fn new(intrinsic: IntrinsicState) -> Self {
        Self { intrinsic }
    }

    pub fn intrinsic(&self) -> &IntrinsicState {
        &self.intrinsic
    }

    /// Combine the shared state with `extrinsic` for this one call.
    /// Nothing from `extrinsic` is kept.
    pub fn operation<E: Serialize + ?Sized>(&self, extrinsic: &E) -> Result<String> {
        let shared = serde_json::to_string(&self.intrinsic)?;
        let unique = serde_json::to_string(extrinsic)?;
        Ok(format!(
            "Flyweight: Displaying intrinsic state ({shared}), extrinsic state ({unique})."
        ))
    }
}

// ============================================================================
// Factory
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Miss,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

/// Keyed store of shared flyweights.
///
/// Handles are `Rc` and lookups take `&mut self`: the cache is for a single
/// thread. Sharing it across threads would need `Arc` and a lock around
/// `lookup`.
#[derive(Debug, Default)]
pub struct FlyweightFactory {
    flyweights: IndexMap<FlyweightKey, Rc<Flyweight>>,
    stats: CacheStats,
}

impl FlyweightFactory {
    /// Pre-seed the cache. Seeding is neither a hit nor a miss.
    pub fn new<I>(initial: I) -> Self
    where
        I: IntoIterator<Item = IntrinsicState>,
    {
        let flyweights = initial
            .into_iter()
            .map(|state| (FlyweightKey::from_state(&state), Rc::new(Flyweight::new(state))))
            .collect();

        Self {
            flyweights,
            stats: CacheStats::default(),
        }
    }

    /// Shared flyweight for `state`, and whether it was already cached.
    pub fn lookup(&mut self, state: &IntrinsicState) -> (Rc<Flyweight>, CacheOutcome) {
        let key = FlyweightKey::from_state(state);

        if let Some(existing) = self.flyweights.get(&key) {
            self.stats.hits += 1;
            debug!(%key, "Reusing existing flyweight");
            return (Rc::clone(existing), CacheOutcome::Hit);
        }

        self.stats.misses += 1;
        info!(%key, "No flyweight cached, creating a new one");
        let created = Rc::new(Flyweight::new(state.clone()));
        self.flyweights.insert(key, Rc::clone(&created));
        (created, CacheOutcome::Miss)
    }

    pub fn get_flyweight(&mut self, state: &IntrinsicState) -> Rc<Flyweight> {
        self.lookup(state).0
    }

    /// Cached keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &FlyweightKey> {
        self.flyweights.keys()
    }

    pub fn len(&self) -> usize {
        self.flyweights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flyweights.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn listing(&self) -> String {
        let mut out = format!("FlyweightFactory: I have {} flyweights:", self.len());
        for key in self.keys() {
            out.push('\n');
            out.push_str(key.as_str());
        }
        out
    }
}

// ============================================================================
// Car registry client
// ============================================================================

/// The shareable half of a car record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarModel {
    pub brand: String,
    pub model: String,
    pub color: String,
}

impl CarModel {
    pub fn new(brand: impl Into<String>, model: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            brand: brand.into(),
            model: model.into(),
            color: color.into(),
        }
    }

    pub fn intrinsic(&self) -> IntrinsicState {
        IntrinsicState::new()
            .with("brand", self.brand.as_str())
            .with("model", self.model.as_str())
            .with("color", self.color.as_str())
    }
}

/// A full record as it arrives at the police database.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Car {
    pub plates: String,
    pub owner: String,
    #[serde(flatten)]
    pub model: CarModel,
}

/// Per-car data, never cached.
#[derive(Debug, Serialize)]
pub struct Registration<'a> {
    pub plates: &'a str,
    pub owner: &'a str,
}

impl Car {
    pub fn new(plates: impl Into<String>, owner: impl Into<String>, model: CarModel) -> Self {
        Self {
            plates: plates.into(),
            owner: owner.into(),
            model,
        }
    }

    pub fn registration(&self) -> Registration<'_> {
        Registration {
            plates: &self.plates,
            owner: &self.owner,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registered {
    pub outcome: CacheOutcome,
    pub description: String,
}

pub fn add_car_to_police_database(factory: &mut FlyweightFactory, car: &Car) -> Result<Registered> {
    let (flyweight, outcome) = factory.lookup(&car.model.intrinsic());
    let description = flyweight.operation(&car.registration())?;
    Ok(Registered {
        outcome,
        description,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn seeded() -> FlyweightFactory {
        FlyweightFactory::new(
            [
                CarModel::new("Chevrolet", "Camaro2018", "pink"),
                CarModel::new("Mercedes Benz", "C300", "black"),
                CarModel::new("Mercedes Benz", "C500", "red"),
                CarModel::new("BMW", "M5", "red"),
                CarModel::new("BMW", "X6", "white"),
            ]
            .iter()
            .map(CarModel::intrinsic),
        )
    }

    #[test]
    fn test_key_sorts_values() {
        let state = CarModel::new("BMW", "M5", "red").intrinsic();
        assert_eq!(FlyweightKey::from_state(&state).as_str(), "BMW_M5_red");

        let camaro = CarModel::new("Chevrolet", "Camaro2018", "pink").intrinsic();
        assert_eq!(camaro.len(), 3);
        assert_eq!(
            FlyweightKey::from(&camaro).to_string(),
            "Camaro2018_Chevrolet_pink"
        );
    }

    #[test]
    fn test_key_ignores_attribute_order() {
        let forward = IntrinsicState::new()
            .with("brand", "BMW")
            .with("model", "M5")
            .with("color", "red");
        let backward = IntrinsicState::new()
            .with("color", "red")
            .with("model", "M5")
            .with("brand", "BMW");

        assert_eq!(FlyweightKey::from(&forward), FlyweightKey::from(&backward));
    }

    #[test]
    fn test_seeded_factory_scenario() {
        let mut factory = seeded();
        assert_eq!(factory.len(), 5);
        assert_eq!(factory.stats(), CacheStats::default());

        let (_, outcome) = factory.lookup(&CarModel::new("BMW", "M5", "red").intrinsic());
        assert_eq!(outcome, CacheOutcome::Hit);
        assert_eq!(factory.len(), 5);

        let (_, outcome) = factory.lookup(&CarModel::new("BMW", "X1", "red").intrinsic());
        assert_eq!(outcome, CacheOutcome::Miss);
        assert_eq!(factory.len(), 6);

        assert_eq!(factory.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn test_same_state_returns_same_instance() {
        let mut factory = FlyweightFactory::default();
        let a = factory.get_flyweight(&CarModel::new("BMW", "X1", "red").intrinsic());
        let b = factory.get_flyweight(&IntrinsicState::from_iter([
            ("color", "red"),
            ("brand", "BMW"),
            ("model", "X1"),
        ]));

        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(factory.len(), 1);
        // one in the cache, two handed out
        assert_eq!(Rc::strong_count(&a), 3);
    }

    #[test]
    fn test_collision_resolves_to_first_entry() {
        let mut factory = FlyweightFactory::default();
        let joined = factory.get_flyweight(&IntrinsicState::new().with("a", "x_y"));
        let split = factory.get_flyweight(&IntrinsicState::new().with("a", "x").with("b", "y"));

        assert!(Rc::ptr_eq(&joined, &split));
        assert_eq!(split.intrinsic().get("a"), Some("x_y"));
        assert_eq!(factory.len(), 1);
    }

    #[test]
    fn test_operation_renders_both_states() {
        let flyweight = Flyweight::new(CarModel::new("BMW", "M5", "red").intrinsic());
        let line = flyweight.operation("CL234IR, James Doe").unwrap();

        assert_eq!(
            line,
            "Flyweight: Displaying intrinsic state ({\"brand\":\"BMW\",\"model\":\"M5\",\"color\":\"red\"}), \
             extrinsic state (\"CL234IR, James Doe\")."
        );
    }

    #[test]
    fn test_extrinsic_state_is_not_cached() {
        let mut factory = seeded();
        let car = Car::new("CL234IR", "James Doe", CarModel::new("BMW", "M5", "red"));

        let registered = add_car_to_police_database(&mut factory, &car).unwrap();
        assert_eq!(registered.outcome, CacheOutcome::Hit);
        assert!(registered.description.contains("\"plates\":\"CL234IR\""));

        let flyweight = factory.get_flyweight(&car.model.intrinsic());
        assert_eq!(flyweight.intrinsic(), &car.model.intrinsic());
        assert!(factory.keys().all(|key| !key.as_str().contains("CL234IR")));
    }

    #[test]
    fn test_listing_keeps_insertion_order() {
        let mut factory = seeded();
        factory.get_flyweight(&CarModel::new("BMW", "X1", "red").intrinsic());

        let listing = factory.listing();
        let mut lines = listing.lines();
        assert_eq!(lines.next(), Some("FlyweightFactory: I have 6 flyweights:"));
        assert_eq!(lines.next(), Some("Camaro2018_Chevrolet_pink"));
        assert_eq!(lines.last(), Some("BMW_X1_red"));
    }

    #[test]
    fn test_car_deserializes_flat() {
        let car: Car = toml::from_str(
            "plates = \"AB123\"\nowner = \"Jane Roe\"\nbrand = \"BMW\"\nmodel = \"M5\"\ncolor = \"red\"\n",
        )
        .unwrap();
        assert_eq!(car.model, CarModel::new("BMW", "M5", "red"));
        assert_eq!(car.owner, "Jane Roe");
    }

    fn state_from(values: &[String]) -> IntrinsicState {
        values
            .iter()
            .enumerate()
            .map(|(i, value)| (format!("attr{i}"), value.clone()))
            .collect()
    }

    proptest! {
        #[test]
        fn prop_attribute_order_does_not_matter(
            values in prop::collection::vec("[a-z0-9]{1,6}", 1..6),
        ) {
            let mut factory = FlyweightFactory::default();
            let forward = state_from(&values);
            let reversed: IntrinsicState = forward
                .attributes
                .iter()
                .rev()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect();

            let a = factory.get_flyweight(&forward);
            let b = factory.get_flyweight(&reversed);
            prop_assert!(Rc::ptr_eq(&a, &b));
            prop_assert_eq!(factory.len(), 1);
        }

        #[test]
        fn prop_distinct_values_get_distinct_flyweights(
            first in prop::collection::vec("[a-z0-9]{1,6}", 1..5),
            second in prop::collection::vec("[a-z0-9]{1,6}", 1..5),
        ) {
            let mut sorted_first = first.clone();
            sorted_first.sort();
            let mut sorted_second = second.clone();
            sorted_second.sort();
            prop_assume!(sorted_first != sorted_second);

            let mut factory = FlyweightFactory::default();
            let a = factory.get_flyweight(&state_from(&first));
            let before = factory.len();
            let (b, outcome) = factory.lookup(&state_from(&second));

            prop_assert!(!Rc::ptr_eq(&a, &b));
            prop_assert_eq!(outcome, CacheOutcome::Miss);
            prop_assert_eq!(factory.len(), before + 1);
        }
    }
}
