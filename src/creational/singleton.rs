// Singleton - at most one instance per type, built lazily by the first caller.
//
// The registry maps `TypeId` to a type-erased `Arc`. The lookup and the
// construction both run under one mutex, so two threads racing on first use
// still produce a single instance.

use crate::error::{PatternError, Result};
use lazy_static::lazy_static;
use std::any::{type_name, Any, TypeId};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use tracing::{debug, info};

type Instance = Arc<dyn Any + Send + Sync>;

/// A type the registry knows how to build.
pub trait Singleton: Any + Send + Sync {
    type Args;

    fn construct(args: Self::Args) -> Self;
}

// ============================================================================
// Registry
// ============================================================================

#[derive(Default)]
pub struct SingletonRegistry {
    instances: Mutex<HashMap<TypeId, Instance>>,
}

lazy_static! {
    static ref GLOBAL_REGISTRY: SingletonRegistry = SingletonRegistry::new();
}

impl SingletonRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> &'static SingletonRegistry {
        &GLOBAL_REGISTRY
    }

    // A constructor that panicked never reached `insert`, so the map is
    // still consistent after poisoning.
    fn lock(&self) -> MutexGuard<'_, HashMap<TypeId, Instance>> {
        self.instances
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the instance of `T`, building it from `args` on first use.
    ///
    /// Once built, `args` from later calls are ignored. `T::construct` runs
    /// with the registry locked, so it must not call back into the same
    /// registry.
    pub fn get_instance<T: Singleton>(&self, args: T::Args) -> Result<Arc<T>> {
        let instance = {
            let mut instances = self.lock();
            match instances.entry(TypeId::of::<T>()) {
                Entry::Occupied(entry) => {
                    debug!(
                        singleton = type_name::<T>(),
                        "Reusing existing instance, construction args ignored"
                    );
                    Arc::clone(entry.get())
                }
                Entry::Vacant(entry) => {
                    let created: Instance = Arc::new(T::construct(args));
                    info!(singleton = type_name::<T>(), "Constructed instance");
                    Arc::clone(entry.insert(created))
                }
            }
        };

        instance
            .downcast::<T>()
            .map_err(|_| PatternError::type_mismatch::<T>())
    }

    /// Existing instance of `T`, without building one.
    pub fn get<T: Singleton>(&self) -> Option<Arc<T>> {
        let instance = self.lock().get(&TypeId::of::<T>()).cloned()?;
        instance.downcast::<T>().ok()
    }

    pub fn contains<T: Singleton>(&self) -> bool {
        self.lock().contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

// ============================================================================
// Demo singleton
// ============================================================================

#[derive(Debug)]
pub struct Settings {
    value: String,
}

impl Singleton for Settings {
    type Args = String;

    fn construct(value: String) -> Self {
        Self { value }
    }
}

impl Settings {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn some_business_logic(&self) -> String {
        format!("Running business logic with '{}'", self.value)
    }
}

/// What one demo thread asked for and what it actually got back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sighting {
    pub thread: String,
    pub requested: String,
    pub observed: String,
}

/// Spawn one named thread per value; each asks `registry` for [`Settings`].
pub fn race(registry: &SingletonRegistry, values: &[String]) -> Result<Vec<Sighting>> {
    thread::scope(|scope| -> Result<Vec<Sighting>> {
        let handles = values
            .iter()
            .enumerate()
            .map(|(i, value)| {
                thread::Builder::new()
                    .name(format!("singleton-{i}"))
                    .spawn_scoped(scope, move || -> Result<Sighting> {
                        let settings = registry.get_instance::<Settings>(value.clone())?;
                        Ok(Sighting {
                            thread: thread::current().name().unwrap_or("unnamed").to_string(),
                            requested: value.clone(),
                            observed: settings.value().to_string(),
                        })
                    })
            })
            .collect::<std::io::Result<Vec<_>>>()?;

        handles
            .into_iter()
            .map(|handle| {
                let name = handle.thread().name().unwrap_or("unnamed").to_string();
                handle
                    .join()
                    .unwrap_or_else(|_| Err(PatternError::Thread(name)))
            })
            .collect()
    })
}

/// True when every thread saw the same instance.
pub fn all_agree(sightings: &[Sighting]) -> bool {
    sightings
        .windows(2)
        .all(|pair| pair[0].observed == pair[1].observed)
}

// ============================================================================
// Tests
// ============================================================================
