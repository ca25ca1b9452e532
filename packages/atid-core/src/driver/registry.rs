use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::{builtin_drivers, Driver, Engine};

/// Registered engine driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverDescriptor {
    /// Engine identifier
    pub engine: Engine,
    /// Human readable label
    pub label: &'static str,
    /// Driver handle name
    pub handle: &'static str,
}

struct Entry {
    descriptor: DriverDescriptor,
    driver: Arc<dyn Driver>,
}

/// Registry of engine drivers usable on this host.
///
/// Populated once at startup and read-only afterwards, so it can be shared
/// between catalogs behind an `Arc` without locking.
#[derive(Default)]
pub struct DriverRegistry {
    entries: BTreeMap<Engine, Entry>,
}

impl DriverRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Probes every driver compiled into this build and registers the ones
    /// whose client side is usable.
    ///
    /// Call once at startup.
    pub fn initialise() -> Self {
        let mut registry = Self::new();
        for driver in builtin_drivers() {
            if driver.probe() {
                registry.register(driver);
            } else {
                tracing::debug!(
                    "{} driver compiled in but not usable on this host",
                    driver.engine()
                );
            }
        }
        registry
    }

    /// Registers the given drivers without probing.
    pub fn from_drivers(drivers: impl IntoIterator<Item = Arc<dyn Driver>>) -> Self {
        let mut registry = Self::new();
        for driver in drivers {
            registry.register(driver);
        }
        registry
    }

    fn register(&mut self, driver: Arc<dyn Driver>) {
        let descriptor = DriverDescriptor {
            engine: driver.engine(),
            label: driver.label(),
            handle: driver.handle_name(),
        };
        tracing::info!(
            "{} driver enabled ({})",
            descriptor.engine,
            descriptor.handle
        );
        self.entries
            .insert(descriptor.engine, Entry { descriptor, driver });
    }

    /// Checks if an engine was registered.
    pub fn is_available(&self, engine: Engine) -> bool {
        self.entries.contains_key(&engine)
    }

    /// Driver handle name of a registered engine.
    pub fn driver_handle(&self, engine: Engine) -> Option<&'static str> {
        self.entries.get(&engine).map(|entry| entry.descriptor.handle)
    }

    /// Driver for a registered engine.
    pub fn driver(&self, engine: Engine) -> Option<Arc<dyn Driver>> {
        self.entries.get(&engine).map(|entry| Arc::clone(&entry.driver))
    }

    /// Descriptors of all registered engines.
    pub fn descriptors(&self) -> Vec<DriverDescriptor> {
        self.entries
            .values()
            .map(|entry| entry.descriptor.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.values().map(|entry| &entry.descriptor))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{ConnectTarget, DriverConnection};
    use crate::error::DriverError;

    struct FakeDriver(Engine);

    impl Driver for FakeDriver {
        fn engine(&self) -> Engine {
            self.0
        }

        fn handle_name(&self) -> &'static str {
            "fake"
        }

        fn label(&self) -> &'static str {
            "Fake driver"
        }

        fn open(&self, _target: &ConnectTarget) -> Result<Box<dyn DriverConnection>, DriverError> {
            Err(DriverError::client("fake driver cannot connect"))
        }
    }

    #[test]
    fn test_registered_engines_only() {
        let registry = DriverRegistry::from_drivers([
            Arc::new(FakeDriver(Engine::PostgreSql)) as Arc<dyn Driver>,
            Arc::new(FakeDriver(Engine::Odbc)),
        ]);

        assert_eq!(registry.len(), 2);
        assert!(registry.is_available(Engine::PostgreSql));
        assert!(registry.is_available(Engine::Odbc));
        assert!(!registry.is_available(Engine::MySql));
        assert_eq!(registry.driver_handle(Engine::Odbc), Some("fake"));
        assert_eq!(registry.driver_handle(Engine::Oracle), None);
        assert!(registry.driver(Engine::MySql).is_none());
    }

    #[test]
    fn test_empty_registry() {
        let registry = DriverRegistry::new();
        assert!(registry.is_empty());
        for engine in Engine::ALL {
            assert!(!registry.is_available(engine));
        }
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_initialise_finds_sqlite() {
        let registry = DriverRegistry::initialise();
        assert!(registry.is_available(Engine::Sqlite));
        assert_eq!(registry.driver_handle(Engine::Sqlite), Some("sqlite3"));
    }
}
