use super::{Cheese, GeneralProduct, NewYearsEve, Rule, Wine};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Builds a shareable rule instance for a category.
pub type RuleConstructor = Box<dyn Fn() -> Arc<dyn Rule> + Send + Sync>;

/// Lookup from an implementation key (as written in category sources) to the
/// rule it constructs.
///
/// Populated once at startup and read-only afterwards; new behavior is added
/// by registering another key, never by touching the lookup.
pub struct RuleRegistry {
    constructors: HashMap<String, RuleConstructor>,
}

impl RuleRegistry {
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    pub fn with_builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(GeneralProduct::KEY, || Arc::new(GeneralProduct));
        registry.register(Cheese::KEY, || Arc::new(Cheese));
        registry.register(Wine::KEY, || Arc::new(Wine));
        registry.register(NewYearsEve::KEY, || Arc::new(NewYearsEve));
        registry
    }

    /// Registers a constructor, replacing any previous one under `key`.
    pub fn register<F>(&mut self, key: impl Into<String>, constructor: F)
    where
        F: Fn() -> Arc<dyn Rule> + Send + Sync + 'static,
    {
        self.constructors.insert(key.into(), Box::new(constructor));
    }

    pub fn resolve(&self, implementation: &str) -> Option<Arc<dyn Rule>> {
        self.constructors
            .get(implementation)
            .map(|constructor| constructor())
    }

    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}
