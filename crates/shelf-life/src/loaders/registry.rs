use super::{delimited, CategoryLoader, ItemLoader, LoaderContext};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Data source selection parsed from `key:payload`.
///
/// The key picks a registered factory, the payload is handed to it verbatim
/// and may itself contain colons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    key: String,
    payload: String,
}

impl SourceSpec {
    pub fn new(key: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            payload: payload.into(),
        }
    }

    /// Splits on the first colon; `None` when there is none.
    pub fn parse(raw: &str) -> Option<Self> {
        let (key, payload) = raw.split_once(':')?;
        Some(Self::new(key, payload))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key, self.payload)
    }
}

/// Extra name for an already registered loader key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderAlias {
    pub alias: String,
    pub target: String,
}

impl LoaderAlias {
    /// Parses `alias=target`; both sides must be non-empty.
    pub fn parse(raw: &str) -> Option<Self> {
        let (alias, target) = raw.split_once('=')?;
        let (alias, target) = (alias.trim(), target.trim());
        if alias.is_empty() || target.is_empty() {
            return None;
        }
        Some(Self {
            alias: alias.to_string(),
            target: target.to_string(),
        })
    }
}

/// Builds a loader from the payload of a [`SourceSpec`].
pub type LoaderFactory<L> = Arc<dyn Fn(&str, &LoaderContext) -> Box<L> + Send + Sync>;

/// Startup-populated lookup from a short key to a loader factory.
pub struct LoaderRegistry<L: ?Sized> {
    kind: &'static str,
    factories: HashMap<String, LoaderFactory<L>>,
}

pub type CategoryLoaderRegistry = LoaderRegistry<dyn CategoryLoader>;
pub type ItemLoaderRegistry = LoaderRegistry<dyn ItemLoader>;

impl<L: ?Sized + 'static> LoaderRegistry<L> {
    pub fn empty(kind: &'static str) -> Self {
        Self {
            kind,
            factories: HashMap::new(),
        }
    }

    /// What this registry builds, for messages.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Registers a factory, replacing any previous one under `key`.
    pub fn register<F>(&mut self, key: impl Into<String>, factory: F)
    where
        F: Fn(&str, &LoaderContext) -> Box<L> + Send + Sync + 'static,
    {
        self.factories.insert(key.into(), Arc::new(factory));
    }

    /// Makes the factory registered as `target` available as `alias` too.
    /// Returns `false` when `target` is unknown.
    pub fn register_alias(&mut self, alias: impl Into<String>, target: &str) -> bool {
        match self.factories.get(target).cloned() {
            Some(factory) => {
                self.factories.insert(alias.into(), factory);
                true
            }
            None => false,
        }
    }

    /// Registers every alias whose target is known; the others are logged and
    /// skipped.
    pub fn apply_aliases(&mut self, aliases: &[LoaderAlias]) {
        for LoaderAlias { alias, target } in aliases {
            if !self.register_alias(alias.as_str(), target) {
                tracing::warn!(
                    kind = self.kind,
                    %alias,
                    %target,
                    "alias target is not registered, skipping"
                );
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Builds the loader for `spec`, or `None` when its key is unknown.
    pub fn build(&self, spec: &SourceSpec, context: &LoaderContext) -> Option<Box<L>> {
        let factory = self.factories.get(spec.key())?;
        tracing::debug!(kind = self.kind, key = spec.key(), "building loader");
        Some(factory(spec.payload(), context))
    }

    /// Parses and builds in one go; `None` for a missing colon or an unknown
    /// key alike.
    pub fn resolve(&self, config: &str, context: &LoaderContext) -> Option<Box<L>> {
        let spec = SourceSpec::parse(config)?;
        self.build(&spec, context)
    }
}

impl CategoryLoaderRegistry {
    pub fn with_builtin() -> Self {
        let mut registry = Self::empty("category loader");
        registry.register(delimited::FILE_KEY, delimited::file_category_loader);
        registry.register(delimited::PIPE_KEY, delimited::pipe_category_loader);
        #[cfg(feature = "sqlite")]
        registry.register(super::sqlite::KEY, super::sqlite::category_loader);
        registry
    }
}

impl ItemLoaderRegistry {
    pub fn with_builtin() -> Self {
        let mut registry = Self::empty("item loader");
        registry.register(delimited::FILE_KEY, delimited::file_item_loader);
        registry.register(delimited::PIPE_KEY, delimited::pipe_item_loader);
        #[cfg(feature = "sqlite")]
        registry.register(super::sqlite::KEY, super::sqlite::item_loader);
        registry
    }
}

impl<L: ?Sized + 'static> fmt::Debug for LoaderRegistry<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderRegistry")
            .field("kind", &self.kind)
            .field("keys", &self.keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::CategoryMap;
    use crate::loaders::DataAccessError;
    use crate::rules::RuleRegistry;
    use crate::view::RecordingView;

    struct Fixed {
        payload: String,
    }

    impl CategoryLoader for Fixed {
        fn fetch_categories(&self) -> Result<CategoryMap, DataAccessError> {
            Err(DataAccessError::new(self.payload.clone(), "fixed"))
        }
    }

    fn fixed(payload: &str, _context: &LoaderContext) -> Box<dyn CategoryLoader> {
        Box::new(Fixed {
            payload: payload.to_string(),
        })
    }

    fn context() -> LoaderContext {
        LoaderContext::new(
            Arc::new(RecordingView::new()),
            Arc::new(RuleRegistry::with_builtin()),
        )
    }

    fn payload_of(loader: Box<dyn CategoryLoader>) -> String {
        loader
            .fetch_categories()
            .expect_err("fixed loader always fails")
            .resource
    }

    #[test]
    fn source_splits_on_the_first_colon_only() {
        let spec = SourceSpec::parse("SQLite:file:shop.db").expect("has a colon");
        assert_eq!(spec.key(), "SQLite");
        assert_eq!(spec.payload(), "file:shop.db");
        assert_eq!(spec.to_string(), "SQLite:file:shop.db");

        let spec = SourceSpec::parse("CSVPipeInput:").expect("empty payload is fine");
        assert_eq!(spec.payload(), "");

        assert!(SourceSpec::parse("CSVFile").is_none());
    }

    #[test]
    fn resolve_hands_the_payload_to_the_registered_factory() {
        let mut registry = CategoryLoaderRegistry::empty("category loader");
        registry.register("Fixed", fixed);

        let loader = registry
            .resolve("Fixed:a:b", &context())
            .expect("registered key resolves");
        assert_eq!(payload_of(loader), "a:b");
    }

    #[test]
    fn missing_colon_or_unknown_key_is_not_found() {
        let mut registry = CategoryLoaderRegistry::empty("category loader");
        registry.register("Fixed", fixed);

        assert!(registry.resolve("Fixed", &context()).is_none());
        assert!(registry.resolve("Other:payload", &context()).is_none());
        assert!(registry
            .build(&SourceSpec::new("fixed", ""), &context())
            .is_none());
    }

    #[test]
    fn aliases_share_the_target_factory() {
        let mut registry = CategoryLoaderRegistry::empty("category loader");
        registry.register("Fixed", fixed);

        assert!(registry.register_alias("db", "Fixed"));
        assert!(!registry.register_alias("ghost", "Missing"));
        assert_eq!(registry.keys(), vec!["Fixed", "db"]);

        let loader = registry
            .resolve("db:payload", &context())
            .expect("alias resolves");
        assert_eq!(payload_of(loader), "payload");
    }

    #[test]
    fn alias_pairs_parse_and_unknown_targets_are_skipped() {
        assert_eq!(
            LoaderAlias::parse(" db = Fixed "),
            Some(LoaderAlias {
                alias: "db".to_string(),
                target: "Fixed".to_string(),
            })
        );
        assert!(LoaderAlias::parse("db").is_none());
        assert!(LoaderAlias::parse("=Fixed").is_none());

        let mut registry = CategoryLoaderRegistry::empty("category loader");
        registry.register("Fixed", fixed);
        registry.apply_aliases(&[
            LoaderAlias::parse("db=Fixed").expect("valid pair"),
            LoaderAlias::parse("ghost=Missing").expect("valid pair"),
        ]);

        assert!(registry.contains("db"));
        assert!(!registry.contains("ghost"));
    }

    #[test]
    fn builtin_registries_know_file_and_pipe_sources() {
        let categories = CategoryLoaderRegistry::with_builtin();
        let items = ItemLoaderRegistry::with_builtin();

        for key in [delimited::FILE_KEY, delimited::PIPE_KEY] {
            assert!(categories.contains(key), "category registry lacks {key}");
            assert!(items.contains(key), "item registry lacks {key}");
        }
        #[cfg(feature = "sqlite")]
        {
            assert!(categories.contains(crate::loaders::sqlite::KEY));
            assert!(items.contains(crate::loaders::sqlite::KEY));
        }
    }
}
