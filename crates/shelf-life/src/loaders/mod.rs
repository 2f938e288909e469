//! Data sources for categories and items, and the registries that build them
//! from `key:payload` configuration strings.

pub mod delimited;
mod registry;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use registry::{
    CategoryLoaderRegistry, ItemLoaderRegistry, LoaderAlias, LoaderFactory, LoaderRegistry,
    SourceSpec,
};

use crate::inventory::{Category, CategoryMap, Item};
use crate::rules::RuleRegistry;
use crate::view::Reporter;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Produces the category map of a run.
pub trait CategoryLoader {
    /// Rows that cannot be used are reported as warnings and skipped; only an
    /// unreachable source is an error.
    fn fetch_categories(&self) -> Result<CategoryMap, DataAccessError>;
}

/// Produces the items a run starts with.
pub trait ItemLoader {
    /// Every item is created with `start` as its joining day. Rows that cannot
    /// be used are reported as warnings and skipped.
    fn fetch_items(
        &self,
        start: NaiveDate,
        categories: &CategoryMap,
    ) -> Result<Vec<Item>, DataAccessError>;
}

/// The underlying source could not be read at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("could not load {resource}: {reason}")]
pub struct DataAccessError {
    pub resource: String,
    pub reason: String,
}

impl DataAccessError {
    pub fn new(resource: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            resource: resource.into(),
            reason: reason.to_string(),
        }
    }
}

/// Which kind of rows a warning refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    Categories,
    Items,
}

impl Dataset {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Categories => "category",
            Self::Items => "item",
        }
    }

    pub const fn field_count(self) -> usize {
        match self {
            Self::Categories => 2,
            Self::Items => 5,
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A row that was dropped while loading. Processing continues after each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowWarning {
    #[error("{dataset} row skipped, expected exactly {expected} fields but got {actual}: {line}")]
    FieldCount {
        dataset: Dataset,
        expected: usize,
        actual: usize,
        line: String,
    },
    #[error("item row skipped, category '{category}' not found: {line}")]
    UnknownCategory { category: String, line: String },
    #[error("category '{category}' skipped, no rule registered as '{implementation}'")]
    UnknownRule {
        implementation: String,
        category: String,
    },
    #[error("item row skipped, not a valid number: {line}")]
    InvalidNumber { line: String },
    #[error("item row skipped, not a valid date: {line}")]
    InvalidDate { line: String },
}

/// Resolves a category row's implementation key, warning when it is unknown.
pub(crate) fn resolve_category(
    name: &str,
    implementation: &str,
    context: &LoaderContext,
) -> Option<Category> {
    match context.rules().resolve(implementation) {
        Some(rule) => Some(Category::new(name, rule)),
        None => {
            tracing::debug!(category = name, implementation, "unknown rule implementation");
            context.reporter().warning(&RowWarning::UnknownRule {
                implementation: implementation.to_string(),
                category: name.to_string(),
            });
            None
        }
    }
}

/// Looks up the category an item row references, warning when it is unknown.
pub(crate) fn lookup_category(
    categories: &CategoryMap,
    name: &str,
    line: &str,
    reporter: &dyn Reporter,
) -> Option<Arc<Category>> {
    let category = categories.get(name).cloned();
    if category.is_none() {
        tracing::debug!(category = name, "unknown category referenced");
        reporter.warning(&RowWarning::UnknownCategory {
            category: name.to_string(),
            line: line.to_string(),
        });
    }
    category
}

/// Collaborators handed to every loader factory.
#[derive(Clone)]
pub struct LoaderContext {
    reporter: Arc<dyn Reporter>,
    rules: Arc<RuleRegistry>,
}

impl LoaderContext {
    pub fn new(reporter: Arc<dyn Reporter>, rules: Arc<RuleRegistry>) -> Self {
        Self { reporter, rules }
    }

    pub fn reporter(&self) -> &dyn Reporter {
        self.reporter.as_ref()
    }

    pub fn rules(&self) -> &RuleRegistry {
        &self.rules
    }
}

impl fmt::Debug for LoaderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderContext")
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}
