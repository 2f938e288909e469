use crate::rules::Rule;
use std::collections::HashMap;
use std::sync::Arc;

/// Named product category bound to the rule its items follow.
///
/// Categories are immutable and shared by every item that references them.
#[derive(Debug, Clone)]
pub struct Category {
    name: String,
    rule: Arc<dyn Rule>,
}

impl Category {
    pub fn new(name: impl Into<String>, rule: Arc<dyn Rule>) -> Self {
        Self {
            name: name.into(),
            rule,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rule(&self) -> &dyn Rule {
        self.rule.as_ref()
    }
}

/// Same name and same rule implementation.
impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.rule.implementation() == other.rule.implementation()
    }
}

/// Categories of one run, keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryMap {
    categories: HashMap<String, Arc<Category>>,
}

impl CategoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a category, returning the one previously stored under its name.
    pub fn insert(&mut self, category: Category) -> Option<Arc<Category>> {
        self.categories
            .insert(category.name.clone(), Arc::new(category))
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Category>> {
        self.categories.get(name)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.categories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl FromIterator<Category> for CategoryMap {
    fn from_iter<T: IntoIterator<Item = Category>>(iter: T) -> Self {
        let mut map = Self::new();
        for category in iter {
            map.insert(category);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Cheese, GeneralProduct, Wine};

    #[test]
    fn equality_needs_matching_name_and_rule() {
        let general = Category::new("general", Arc::new(GeneralProduct));
        assert_eq!(general, Category::new("general", Arc::new(GeneralProduct)));
        assert_ne!(general, Category::new("general", Arc::new(Cheese)));
        assert_ne!(general, Category::new("bread", Arc::new(GeneralProduct)));
    }

    #[test]
    fn map_lookup_by_name() {
        let map: CategoryMap = [
            Category::new("general", Arc::new(GeneralProduct)),
            Category::new("wine", Arc::new(Wine)),
        ]
        .into_iter()
        .collect();

        assert_eq!(map.len(), 2);
        assert_eq!(map.names(), vec!["general", "wine"]);
        assert_eq!(
            map.get("wine").map(|category| category.rule().implementation()),
            Some(Wine::KEY)
        );
        assert!(map.get("cheese").is_none());
    }

    #[test]
    fn reinserting_a_name_replaces_the_category() {
        let mut map = CategoryMap::new();
        assert!(map
            .insert(Category::new("house", Arc::new(GeneralProduct)))
            .is_none());
        let previous = map
            .insert(Category::new("house", Arc::new(Wine)))
            .expect("previous category returned");

        assert_eq!(previous.rule().implementation(), GeneralProduct::KEY);
        assert_eq!(map.len(), 1);
    }
}
