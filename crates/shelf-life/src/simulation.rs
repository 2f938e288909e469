//! Day-by-day driver of an inventory run.

use crate::inventory::{CategoryMap, Item};
use crate::loaders::{CategoryLoader, DataAccessError, ItemLoader};
use crate::view::InventoryView;
use chrono::NaiveDate;
use std::sync::Arc;

/// The active set of items, owned exclusively by one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shelf {
    items: Vec<Item>,
    removed: usize,
}

impl Shelf {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items, removed: 0 }
    }

    /// Drops every item flagged on an earlier evaluation, then updates the
    /// survivors for `day`. Items flagged by this update stay until the next
    /// call. Returns how many items were dropped.
    pub fn advance(&mut self, day: NaiveDate) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !item.should_remove());
        let dropped = before - self.items.len();
        self.removed += dropped;

        for item in &mut self.items {
            item.update(day);
        }
        dropped
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Items dropped since the shelf was stocked.
    pub fn removed(&self) -> usize {
        self.removed
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub loaded: usize,
    pub days: usize,
    pub removed: usize,
    pub remaining: usize,
}

pub struct ShelfSimulation {
    categories: Box<dyn CategoryLoader>,
    items: Box<dyn ItemLoader>,
    view: Arc<dyn InventoryView>,
}

impl ShelfSimulation {
    pub fn new(
        categories: Box<dyn CategoryLoader>,
        items: Box<dyn ItemLoader>,
        view: Arc<dyn InventoryView>,
    ) -> Self {
        Self {
            categories,
            items,
            view,
        }
    }

    /// Loads the category map, then the items joining on `start`.
    pub fn load(&self, start: NaiveDate) -> Result<Vec<Item>, DataAccessError> {
        let categories: CategoryMap = self.categories.fetch_categories()?;
        tracing::debug!(categories = categories.len(), "category map built");
        self.items.fetch_items(start, &categories)
    }

    /// Runs the load phase and steps every day from `start` to `end`
    /// inclusive. A load failure is reported to the view and returned; no day
    /// is stepped then.
    pub fn execute(&self, start: NaiveDate, end: NaiveDate) -> Result<RunSummary, DataAccessError> {
        tracing::info!(%start, %end, "starting shelf simulation");

        let items = match self.load(start) {
            Ok(items) => items,
            Err(err) => {
                tracing::error!(error = %err, "load failed, simulation not started");
                self.view.error(&err);
                return Err(err);
            }
        };

        let loaded = items.len();
        self.view.inventory(&items);
        let mut shelf = Shelf::new(items);

        let mut days = 0usize;
        let mut day = start;
        while day <= end {
            let dropped = shelf.advance(day);
            tracing::debug!(%day, dropped, remaining = shelf.items().len(), "day stepped");
            self.view.day(day, shelf.items());
            days += 1;

            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }

        self.view.done();

        let summary = RunSummary {
            loaded,
            days,
            removed: shelf.removed(),
            remaining: shelf.items().len(),
        };
        tracing::info!(
            loaded = summary.loaded,
            days = summary.days,
            removed = summary.removed,
            remaining = summary.remaining,
            "shelf simulation finished"
        );
        Ok(summary)
    }
}
