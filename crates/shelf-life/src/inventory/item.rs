use super::Category;
use crate::rules::UNSET_PRICE;
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;

/// One inventory row bound to its category.
///
/// Quality, price and the removal flag are only ever written by the
/// category's rule: once at construction for the day the item joins the
/// simulation, then once per simulated day through [`Item::update`].
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    category: Arc<Category>,
    name: String,
    base_price: f64,
    due_date: NaiveDate,
    quality: i32,
    price: f64,
    remove: bool,
}

impl Item {
    /// Creates an item and evaluates price and removal for `joined_on`
    /// without advancing quality.
    pub fn new(
        category: Arc<Category>,
        name: impl Into<String>,
        quality: i32,
        base_price: f64,
        due_date: NaiveDate,
        joined_on: NaiveDate,
    ) -> Self {
        let mut item = Self {
            category,
            name: name.into(),
            base_price,
            due_date,
            quality,
            price: UNSET_PRICE,
            remove: false,
        };

        item.price = item.category.rule().price(&item, joined_on);
        item.remove = item.category.rule().should_remove(&item, joined_on);
        item
    }

    /// Applies one day: quality first, then price and removal against the new
    /// quality.
    pub fn update(&mut self, day: NaiveDate) {
        self.quality = self.category.rule().quality(self, day);
        self.price = self.category.rule().price(self, day);
        self.remove = self.category.rule().should_remove(self, day);
    }

    pub fn category(&self) -> &Arc<Category> {
        &self.category
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_price(&self) -> f64 {
        self.base_price
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn quality(&self) -> i32 {
        self.quality
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn should_remove(&self) -> bool {
        self.remove
    }

    pub fn to_view(&self) -> ItemView {
        ItemView {
            name: self.name.clone(),
            category: self.category.name().to_string(),
            base_price: self.base_price,
            due_date: self.due_date,
            quality: self.quality,
            price: self.price,
            remove: self.remove,
        }
    }
}

/// Serializable snapshot of an item for renderers and recorded runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemView {
    pub name: String,
    pub category: String,
    pub base_price: f64,
    pub due_date: NaiveDate,
    pub quality: i32,
    pub price: f64,
    pub remove: bool,
}
