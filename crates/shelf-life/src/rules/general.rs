use super::{quality_adjusted_price, Rule};
use crate::inventory::Item;
use chrono::NaiveDate;

/// Ordinary goods: constant quality, removed once the due date has passed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneralProduct;

impl GeneralProduct {
    pub const KEY: &'static str = "GeneralProduct";
}

impl Rule for GeneralProduct {
    fn implementation(&self) -> &'static str {
        Self::KEY
    }

    fn quality(&self, item: &Item, _day: NaiveDate) -> i32 {
        item.quality()
    }

    fn price(&self, item: &Item, _day: NaiveDate) -> f64 {
        quality_adjusted_price(item)
    }

    fn should_remove(&self, item: &Item, day: NaiveDate) -> bool {
        day > item.due_date()
    }
}
