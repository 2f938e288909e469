//! Category behavior: how quality, price and shelf removal evolve per day.

mod cheese;
mod general;
mod new_years_eve;
mod registry;
mod wine;

pub use cheese::Cheese;
pub use general::GeneralProduct;
pub use new_years_eve::NewYearsEve;
pub use registry::{RuleConstructor, RuleRegistry};
pub use wine::Wine;

use crate::inventory::Item;
use chrono::NaiveDate;
use std::fmt;

/// Price value meaning "not computed yet" for rules that price an item once.
pub const UNSET_PRICE: f64 = 0.0;

/// Pure state transition shared by every item of a category.
///
/// `price` and `should_remove` are evaluated after `quality` for the same day,
/// so they observe the freshly computed quality on the item snapshot.
pub trait Rule: fmt::Debug + Send + Sync {
    /// Key under which the rule is registered and referenced by category rows.
    fn implementation(&self) -> &'static str;

    fn quality(&self, item: &Item, day: NaiveDate) -> i32;

    fn price(&self, item: &Item, day: NaiveDate) -> f64;

    fn should_remove(&self, item: &Item, day: NaiveDate) -> bool;
}

/// Base price plus a surcharge of a tenth per quality point.
pub(crate) fn quality_adjusted_price(item: &Item) -> f64 {
    item.base_price() + 0.1 * f64::from(item.quality())
}
