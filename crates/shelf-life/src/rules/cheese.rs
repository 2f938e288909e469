use super::{quality_adjusted_price, Rule};
use crate::inventory::Item;
use chrono::{Days, NaiveDate};

/// Perishable goods that lose one quality point per day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cheese;

impl Cheese {
    pub const KEY: &'static str = "Cheese";

    const MIN_QUALITY: i32 = 30;
    const LATEST_DAYS_BEFORE_DUE: u64 = 50;
    const EARLIEST_DAYS_BEFORE_DUE: u64 = 100;
}

impl Rule for Cheese {
    fn implementation(&self) -> &'static str {
        Self::KEY
    }

    // No floor: quality keeps dropping below zero if the item stays around.
    fn quality(&self, item: &Item, _day: NaiveDate) -> i32 {
        item.quality().saturating_sub(1)
    }

    fn price(&self, item: &Item, _day: NaiveDate) -> f64 {
        quality_adjusted_price(item)
    }

    fn should_remove(&self, item: &Item, day: NaiveDate) -> bool {
        let due = item.due_date();
        // A window edge before the earliest representable date lies behind
        // every day: "after latest" holds, "before earliest" does not.
        let past_latest = due
            .checked_sub_days(Days::new(Self::LATEST_DAYS_BEFORE_DUE))
            .map_or(true, |latest| day > latest);
        let before_earliest = due
            .checked_sub_days(Days::new(Self::EARLIEST_DAYS_BEFORE_DUE))
            .is_some_and(|earliest| day < earliest);

        item.quality() < Self::MIN_QUALITY || past_latest || before_earliest
    }
}
