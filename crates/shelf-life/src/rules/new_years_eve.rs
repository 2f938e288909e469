use super::Rule;
use crate::inventory::Item;
use chrono::{Datelike, NaiveDate};

/// Seasonal goods sold only in December and January.
///
/// Before new year's eve the base price applies, on the eve itself a quality
/// surcharge is added, and afterwards the price starts at half the base price
/// and keeps dropping by 0.5 per day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NewYearsEve;

impl NewYearsEve {
    pub const KEY: &'static str = "NewYearsEve";

    /// December 31st the price is measured against. Days in the first half of
    /// the year look back to the previous eve.
    pub fn reference_eve(day: NaiveDate) -> Option<NaiveDate> {
        let year = if day.month() <= 6 {
            day.year() - 1
        } else {
            day.year()
        };
        NaiveDate::from_ymd_opt(year, 12, 31)
    }
}

impl Rule for NewYearsEve {
    fn implementation(&self) -> &'static str {
        Self::KEY
    }

    fn quality(&self, item: &Item, _day: NaiveDate) -> i32 {
        item.quality()
    }

    fn price(&self, item: &Item, day: NaiveDate) -> f64 {
        let Some(eve) = Self::reference_eve(day) else {
            return item.base_price();
        };
        let days_overdue = (eve - day).num_days();

        match days_overdue {
            0 => item.base_price() + f64::from(item.quality()) * 0.1,
            d if d < 0 => item.base_price() * 0.5 + 0.5 * d as f64,
            _ => item.base_price(),
        }
    }

    fn should_remove(&self, item: &Item, day: NaiveDate) -> bool {
        day > item.due_date() || !matches!(day.month(), 1 | 12)
    }
}
