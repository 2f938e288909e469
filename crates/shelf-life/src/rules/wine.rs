use super::{quality_adjusted_price, Rule, UNSET_PRICE};
use crate::inventory::Item;
use chrono::NaiveDate;

/// Appreciating goods: quality grows after the due date, the price is fixed
/// the first time it is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Wine;

impl Wine {
    pub const KEY: &'static str = "Wine";

    const MAX_QUALITY: i32 = 50;
    const DAYS_PER_QUALITY_POINT: i64 = 10;
}

impl Rule for Wine {
    fn implementation(&self) -> &'static str {
        Self::KEY
    }

    fn quality(&self, item: &Item, day: NaiveDate) -> i32 {
        let days_overdue = (day - item.due_date()).num_days();
        let gain = (days_overdue / Self::DAYS_PER_QUALITY_POINT).max(0);
        let gain = i32::try_from(gain).unwrap_or(i32::MAX);

        item.quality()
            .saturating_add(gain)
            .min(Self::MAX_QUALITY)
    }

    fn price(&self, item: &Item, _day: NaiveDate) -> f64 {
        if item.price() == UNSET_PRICE {
            quality_adjusted_price(item)
        } else {
            item.price()
        }
    }

    fn should_remove(&self, item: &Item, _day: NaiveDate) -> bool {
        item.quality() < 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{assert_close, item_with};
    use chrono::Duration;

    fn due_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 28).expect("valid due date")
    }

    #[test]
    fn gains_a_point_per_ten_days_past_due_up_to_fifty() {
        let item = item_with(Wine, 48, 2.6, due_date(), due_date());
        let after = |days: i64| due_date() + Duration::days(days);

        let expected = [
            (0, 48),
            (9, 48),
            (10, 49),
            (11, 49),
            (19, 49),
            (20, 50),
            (21, 50),
            (30, 50),
            (31, 50),
            (32, 50),
        ];
        for (days, quality) in expected {
            assert_eq!(Wine.quality(&item, after(days)), quality, "+{days} days");
        }
    }

    #[test]
    fn no_gain_before_the_due_date() {
        let item = item_with(Wine, 10, 2.6, due_date(), due_date());
        assert_eq!(Wine.quality(&item, due_date() - Duration::days(25)), 10);
    }

    #[test]
    fn price_is_computed_once() {
        let mut item = item_with(Wine, 48, 2.6, due_date(), due_date());
        assert_close(item.price(), 7.4, "initial wine price");

        for days in 0..110 {
            item.update(due_date() + Duration::days(days));
            assert_close(item.price(), 7.4, "wine price after update");
        }
        assert_eq!(item.quality(), 50);
    }

    #[test]
    fn only_negative_quality_is_removed() {
        for quality in -110..110 {
            let item = item_with(Wine, quality, 2.6, due_date(), due_date());
            assert_eq!(item.should_remove(), quality < 0, "quality {quality}");
        }

        let item = item_with(Wine, 48, 2.6, due_date(), due_date());
        for days in -110..110 {
            assert!(!Wine.should_remove(&item, due_date() + Duration::days(days)));
        }
    }
}
