//! Low-stock policy primitives.
//!
//! The boolean low-stock flag and the coarser status tier are independent
//! signals; inventory views surface both.

use serde::{Deserialize, Serialize};

/// Low-stock threshold: 10% of shelf capacity, floor of one unit.
pub fn low_stock_threshold(max_stock: i32) -> i32 {
    if max_stock <= 0 {
        return 1;
    }
    ((max_stock as u32).div_ceil(10) as i32).max(1)
}

/// A product is low on stock when it holds fewer units than the threshold.
pub fn is_low_stock(current_stock: i32, max_stock: i32) -> bool {
    current_stock < low_stock_threshold(max_stock)
}

/// Fill ratio in percent, clamped to 0..=100.
pub fn stock_ratio_percent(current_stock: i32, max_stock: i32) -> i32 {
    if max_stock <= 0 {
        return 0;
    }
    let ratio = (f64::from(current_stock) / f64::from(max_stock) * 100.0).round() as i64;
    ratio.clamp(0, 100) as i32
}

/// Status tier shown next to the low-stock flag in inventory views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Critical,
    Warning,
    Ok,
}

impl StockStatus {
    pub fn from_levels(current_stock: i32, max_stock: i32) -> Self {
        let ratio = stock_ratio_percent(current_stock, max_stock);
        if ratio <= 10 {
            StockStatus::Critical
        } else if ratio <= 30 {
            StockStatus::Warning
        } else {
            StockStatus::Ok
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 1)]
    #[case(5, 1)]
    #[case(10, 1)]
    #[case(11, 2)]
    #[case(100, 10)]
    #[case(101, 11)]
    #[case(250, 25)]
    #[case(i32::MAX, 214_748_365)]
    fn threshold_is_ten_percent_rounded_up_with_floor_of_one(
        #[case] max_stock: i32,
        #[case] expected: i32,
    ) {
        assert_eq!(low_stock_threshold(max_stock), expected);
    }

    #[test]
    fn low_stock_is_strict_comparison_against_threshold() {
        // threshold for 100 is 10
        assert!(is_low_stock(9, 100));
        assert!(!is_low_stock(10, 100));
        assert!(!is_low_stock(11, 100));
    }

    #[rstest]
    #[case(0, 100, StockStatus::Critical)]
    #[case(10, 100, StockStatus::Critical)]
    #[case(11, 100, StockStatus::Warning)]
    #[case(30, 100, StockStatus::Warning)]
    #[case(31, 100, StockStatus::Ok)]
    #[case(100, 100, StockStatus::Ok)]
    fn status_tiers_follow_ratio_bounds(
        #[case] current: i32,
        #[case] max: i32,
        #[case] expected: StockStatus,
    ) {
        assert_eq!(StockStatus::from_levels(current, max), expected);
    }

    #[test]
    fn ratio_is_clamped_to_hundred() {
        assert_eq!(stock_ratio_percent(150, 100), 100);
        assert_eq!(stock_ratio_percent(-5, 100), 0);
    }

    #[test]
    fn status_and_flag_disagree_between_threshold_and_warning_band() {
        // 25 of 100: not low stock (threshold 10) but still in the warning tier
        assert!(!is_low_stock(25, 100));
        assert_eq!(StockStatus::from_levels(25, 100), StockStatus::Warning);
    }
}
