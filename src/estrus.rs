//! Per-day estrus calendar.
//!
//! The stored per-record flag is the only source of truth for estrus days.
//! A day's flag is its first record's flag, the same reduction the
//! small-multiples panels use, so the chart subtitle and the panels agree.

use std::collections::BTreeMap;

use crate::panels::partition_by_day;
use crate::sample::Sample;
use crate::state::DayRange;

/// Estrus flag per recorded day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EstrusCalendar {
    days: BTreeMap<u32, bool>,
}

impl EstrusCalendar {
    /// Derive the calendar from raw samples.
    pub fn from_samples(samples: &[Sample]) -> Self {
        let days = partition_by_day(samples)
            .into_values()
            .map(|group| (group.day, group.estrus))
            .collect();
        Self { days }
    }

    /// Whether a day is flagged. Days without records are not.
    pub fn is_estrus(&self, day: u32) -> bool {
        self.days.get(&day).copied().unwrap_or(false)
    }

    /// Flagged days inside a range, ascending.
    pub fn estrus_days(&self, range: DayRange) -> Vec<u32> {
        self.days
            .range(range.low()..=range.high())
            .filter_map(|(day, estrus)| estrus.then_some(*day))
            .collect()
    }

    /// Number of flagged days inside a range.
    pub fn count_in(&self, range: DayRange) -> u32 {
        self.days
            .range(range.low()..=range.high())
            .filter(|(_, estrus)| **estrus)
            .count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_flagged_days_in_range() {
        let samples: Vec<Sample> = (0..8)
            .flat_map(|day| {
                (0..3).map(move |bin| Sample::new(day, bin).with_estrus(day % 4 == 2))
            })
            .collect();
        let calendar = EstrusCalendar::from_samples(&samples);
        assert_eq!(calendar.estrus_days(DayRange::ordered(0, 7)), vec![2, 6]);
        assert_eq!(calendar.count_in(DayRange::ordered(3, 7)), 1);
        assert_eq!(calendar.count_in(DayRange::single(0)), 0);
        assert!(!calendar.is_estrus(40));
    }

    #[test]
    fn first_record_decides_the_day() {
        let samples = [
            Sample::new(1, 1).with_estrus(true),
            Sample::new(1, 0).with_estrus(false),
        ];
        let calendar = EstrusCalendar::from_samples(&samples);
        assert!(calendar.is_estrus(1));
    }
}
