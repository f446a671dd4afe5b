//! Month view of practice history.
//!
//! Days before the session date come from a seeded history; the session date
//! itself always reflects the live completed count from the store.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

/// How strongly a day is shaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Intensity {
    None,
    Low,
    Medium,
    High,
}

impl Intensity {
    /// 0 → none, 1–2 → low, 3–4 → medium, 5+ → high.
    pub fn from_count(count: u32) -> Intensity {
        match count {
            0 => Intensity::None,
            1..=2 => Intensity::Low,
            3..=4 => Intensity::Medium,
            _ => Intensity::High,
        }
    }
}

/// One cell of the month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub day: u32,
    pub completed: u32,
    pub intensity: Intensity,
    pub is_today: bool,
}

/// Completions recorded for the month of the session date.
#[derive(Debug, Clone)]
pub struct CompletionHistory {
    today: NaiveDate,
    days: BTreeMap<u32, u32>,
}

/// Per-day completions used to seed earlier days of the month.
const SEED_PATTERN: [u32; 21] = [4, 3, 5, 2, 4, 3, 4, 5, 3, 4, 2, 3, 5, 4, 3, 4, 5, 3, 4, 2, 5];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthSummary {
    pub total_completed: u32,
    pub streak_days: u32,
    pub best_day: u32,
}

impl CompletionHistory {
    /// History with every day before `today` in its month filled from the seed pattern.
    pub fn seeded(today: NaiveDate) -> Self {
        let days = (1..today.day())
            .map(|d| (d, SEED_PATTERN[(d as usize - 1) % SEED_PATTERN.len()]))
            .collect();
        CompletionHistory { today, days }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Completions on `day` of the month, with today's value supplied live.
    pub fn count(&self, day: u32, today_completed: u32) -> u32 {
        if day == self.today.day() {
            today_completed
        } else {
            self.days.get(&day).copied().unwrap_or(0)
        }
    }

    /// Sunday-first grid rows; `None` pads before the 1st and after the last day.
    pub fn month_grid(&self, today_completed: u32) -> Vec<[Option<DayCell>; 7]> {
        let first = first_of_month(self.today);
        let lead = first.weekday().num_days_from_sunday() as usize;
        let total = days_in_month(self.today);

        let mut cells: Vec<Option<DayCell>> = vec![None; lead];
        for day in 1..=total {
            let completed = self.count(day, today_completed);
            cells.push(Some(DayCell {
                day,
                completed,
                intensity: Intensity::from_count(completed),
                is_today: day == self.today.day(),
            }));
        }
        while cells.len() % 7 != 0 {
            cells.push(None);
        }
        cells
            .chunks(7)
            .map(|w| [w[0], w[1], w[2], w[3], w[4], w[5], w[6]])
            .collect()
    }

    /// Totals for the month up to and including today.
    pub fn summary(&self, today_completed: u32) -> MonthSummary {
        let today = self.today.day();
        let counts: Vec<u32> = (1..=today).map(|d| self.count(d, today_completed)).collect();
        let streak_days = counts.iter().rev().take_while(|c| **c > 0).count() as u32;
        MonthSummary {
            total_completed: counts.iter().sum(),
            streak_days,
            best_day: counts.iter().copied().max().unwrap_or(0),
        }
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Number of days in the month containing `date`.
pub fn days_in_month(date: NaiveDate) -> u32 {
    let (y, m) = (date.year(), date.month());
    let next = if m == 12 {
        NaiveDate::from_ymd_opt(y + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(y, m + 1, 1)
    };
    match next {
        Some(n) => (n - Duration::days(1)).day(),
        None => 31,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nov22() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 22).unwrap()
    }

    #[test]
    fn test_intensity_thresholds() {
        assert_eq!(Intensity::from_count(0), Intensity::None);
        assert_eq!(Intensity::from_count(2), Intensity::Low);
        assert_eq!(Intensity::from_count(3), Intensity::Medium);
        assert_eq!(Intensity::from_count(4), Intensity::Medium);
        assert_eq!(Intensity::from_count(5), Intensity::High);
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(nov22()), 30);
        assert_eq!(days_in_month(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap()), 29);
        assert_eq!(days_in_month(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()), 31);
    }

    #[test]
    fn test_grid_leading_blanks_match_weekday() {
        // 2025-11-01 is a Saturday.
        let history = CompletionHistory::seeded(nov22());
        let grid = history.month_grid(1);
        assert!(grid[0][..6].iter().all(|c| c.is_none()));
        assert_eq!(grid[0][6].map(|c| c.day), Some(1));
        let cells: Vec<DayCell> = grid.iter().flatten().flatten().copied().collect();
        assert_eq!(cells.len(), 30);
        let today = cells.iter().find(|c| c.is_today).unwrap();
        assert_eq!((today.day, today.completed), (22, 1));
        assert_eq!(cells[22].completed, 0);
    }

    #[test]
    fn test_summary_uses_live_today() {
        let history = CompletionHistory::seeded(nov22());
        let with_today = history.summary(3);
        let without = history.summary(0);
        assert_eq!(with_today.total_completed, without.total_completed + 3);
        assert_eq!(with_today.streak_days, 22);
        assert_eq!(without.streak_days, 0);
        assert_eq!(with_today.best_day, 5);
    }

    #[test]
    fn test_first_of_month_has_empty_history() {
        let history = CompletionHistory::seeded(NaiveDate::from_ymd_opt(2025, 11, 1).unwrap());
        assert_eq!(history.summary(0).total_completed, 0);
    }
}
