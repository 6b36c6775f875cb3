//! Mutable campaign ledger: player balance, calendar position, and counters.
use serde::{Deserialize, Serialize};

use crate::month::MonthSimulator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// May go negative; a purchase that does so ends the campaign.
    pub money: i64,
    pub monthly_allowance: i64,
}

impl Player {
    #[must_use]
    pub const fn new(monthly_allowance: i64) -> Self {
        Self {
            money: 0,
            monthly_allowance,
        }
    }
}

/// Lifetime temptation counters; they only ever grow during a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Stats {
    pub resisted_temptations: u32,
    pub gave_in_temptations: u32,
}

/// Calendar position plus the month currently in progress.
///
/// `current_month` keeps counting past 12; only the display wraps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignState {
    pub current_month: u32,
    pub start_month: u32,
    pub month: MonthSimulator,
}

impl CampaignState {
    #[must_use]
    pub fn new(start_month: u32, max_temptations: u32) -> Self {
        Self {
            current_month: start_month,
            start_month,
            month: MonthSimulator::begin(start_month, max_temptations),
        }
    }

    /// Months played so far, counting the current one.
    #[must_use]
    pub const fn months_elapsed(&self) -> u32 {
        self.current_month.saturating_sub(self.start_month) + 1
    }

    /// Move to the next month and reset the per-month log.
    pub fn advance_month(&mut self, max_temptations: u32) {
        self.current_month += 1;
        self.month = MonthSimulator::begin(self.current_month, max_temptations);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::month::StepKind;

    #[test]
    fn months_elapsed_counts_current_month() {
        let mut state = CampaignState::new(4, 2);
        assert_eq!(state.months_elapsed(), 1);
        for expected in 2..=14 {
            state.advance_month(2);
            assert_eq!(state.months_elapsed(), expected);
        }
        assert_eq!(state.current_month, 17);
        assert_eq!(state.month.month(), 17);
        assert_eq!(state.month.step().kind(), StepKind::Allowance);
        assert!(state.month.events().is_empty());
    }
}
