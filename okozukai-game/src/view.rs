//! Read-only projection consumed by presentation layers.
use serde::{Deserialize, Serialize};

use crate::constants::MONTHS_PER_YEAR;
use crate::data::Goal;
use crate::events::MonthEvent;
use crate::month::MonthStep;
use crate::numbers::i64_to_f64;
use crate::state::Stats;

/// Calendar month shown to the player; month 13 is January of the next year.
#[must_use]
pub const fn display_month(month: u32) -> u32 {
    if month == 0 {
        return 0;
    }
    (month - 1) % MONTHS_PER_YEAR + 1
}

#[must_use]
pub fn month_label(month: u32) -> String {
    format!("{}月", display_month(month))
}

/// `min(money / goal * 100, 100)`; negative balances give negative progress.
#[must_use]
pub fn progress_percent(money: i64, goal_price: i64) -> f64 {
    if goal_price <= 0 {
        return 100.0;
    }
    (i64_to_f64(money) / i64_to_f64(goal_price) * 100.0).min(100.0)
}

/// Colour hint for the remaining-amount panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifferenceTone {
    Reached,
    OnTrack,
    /// Less than half of the goal saved.
    Behind,
}

impl DifferenceTone {
    #[must_use]
    pub fn classify(money: i64, goal_price: i64) -> Self {
        if goal_price - money <= 0 {
            Self::Reached
        } else if money.saturating_mul(2) < goal_price {
            Self::Behind
        } else {
            Self::OnTrack
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignView {
    pub goal: Goal,
    pub money: i64,
    pub progress_percent: f64,
    /// Money minus planned savings to date.
    pub plan_difference: i64,
    pub remaining: i64,
    pub tone: DifferenceTone,
    pub current_month: u32,
    pub month_label: String,
    pub months_elapsed: u32,
    pub planned_months: u32,
    pub monthly_savings: i64,
    pub stats: Stats,
    pub step: MonthStep,
    pub events: Vec<MonthEvent>,
}

impl CampaignView {
    /// Whether the pending step needs a buy/resist answer.
    #[must_use]
    pub const fn awaiting_decision(&self) -> bool {
        self.step.needs_decision()
    }
}
