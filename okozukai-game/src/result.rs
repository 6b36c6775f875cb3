//! End-of-campaign result calculation
use serde::{Deserialize, Serialize};

/// How a campaign finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignEnding {
    /// Money reached the goal price at a month end.
    GoalReached,
    /// A temptation purchase drove money below zero.
    Overspent,
    /// The planned months ran out before the goal was reached.
    PlanExpired,
}

impl CampaignEnding {
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::GoalReached)
    }
}

impl std::fmt::Display for CampaignEnding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GoalReached => write!(f, "goal_reached"),
            Self::Overspent => write!(f, "overspent"),
            Self::PlanExpired => write!(f, "plan_expired"),
        }
    }
}

/// Record shown on the result screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub ending: CampaignEnding,
    pub goal_id: String,
    pub goal_name: String,
    pub goal_price: i64,
    pub planned_months: u32,
    pub actual_months: u32,
    pub final_money: i64,
    pub resisted_temptations: u32,
    pub gave_in_temptations: u32,
}

impl ResultSummary {
    #[must_use]
    pub const fn success(&self) -> bool {
        self.ending.is_success()
    }

    /// Months saved against the plan; negative when the plan ran over.
    #[must_use]
    pub fn months_ahead_of_plan(&self) -> i64 {
        i64::from(self.planned_months) - i64::from(self.actual_months)
    }
}
