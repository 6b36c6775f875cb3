//! Budget planning: expenses, savings, and months-to-goal.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::GameConfig;
use crate::data::{CatalogItem, Goal};
use crate::numbers::{ceil_div, i64_to_u32_saturating};

/// Snapshot of a catalog item the player committed to buying every month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringPurchase {
    pub item_id: String,
    pub item_name: String,
    pub price: i64,
}

impl From<&CatalogItem> for RecurringPurchase {
    fn from(item: &CatalogItem) -> Self {
        Self {
            item_id: item.id.clone(),
            item_name: item.name.clone(),
            price: item.price,
        }
    }
}

/// Months needed to reach a goal, or a plan that can never get there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "months", rename_all = "snake_case")]
pub enum RequiredMonths {
    Feasible(u32),
    Infeasible,
}

impl RequiredMonths {
    #[must_use]
    pub const fn months(self) -> Option<u32> {
        match self {
            Self::Feasible(months) => Some(months),
            Self::Infeasible => None,
        }
    }
}

impl fmt::Display for RequiredMonths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Feasible(months) => write!(f, "{months}"),
            Self::Infeasible => f.write_str("∞"),
        }
    }
}

/// Planning verdict shown next to the start button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    /// Savings are zero or negative; starting is blocked.
    Infeasible,
    /// Reachable, but slower than the configured month cap. Starting is allowed.
    FeasibleLong,
    Feasible,
}

impl PlanStatus {
    #[must_use]
    pub const fn can_start(self) -> bool {
        !matches!(self, Self::Infeasible)
    }
}

#[must_use]
pub fn monthly_expense(purchases: &[RecurringPurchase]) -> i64 {
    purchases.iter().map(|p| p.price).sum()
}

#[must_use]
pub fn monthly_savings(allowance: i64, purchases: &[RecurringPurchase]) -> i64 {
    allowance - monthly_expense(purchases)
}

#[must_use]
pub fn required_months(goal_price: i64, monthly_savings: i64) -> RequiredMonths {
    match ceil_div(goal_price, monthly_savings) {
        Some(months) => RequiredMonths::Feasible(i64_to_u32_saturating(months)),
        None => RequiredMonths::Infeasible,
    }
}

#[must_use]
pub fn classify(required: RequiredMonths, max_months: u32) -> PlanStatus {
    match required {
        RequiredMonths::Infeasible => PlanStatus::Infeasible,
        RequiredMonths::Feasible(months) if months > max_months => PlanStatus::FeasibleLong,
        RequiredMonths::Feasible(_) => PlanStatus::Feasible,
    }
}

/// Actual money minus what the plan says should have been saved by now.
#[must_use]
pub fn plan_difference(actual_money: i64, monthly_savings: i64, months_elapsed: u32) -> i64 {
    actual_money - monthly_savings * i64::from(months_elapsed)
}

/// Derived numbers for the planning screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub monthly_expense: i64,
    pub monthly_savings: i64,
    pub required_months: RequiredMonths,
    pub status: PlanStatus,
}

/// Goal plus recurring purchases, edited during planning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CampaignPlan {
    pub selected_goal: Option<Goal>,
    #[serde(default)]
    pub recurring_purchases: Vec<RecurringPurchase>,
}

impl CampaignPlan {
    #[must_use]
    pub fn new(goal: Goal) -> Self {
        Self {
            selected_goal: Some(goal),
            recurring_purchases: Vec::new(),
        }
    }

    /// Pick a goal; the recurring list starts over.
    pub fn select_goal(&mut self, goal: Goal) {
        self.selected_goal = Some(goal);
        self.recurring_purchases.clear();
    }

    #[must_use]
    pub fn with_recurring(mut self, item: &CatalogItem) -> Self {
        if !self.has_recurring(&item.id) {
            self.recurring_purchases.push(item.into());
        }
        self
    }

    /// Add the item, or remove it if already selected. Returns true when it is now selected.
    pub fn toggle_recurring(&mut self, item: &CatalogItem) -> bool {
        if self.remove_recurring(&item.id) {
            false
        } else {
            self.recurring_purchases.push(item.into());
            true
        }
    }

    /// Returns true when an entry was removed.
    pub fn remove_recurring(&mut self, item_id: &str) -> bool {
        let before = self.recurring_purchases.len();
        self.recurring_purchases.retain(|p| p.item_id != item_id);
        self.recurring_purchases.len() != before
    }

    #[must_use]
    pub fn has_recurring(&self, item_id: &str) -> bool {
        self.recurring_purchases.iter().any(|p| p.item_id == item_id)
    }

    #[must_use]
    pub fn monthly_expense(&self) -> i64 {
        monthly_expense(&self.recurring_purchases)
    }

    /// `None` until a goal is selected.
    #[must_use]
    pub fn summary(&self, cfg: &GameConfig) -> Option<PlanSummary> {
        let goal = self.selected_goal.as_ref()?;
        let expense = self.monthly_expense();
        let savings = cfg.monthly_allowance - expense;
        let required = required_months(goal.price, savings);
        Some(PlanSummary {
            monthly_expense: expense,
            monthly_savings: savings,
            required_months: required,
            status: classify(required, cfg.max_months),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, price: i64) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            name: id.to_uppercase(),
            price,
            image: None,
        }
    }

    fn goal(price: i64) -> Goal {
        Goal {
            id: String::from("goal"),
            name: String::from("Goal"),
            price,
            image: None,
        }
    }

    #[test]
    fn required_months_rounds_up_and_covers_goal() {
        for allowance in [1_i64, 7, 500, 999] {
            for expense in [0_i64, 1, 120, 450] {
                let savings = allowance - expense;
                for price in [1_i64, 1500, 1501, 6000] {
                    match required_months(price, savings) {
                        RequiredMonths::Feasible(months) => {
                            assert!(savings > 0);
                            let months = i64::from(months);
                            assert!(months * savings >= price);
                            assert!((months - 1) * savings < price);
                        }
                        RequiredMonths::Infeasible => assert!(savings <= 0),
                    }
                }
            }
        }
    }

    #[test]
    fn non_positive_savings_is_infeasible_regardless_of_goal() {
        let purchases = vec![RecurringPurchase::from(&item("minicar", 600))];
        let savings = monthly_savings(500, &purchases);
        assert_eq!(savings, -100);
        for price in [1, 1500, 1_000_000] {
            let required = required_months(price, savings);
            assert_eq!(required, RequiredMonths::Infeasible);
            assert!(!classify(required, 12).can_start());
        }
        assert_eq!(required_months(1500, 0), RequiredMonths::Infeasible);
    }

    #[test]
    fn classification_is_three_way() {
        assert_eq!(classify(RequiredMonths::Feasible(12), 12), PlanStatus::Feasible);
        assert_eq!(
            classify(RequiredMonths::Feasible(13), 12),
            PlanStatus::FeasibleLong
        );
        assert!(PlanStatus::FeasibleLong.can_start());
        assert_eq!(classify(RequiredMonths::Infeasible, 12), PlanStatus::Infeasible);
    }

    #[test]
    fn plan_difference_is_signed() {
        assert_eq!(plan_difference(1000, 400, 2), 200);
        assert_eq!(plan_difference(300, 400, 2), -500);
        assert_eq!(plan_difference(-100, 500, 1), -600);
    }

    #[test]
    fn toggling_keeps_recurring_unique() {
        let mut plan = CampaignPlan::new(goal(1500));
        let snack = item("snack", 150);
        assert!(plan.toggle_recurring(&snack));
        assert!(!plan.toggle_recurring(&snack));
        assert!(plan.recurring_purchases.is_empty());

        plan = plan.with_recurring(&snack).with_recurring(&snack);
        assert_eq!(plan.recurring_purchases.len(), 1);
        assert!(plan.remove_recurring("snack"));
        assert!(!plan.remove_recurring("snack"));
    }

    #[test]
    fn selecting_goal_clears_recurring() {
        let mut plan = CampaignPlan::new(goal(1500)).with_recurring(&item("juice", 120));
        plan.select_goal(goal(2500));
        assert!(plan.recurring_purchases.is_empty());
        assert_eq!(plan.selected_goal.as_ref().map(|g| g.price), Some(2500));
    }

    #[test]
    fn summary_flags_long_plans() {
        let cfg = GameConfig::default();
        let plan = CampaignPlan::new(goal(6000)).with_recurring(&item("comic", 450));
        let summary = plan.summary(&cfg).unwrap();
        assert_eq!(summary.monthly_expense, 450);
        assert_eq!(summary.monthly_savings, 50);
        assert_eq!(summary.required_months, RequiredMonths::Feasible(120));
        assert_eq!(summary.status, PlanStatus::FeasibleLong);

        assert!(CampaignPlan::default().summary(&cfg).is_none());
    }
}
