//! Campaign controller: owns the ledger and decides how each month ends.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

use crate::config::GameConfig;
use crate::data::{Catalog, Goal};
use crate::month::{MonthContext, MonthProgress, MonthStep, StepError, TemptationChoice};
use crate::plan::{CampaignPlan, PlanStatus, PlanSummary, RecurringPurchase, monthly_expense};
use crate::random::{RandomSource, SeededRandom};
use crate::result::{CampaignEnding, ResultSummary};
use crate::snapshot::CampaignSnapshot;
use crate::state::{CampaignState, Player, Stats};
use crate::view::{CampaignView, DifferenceTone, month_label, progress_percent};
use crate::{constants, plan};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CampaignError {
    #[error("no campaign is in progress")]
    NoActiveCampaign,
    #[error("a goal must be selected before starting")]
    NoGoalSelected,
    #[error("plan cannot start: {status:?}")]
    PlanBlocked { status: PlanStatus },
    #[error("recurring purchase {item_id} is listed more than once")]
    DuplicateRecurring { item_id: String },
    #[error("snapshot version {found} is not supported (expected {expected})")]
    SnapshotVersion { found: u32, expected: u32 },
    #[error("snapshot stream position {draws} exceeds {limit}")]
    SnapshotCursor { draws: u64, limit: u64 },
    #[error(transparent)]
    Step(#[from] StepError),
}

/// A player action fed into the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "choice", rename_all = "snake_case")]
pub enum PlayerAction {
    Acknowledge,
    Decide(TemptationChoice),
}

/// Result of one accepted action.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The campaign continues; this step is now waiting.
    Continue(MonthStep),
    Finished(ResultSummary),
}

impl StepOutcome {
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::Finished(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignPhase {
    Idle,
    Playing,
    Finished(CampaignEnding),
}

/// Everything that changes while a campaign runs. The plan half is frozen at start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveCampaign {
    pub goal: Goal,
    pub recurring_purchases: Vec<RecurringPurchase>,
    pub planned_months: u32,
    pub player: Player,
    pub state: CampaignState,
    pub stats: Stats,
}

impl ActiveCampaign {
    #[must_use]
    pub fn recurring_expense(&self) -> i64 {
        monthly_expense(&self.recurring_purchases)
    }

    #[must_use]
    pub fn monthly_savings(&self) -> i64 {
        self.player.monthly_allowance - self.recurring_expense()
    }

    fn result(&self, ending: CampaignEnding) -> ResultSummary {
        ResultSummary {
            ending,
            goal_id: self.goal.id.clone(),
            goal_name: self.goal.name.clone(),
            goal_price: self.goal.price,
            planned_months: self.planned_months,
            actual_months: self.state.months_elapsed(),
            final_money: self.player.money,
            resisted_temptations: self.stats.resisted_temptations,
            gave_in_temptations: self.stats.gave_in_temptations,
        }
    }
}

/// Single owner of all mutable game state; callers only move it through actions.
pub struct CampaignController {
    config: GameConfig,
    catalog: Arc<Catalog>,
    rng: Box<dyn RandomSource>,
    active: Option<ActiveCampaign>,
    last_result: Option<ResultSummary>,
}

impl CampaignController {
    #[must_use]
    pub fn new(config: GameConfig, catalog: Arc<Catalog>, rng: Box<dyn RandomSource>) -> Self {
        Self {
            config,
            catalog,
            rng,
            active: None,
            last_result: None,
        }
    }

    #[must_use]
    pub fn seeded(config: GameConfig, catalog: Arc<Catalog>, seed: u64) -> Self {
        Self::new(config, catalog, Box::new(SeededRandom::from_seed(seed)))
    }

    /// Rebuild a running campaign from a snapshot.
    ///
    /// A snapshot carrying a stream cursor resumes that stream; otherwise `rng` is used.
    ///
    /// # Errors
    ///
    /// Returns `CampaignError::SnapshotVersion` for snapshots written by another format version.
    pub fn restore(
        config: GameConfig,
        catalog: Arc<Catalog>,
        snapshot: CampaignSnapshot,
        rng: Box<dyn RandomSource>,
    ) -> Result<Self, CampaignError> {
        let mut controller = Self::new(config, catalog, rng);
        controller.load_snapshot(snapshot)?;
        Ok(controller)
    }

    /// Replace any running campaign with the snapshot's.
    ///
    /// # Errors
    ///
    /// Returns `CampaignError::SnapshotVersion` when the snapshot format does not match and
    /// `CampaignError::SnapshotCursor` when its stream position is out of range. The
    /// controller is left untouched in both cases.
    pub fn load_snapshot(&mut self, snapshot: CampaignSnapshot) -> Result<(), CampaignError> {
        if snapshot.version != constants::SNAPSHOT_VERSION {
            return Err(CampaignError::SnapshotVersion {
                found: snapshot.version,
                expected: constants::SNAPSHOT_VERSION,
            });
        }
        if let Some(cursor) = snapshot.rng
            && cursor.draws > constants::MAX_RESUME_DRAWS
        {
            return Err(CampaignError::SnapshotCursor {
                draws: cursor.draws,
                limit: constants::MAX_RESUME_DRAWS,
            });
        }
        if let Some(cursor) = snapshot.rng {
            self.rng = Box::new(SeededRandom::resume(cursor));
        }
        log::info!(
            "restored campaign at month {} (money {})",
            snapshot.campaign.state.current_month,
            snapshot.campaign.player.money
        );
        self.active = Some(snapshot.campaign);
        self.last_result = None;
        Ok(())
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn active(&self) -> Option<&ActiveCampaign> {
        self.active.as_ref()
    }

    /// Result of the most recently finished campaign.
    #[must_use]
    pub const fn last_result(&self) -> Option<&ResultSummary> {
        self.last_result.as_ref()
    }

    #[must_use]
    pub fn phase(&self) -> CampaignPhase {
        match (&self.active, &self.last_result) {
            (Some(_), _) => CampaignPhase::Playing,
            (None, Some(result)) => CampaignPhase::Finished(result.ending),
            (None, None) => CampaignPhase::Idle,
        }
    }

    /// Start playing a plan. Planned months are frozen here.
    ///
    /// # Errors
    ///
    /// Returns `NoGoalSelected` without a goal, `DuplicateRecurring` when an item is
    /// listed twice, and `PlanBlocked` when savings are not positive.
    pub fn start_campaign(&mut self, plan: &CampaignPlan) -> Result<PlanSummary, CampaignError> {
        let Some(goal) = plan.selected_goal.clone() else {
            return Err(CampaignError::NoGoalSelected);
        };
        let mut seen = HashSet::new();
        if let Some(dup) = plan
            .recurring_purchases
            .iter()
            .find(|p| !seen.insert(p.item_id.as_str()))
        {
            return Err(CampaignError::DuplicateRecurring {
                item_id: dup.item_id.clone(),
            });
        }
        let summary = plan.summary(&self.config).ok_or(CampaignError::NoGoalSelected)?;
        let Some(planned_months) = summary.required_months.months() else {
            return Err(CampaignError::PlanBlocked {
                status: summary.status,
            });
        };
        if summary.status == PlanStatus::FeasibleLong {
            log::info!(
                "starting long plan: {planned_months} months exceeds {}",
                self.config.max_months
            );
        }

        log::info!(
            "campaign started: goal {} ({}), {} planned months, savings {}/month",
            goal.id,
            goal.price,
            planned_months,
            summary.monthly_savings
        );
        self.active = Some(ActiveCampaign {
            goal,
            recurring_purchases: plan.recurring_purchases.clone(),
            planned_months,
            player: Player::new(self.config.monthly_allowance),
            state: CampaignState::new(self.config.start_month, self.config.temptations_per_month),
            stats: Stats::default(),
        });
        self.last_result = None;
        Ok(summary)
    }

    /// Acknowledge the pending reveal step.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveCampaign` after the campaign ended, or a step error while a
    /// temptation awaits a decision.
    pub fn acknowledge(&mut self) -> Result<StepOutcome, CampaignError> {
        self.apply(PlayerAction::Acknowledge)
    }

    /// Answer the pending temptation.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveCampaign` after the campaign ended, or a step error when no
    /// temptation is pending.
    pub fn decide(&mut self, choice: TemptationChoice) -> Result<StepOutcome, CampaignError> {
        self.apply(PlayerAction::Decide(choice))
    }

    /// Feed one action into the month state machine.
    ///
    /// # Errors
    ///
    /// See [`Self::acknowledge`] and [`Self::decide`].
    pub fn apply(&mut self, action: PlayerAction) -> Result<StepOutcome, CampaignError> {
        let Some(active) = self.active.as_mut() else {
            return Err(CampaignError::NoActiveCampaign);
        };
        let mut ctx = MonthContext {
            config: &self.config,
            catalog: &self.catalog,
            recurring_expense: active.recurring_expense(),
            rng: &mut *self.rng,
        };
        let progress = match action {
            PlayerAction::Acknowledge => {
                active.state.month.acknowledge(&mut active.player, &mut ctx)?
            }
            PlayerAction::Decide(choice) => active.state.month.resolve_temptation(
                choice,
                &mut active.player,
                &mut active.stats,
                &mut ctx,
            )?,
        };

        match progress {
            MonthProgress::Pending => Ok(StepOutcome::Continue(active.state.month.step().clone())),
            MonthProgress::Overspent => self.finish(CampaignEnding::Overspent),
            MonthProgress::MonthComplete => self.check_game_end(),
        }
    }

    fn check_game_end(&mut self) -> Result<StepOutcome, CampaignError> {
        let Some(active) = self.active.as_mut() else {
            return Err(CampaignError::NoActiveCampaign);
        };
        if active.player.money >= active.goal.price {
            return self.finish(CampaignEnding::GoalReached);
        }
        if active.state.months_elapsed() >= active.planned_months {
            return self.finish(CampaignEnding::PlanExpired);
        }
        active
            .state
            .advance_month(self.config.temptations_per_month);
        log::debug!(
            "advanced to month {} ({} of {})",
            active.state.current_month,
            active.state.months_elapsed(),
            active.planned_months
        );
        Ok(StepOutcome::Continue(active.state.month.step().clone()))
    }

    fn finish(&mut self, ending: CampaignEnding) -> Result<StepOutcome, CampaignError> {
        let Some(active) = self.active.take() else {
            return Err(CampaignError::NoActiveCampaign);
        };
        let result = active.result(ending);
        log::info!(
            "campaign finished: {ending} after {} months with {} (goal {})",
            result.actual_months,
            result.final_money,
            result.goal_price
        );
        self.last_result = Some(result.clone());
        Ok(StepOutcome::Finished(result))
    }

    /// Drop any running campaign and the last result.
    pub fn reset(&mut self) {
        if self.active.take().is_some() {
            log::info!("campaign reset");
        }
        self.last_result = None;
    }

    /// Flat, serializable copy of the running campaign.
    #[must_use]
    pub fn snapshot(&self) -> Option<CampaignSnapshot> {
        self.active.as_ref().map(|active| CampaignSnapshot {
            version: constants::SNAPSHOT_VERSION,
            campaign: active.clone(),
            rng: self.rng.cursor(),
        })
    }

    /// Projection for rendering money, progress, month, and the pending step.
    #[must_use]
    pub fn view(&self) -> Option<CampaignView> {
        let active = self.active.as_ref()?;
        let money = active.player.money;
        let goal_price = active.goal.price;
        let months_elapsed = active.state.months_elapsed();
        let monthly_savings = active.monthly_savings();
        Some(CampaignView {
            goal: active.goal.clone(),
            money,
            progress_percent: progress_percent(money, goal_price),
            plan_difference: plan::plan_difference(money, monthly_savings, months_elapsed),
            remaining: (goal_price - money).max(0),
            tone: DifferenceTone::classify(money, goal_price),
            current_month: active.state.current_month,
            month_label: month_label(active.state.current_month),
            months_elapsed,
            planned_months: active.planned_months,
            monthly_savings,
            stats: active.stats,
            step: active.state.month.step().clone(),
            events: active.state.month.events().to_vec(),
        })
    }
}
