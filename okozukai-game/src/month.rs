//! Single-month state machine.
//!
//! A month walks through `AwaitingAllowance → AwaitingRecurringAck →
//! AwaitingHappeningAck → AwaitingTemptation × N → MonthEndAck`. The recurring
//! and happening acknowledgements are skipped when there is nothing to show.
//! Every step waits for an explicit acknowledgement or decision from the caller.
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::GameConfig;
use crate::data::{Catalog, CatalogItem, HappeningDef};
use crate::events::{EventGenerator, MonthEvent, MonthEventLog};
use crate::random::RandomSource;
use crate::state::{Player, Stats};

/// The buy/resist answer to a temptation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemptationChoice {
    Buy,
    Resist,
}

/// Display-only recap shown at month end. It never touches the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSummary {
    pub month: u32,
    pub allowance: i64,
    pub temptation_spend: i64,
    /// Allowance minus accepted temptations; recurring cost was charged at month start.
    pub month_savings: i64,
    pub money: i64,
}

/// The step currently waiting on the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum MonthStep {
    AwaitingAllowance,
    AwaitingRecurringAck { expense: i64 },
    AwaitingHappeningAck { happening: HappeningDef },
    AwaitingTemptation { item: CatalogItem },
    MonthEndAck { summary: MonthSummary },
}

impl MonthStep {
    #[must_use]
    pub const fn kind(&self) -> StepKind {
        match self {
            Self::AwaitingAllowance => StepKind::Allowance,
            Self::AwaitingRecurringAck { .. } => StepKind::RecurringAck,
            Self::AwaitingHappeningAck { .. } => StepKind::HappeningAck,
            Self::AwaitingTemptation { .. } => StepKind::Temptation,
            Self::MonthEndAck { .. } => StepKind::MonthEnd,
        }
    }

    /// Whether the step waits for a buy/resist decision rather than an acknowledgement.
    #[must_use]
    pub const fn needs_decision(&self) -> bool {
        matches!(self, Self::AwaitingTemptation { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Allowance,
    RecurringAck,
    HappeningAck,
    Temptation,
    MonthEnd,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Allowance => "allowance",
            Self::RecurringAck => "recurring_ack",
            Self::HappeningAck => "happening_ack",
            Self::Temptation => "temptation",
            Self::MonthEnd => "month_end",
        })
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StepError {
    #[error("a temptation is waiting for a buy or resist decision")]
    DecisionRequired,
    #[error("no temptation is pending (current step: {step})")]
    NoDecisionPending { step: StepKind },
}

/// What the month machine reports back after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthProgress {
    /// A new step is waiting.
    Pending,
    /// The month-end recap was acknowledged.
    MonthComplete,
    /// A purchase drove the balance below zero.
    Overspent,
}

/// Everything a month transition reads besides the ledger.
pub struct MonthContext<'a> {
    pub config: &'a GameConfig,
    pub catalog: &'a Catalog,
    pub recurring_expense: i64,
    pub rng: &'a mut dyn RandomSource,
}

impl MonthContext<'_> {
    fn generator(&self) -> EventGenerator {
        EventGenerator::new(self.config.happening_probability)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthSimulator {
    month: u32,
    step: MonthStep,
    temptations_this_month: u32,
    max_temptations_this_month: u32,
    #[serde(default)]
    events: MonthEventLog,
}

impl MonthSimulator {
    #[must_use]
    pub fn begin(month: u32, max_temptations: u32) -> Self {
        Self {
            month,
            step: MonthStep::AwaitingAllowance,
            temptations_this_month: 0,
            max_temptations_this_month: max_temptations,
            events: MonthEventLog::new(),
        }
    }

    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }

    #[must_use]
    pub const fn step(&self) -> &MonthStep {
        &self.step
    }

    #[must_use]
    pub const fn temptations_this_month(&self) -> u32 {
        self.temptations_this_month
    }

    #[must_use]
    pub const fn max_temptations_this_month(&self) -> u32 {
        self.max_temptations_this_month
    }

    #[must_use]
    pub fn events(&self) -> &[MonthEvent] {
        &self.events
    }

    /// Advance past the current acknowledgement step.
    ///
    /// # Errors
    ///
    /// Returns `StepError::DecisionRequired` while a temptation is pending.
    pub fn acknowledge(
        &mut self,
        player: &mut Player,
        ctx: &mut MonthContext<'_>,
    ) -> Result<MonthProgress, StepError> {
        match self.step.kind() {
            StepKind::Allowance => {
                player.money += player.monthly_allowance - ctx.recurring_expense;
                log::debug!(
                    "month {}: allowance {} credited, recurring {} debited, money {}",
                    self.month,
                    player.monthly_allowance,
                    ctx.recurring_expense,
                    player.money
                );
                if ctx.recurring_expense > 0 {
                    self.step = MonthStep::AwaitingRecurringAck {
                        expense: ctx.recurring_expense,
                    };
                } else {
                    self.enter_happening(player, ctx);
                }
                Ok(MonthProgress::Pending)
            }
            StepKind::RecurringAck => {
                self.enter_happening(player, ctx);
                Ok(MonthProgress::Pending)
            }
            StepKind::HappeningAck => {
                self.advance_temptation(player, ctx);
                Ok(MonthProgress::Pending)
            }
            StepKind::Temptation => Err(StepError::DecisionRequired),
            StepKind::MonthEnd => Ok(MonthProgress::MonthComplete),
        }
    }

    /// Resolve the pending temptation.
    ///
    /// # Errors
    ///
    /// Returns `StepError::NoDecisionPending` when the current step is an acknowledgement.
    pub fn resolve_temptation(
        &mut self,
        choice: TemptationChoice,
        player: &mut Player,
        stats: &mut Stats,
        ctx: &mut MonthContext<'_>,
    ) -> Result<MonthProgress, StepError> {
        let MonthStep::AwaitingTemptation { item } = &self.step else {
            return Err(StepError::NoDecisionPending {
                step: self.step.kind(),
            });
        };
        let item = item.clone();

        match choice {
            TemptationChoice::Resist => {
                stats.resisted_temptations = stats.resisted_temptations.saturating_add(1);
                log::debug!("month {}: resisted {}", self.month, item.id);
                self.events.push(MonthEvent::Temptation {
                    item,
                    accepted: false,
                });
            }
            TemptationChoice::Buy => {
                let new_money = player.money - item.price;
                player.money = new_money;
                let overspent = new_money < 0;
                if !overspent {
                    stats.gave_in_temptations = stats.gave_in_temptations.saturating_add(1);
                }
                log::debug!(
                    "month {}: bought {} for {}, money {}",
                    self.month,
                    item.id,
                    item.price,
                    new_money
                );
                self.events.push(MonthEvent::Temptation {
                    item,
                    accepted: true,
                });
                if overspent {
                    return Ok(MonthProgress::Overspent);
                }
            }
        }

        self.advance_temptation(player, ctx);
        Ok(MonthProgress::Pending)
    }

    fn enter_happening(&mut self, player: &mut Player, ctx: &mut MonthContext<'_>) {
        let generator = ctx.generator();
        match generator.roll_happening(&mut *ctx.rng, &ctx.catalog.happenings) {
            Some(happening) => {
                player.money += happening.amount;
                log::debug!(
                    "month {}: happening {:+} ({}), money {}",
                    self.month,
                    happening.amount,
                    happening.message,
                    player.money
                );
                self.events.push(MonthEvent::happening(&happening));
                self.step = MonthStep::AwaitingHappeningAck { happening };
            }
            None => self.advance_temptation(player, ctx),
        }
    }

    fn advance_temptation(&mut self, player: &Player, ctx: &mut MonthContext<'_>) {
        if self.temptations_this_month < self.max_temptations_this_month {
            let generator = ctx.generator();
            if let Some(item) = generator.draw_temptation(&mut *ctx.rng, &ctx.catalog.items) {
                self.temptations_this_month += 1;
                self.step = MonthStep::AwaitingTemptation { item };
                return;
            }
        }
        self.step = MonthStep::MonthEndAck {
            summary: self.summary(player),
        };
    }

    fn summary(&self, player: &Player) -> MonthSummary {
        let temptation_spend: i64 = self.events.iter().map(MonthEvent::temptation_spend).sum();
        MonthSummary {
            month: self.month,
            allowance: player.monthly_allowance,
            temptation_spend,
            month_savings: player.monthly_allowance - temptation_spend,
            money: player.money,
        }
    }
}
