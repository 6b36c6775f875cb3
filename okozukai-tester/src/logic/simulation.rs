use anyhow::{Context, Result, bail};
use okozukai_game::{
    CampaignController, CampaignPlan, Catalog, GameConfig, MonthStep, ResultSummary, StepOutcome,
    TemptationChoice,
};
use std::sync::Arc;

use crate::logic::policy::{GameplayStrategy, PlayerPolicy};

/// Configuration for a simulation session.
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    pub seed: u64,
    pub strategy: GameplayStrategy,
    pub max_steps: u32,
}

impl SimulationConfig {
    #[must_use]
    pub fn new(strategy: GameplayStrategy, seed: u64) -> Self {
        Self {
            seed,
            strategy,
            max_steps: 10_000,
        }
    }

    #[must_use]
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }
}

/// Snapshot of a resolved temptation.
#[derive(Debug, Clone)]
pub struct DecisionRecord {
    pub month: u32,
    pub item_id: String,
    pub price: i64,
    pub money_before: i64,
    pub choice: TemptationChoice,
    pub policy_name: String,
    pub rationale: Option<String>,
}

/// One finished campaign.
#[derive(Debug, Clone)]
pub struct SimulationRun {
    pub seed: u64,
    pub strategy: GameplayStrategy,
    pub result: ResultSummary,
    pub decisions: Vec<DecisionRecord>,
    pub steps: u32,
}

impl SimulationRun {
    /// Money spent on temptations the policy chose to buy.
    #[must_use]
    pub fn temptation_spend(&self) -> i64 {
        self.decisions
            .iter()
            .filter(|d| d.choice == TemptationChoice::Buy)
            .map(|d| d.price)
            .sum()
    }
}

/// Core deterministic simulation harness used by the tester.
pub struct SimulationSession {
    controller: CampaignController,
    policy: Box<dyn PlayerPolicy + Send>,
    config: SimulationConfig,
    decisions: Vec<DecisionRecord>,
    steps: u32,
}

impl SimulationSession {
    /// Start a campaign for `plan` on the seeded event stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the plan cannot start.
    pub fn start(
        game_config: &GameConfig,
        catalog: Arc<Catalog>,
        plan: &CampaignPlan,
        config: SimulationConfig,
    ) -> Result<Self> {
        let mut controller = CampaignController::seeded(game_config.clone(), catalog, config.seed);
        controller
            .start_campaign(plan)
            .with_context(|| format!("starting campaign for seed {}", config.seed))?;
        Ok(Self {
            controller,
            policy: config.strategy.create_policy(config.seed),
            config,
            decisions: Vec::new(),
            steps: 0,
        })
    }

    /// Advance by one acknowledgement or decision.
    ///
    /// # Errors
    ///
    /// Returns an error if the controller rejects the action.
    pub fn advance(&mut self) -> Result<StepOutcome> {
        let view = self
            .controller
            .view()
            .context("no campaign is running")?;
        self.steps += 1;
        let outcome = if let MonthStep::AwaitingTemptation { item } = &view.step {
            let decision = self.policy.decide(item, &view);
            let record = DecisionRecord {
                month: view.current_month,
                item_id: item.id.clone(),
                price: item.price,
                money_before: view.money,
                choice: decision.choice,
                policy_name: self.policy.name().to_string(),
                rationale: decision.rationale,
            };
            log::trace!(
                "{} month {}: {:?} {} ({}) holding {}{}",
                record.policy_name,
                record.month,
                record.choice,
                record.item_id,
                record.price,
                record.money_before,
                record.rationale.as_deref().map(|r| format!(" [{r}]")).unwrap_or_default()
            );
            let choice = record.choice;
            self.decisions.push(record);
            self.controller.decide(choice)?
        } else {
            self.controller.acknowledge()?
        };
        Ok(outcome)
    }

    /// Play until the campaign ends.
    ///
    /// # Errors
    ///
    /// Returns an error if the campaign has not ended within `max_steps`.
    pub fn run_to_end(mut self) -> Result<SimulationRun> {
        while self.steps < self.config.max_steps {
            if let StepOutcome::Finished(result) = self.advance()? {
                log::debug!(
                    "seed {} {}: {} after {} steps",
                    self.config.seed,
                    self.config.strategy,
                    result.ending,
                    self.steps
                );
                return Ok(SimulationRun {
                    seed: self.config.seed,
                    strategy: self.config.strategy,
                    result,
                    decisions: self.decisions,
                    steps: self.steps,
                });
            }
        }
        bail!(
            "campaign for seed {} did not finish within {} steps",
            self.config.seed,
            self.config.max_steps
        )
    }
}

/// Run one full campaign per strategy and seed.
///
/// # Errors
///
/// Returns the first simulation failure.
pub fn run_matrix(
    game_config: &GameConfig,
    catalog: &Arc<Catalog>,
    plan: &CampaignPlan,
    strategies: &[GameplayStrategy],
    seeds: &[u64],
) -> Result<Vec<SimulationRun>> {
    let mut runs = Vec::with_capacity(strategies.len() * seeds.len());
    for &strategy in strategies {
        for &seed in seeds {
            let config = SimulationConfig::new(strategy, seed);
            let session = SimulationSession::start(game_config, Arc::clone(catalog), plan, config)?;
            runs.push(session.run_to_end()?);
        }
    }
    Ok(runs)
}
