//! Controller bound to a storage backend.
use std::sync::Arc;

use crate::campaign::{CampaignController, CampaignError, CampaignPhase, StepOutcome};
use crate::config::GameConfig;
use crate::data::Catalog;
use crate::month::TemptationChoice;
use crate::plan::{CampaignPlan, PlanSummary};
use crate::random::RandomSource;
use crate::result::ResultSummary;
use crate::storage::CampaignStorage;
use crate::view::CampaignView;

/// Saves after every transition and clears the slot once a campaign ends.
///
/// Storage failures are logged and otherwise ignored; the in-memory campaign stays authoritative.
pub struct CampaignSession<S>
where
    S: CampaignStorage,
{
    controller: CampaignController,
    storage: S,
}

impl<S> CampaignSession<S>
where
    S: CampaignStorage,
{
    #[must_use]
    pub const fn new(controller: CampaignController, storage: S) -> Self {
        Self {
            controller,
            storage,
        }
    }

    /// Pick up a stored campaign if one exists, otherwise start idle.
    ///
    /// Unreadable or incompatible saves are dropped.
    #[must_use]
    pub fn resume(
        config: GameConfig,
        catalog: Arc<Catalog>,
        rng: Box<dyn RandomSource>,
        storage: S,
    ) -> Self {
        let stored = match storage.load() {
            Ok(stored) => stored,
            Err(err) => {
                log::warn!("could not read saved campaign: {err}");
                None
            }
        };
        let mut controller = CampaignController::new(config, catalog, rng);
        let Some(snapshot) = stored else {
            return Self::new(controller, storage);
        };
        let loaded = controller.load_snapshot(snapshot);
        let session = Self::new(controller, storage);
        if let Err(err) = loaded {
            log::warn!("discarding saved campaign: {err}");
            session.clear_storage();
        }
        session
    }

    #[must_use]
    pub const fn controller(&self) -> &CampaignController {
        &self.controller
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub fn phase(&self) -> CampaignPhase {
        self.controller.phase()
    }

    #[must_use]
    pub fn view(&self) -> Option<CampaignView> {
        self.controller.view()
    }

    #[must_use]
    pub const fn last_result(&self) -> Option<&ResultSummary> {
        self.controller.last_result()
    }

    /// # Errors
    ///
    /// See [`CampaignController::start_campaign`].
    pub fn start_campaign(&mut self, plan: &CampaignPlan) -> Result<PlanSummary, CampaignError> {
        let summary = self.controller.start_campaign(plan)?;
        self.persist();
        Ok(summary)
    }

    /// # Errors
    ///
    /// See [`CampaignController::acknowledge`].
    pub fn acknowledge(&mut self) -> Result<StepOutcome, CampaignError> {
        let outcome = self.controller.acknowledge()?;
        self.after_step(&outcome);
        Ok(outcome)
    }

    /// # Errors
    ///
    /// See [`CampaignController::decide`].
    pub fn decide(&mut self, choice: TemptationChoice) -> Result<StepOutcome, CampaignError> {
        let outcome = self.controller.decide(choice)?;
        self.after_step(&outcome);
        Ok(outcome)
    }

    pub fn reset(&mut self) {
        self.controller.reset();
        self.clear_storage();
    }

    #[must_use]
    pub fn into_parts(self) -> (CampaignController, S) {
        (self.controller, self.storage)
    }

    fn after_step(&self, outcome: &StepOutcome) {
        match outcome {
            StepOutcome::Continue(_) => self.persist(),
            StepOutcome::Finished(_) => self.clear_storage(),
        }
    }

    fn persist(&self) {
        let Some(snapshot) = self.controller.snapshot() else {
            return;
        };
        if let Err(err) = self.storage.save(&snapshot) {
            log::warn!("could not save campaign: {err}");
        }
    }

    fn clear_storage(&self) {
        if let Err(err) = self.storage.clear() {
            log::warn!("could not clear saved campaign: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SeededRandom;
    use crate::constants::SNAPSHOT_VERSION;
    use crate::month::MonthStep;
    use crate::random::{RngCursor, SequenceRandom};
    use crate::storage::MemoryStorage;

    fn catalog() -> Arc<Catalog> {
        Arc::new(Catalog::load_from_static().unwrap())
    }

    fn plan(catalog: &Catalog) -> CampaignPlan {
        CampaignPlan::new(catalog.goal("board-game").unwrap().clone())
    }

    #[test]
    fn saves_each_transition_and_clears_on_reset() {
        let catalog = catalog();
        let storage = MemoryStorage::new();
        let controller =
            CampaignController::seeded(GameConfig::default(), Arc::clone(&catalog), 99);
        let mut session = CampaignSession::new(controller, storage.clone());

        session.start_campaign(&plan(&catalog)).unwrap();
        let stored = storage.load().unwrap().unwrap();
        assert_eq!(stored.version, SNAPSHOT_VERSION);
        assert_eq!(stored.campaign.state.month.step(), &MonthStep::AwaitingAllowance);

        session.acknowledge().unwrap();
        let stored = storage.load().unwrap().unwrap();
        assert_eq!(stored.campaign.player.money, session.view().unwrap().money);

        session.reset();
        assert!(storage.is_empty());
        assert_eq!(session.phase(), CampaignPhase::Idle);
    }

    #[test]
    fn finished_campaign_clears_the_slot() {
        let catalog = catalog();
        let storage = MemoryStorage::new();
        let controller = CampaignController::new(
            GameConfig::default(),
            Arc::clone(&catalog),
            // No happenings and always the most expensive temptation.
            Box::new(SequenceRandom::constant(0.99)),
        );
        let mut session = CampaignSession::new(controller, storage.clone());
        session.start_campaign(&plan(&catalog)).unwrap();
        session.acknowledge().unwrap();
        let outcome = session.decide(TemptationChoice::Buy).unwrap();
        assert!(outcome.is_finished());
        assert!(storage.is_empty());
        assert!(session.last_result().is_some());
    }

    #[test]
    fn resume_continues_the_same_stream() {
        let catalog = catalog();
        let storage = MemoryStorage::new();
        let controller =
            CampaignController::seeded(GameConfig::default(), Arc::clone(&catalog), 2024);
        let mut original = CampaignSession::new(controller, storage.clone());
        original.start_campaign(&plan(&catalog)).unwrap();
        original.acknowledge().unwrap();

        let mut resumed = CampaignSession::resume(
            GameConfig::default(),
            Arc::clone(&catalog),
            Box::new(SeededRandom::from_seed(1)),
            storage.clone(),
        );
        assert_eq!(resumed.view(), original.view());

        for _ in 0..20 {
            let view = original.view().unwrap();
            let (a, b) = if view.awaiting_decision() {
                (
                    original.decide(TemptationChoice::Resist),
                    resumed.decide(TemptationChoice::Resist),
                )
            } else {
                (original.acknowledge(), resumed.acknowledge())
            };
            assert_eq!(a, b);
            if a.is_ok_and(|o| o.is_finished()) {
                break;
            }
        }
    }

    #[test]
    fn incompatible_save_is_discarded() {
        let catalog = catalog();
        let storage = MemoryStorage::new();
        let controller =
            CampaignController::seeded(GameConfig::default(), Arc::clone(&catalog), 5);
        let mut session = CampaignSession::new(controller, storage.clone());
        session.start_campaign(&plan(&catalog)).unwrap();

        let mut snapshot = storage.load().unwrap().unwrap();
        snapshot.version = SNAPSHOT_VERSION + 1;
        storage.save(&snapshot).unwrap();

        let resumed = CampaignSession::resume(
            GameConfig::default(),
            catalog,
            Box::new(SeededRandom::from_seed(5)),
            storage.clone(),
        );
        assert_eq!(resumed.phase(), CampaignPhase::Idle);
        assert!(storage.is_empty());
    }

    #[test]
    fn save_with_runaway_stream_position_is_discarded() {
        let catalog = catalog();
        let storage = MemoryStorage::new();
        let controller =
            CampaignController::seeded(GameConfig::default(), Arc::clone(&catalog), 8);
        let mut session = CampaignSession::new(controller, storage.clone());
        session.start_campaign(&plan(&catalog)).unwrap();

        let mut snapshot = storage.load().unwrap().unwrap();
        snapshot.rng = Some(RngCursor {
            seed: 8,
            draws: u64::MAX,
        });
        storage.save(&snapshot).unwrap();

        let resumed = CampaignSession::resume(
            GameConfig::default(),
            catalog,
            Box::new(SeededRandom::from_seed(8)),
            storage.clone(),
        );
        assert_eq!(resumed.phase(), CampaignPhase::Idle);
        assert!(storage.is_empty());
    }
}
