//! Okozukai Game Engine
//!
//! Platform-agnostic core of the allowance-savings game: plan a goal, then play
//! month by month through allowance, happenings, and temptations.
//! This crate provides all game rules without UI or platform-specific dependencies.

pub mod campaign;
pub mod config;
pub mod constants;
pub mod data;
pub mod events;
pub mod month;
pub mod numbers;
pub mod plan;
pub mod random;
pub mod result;
pub mod session;
pub mod snapshot;
pub mod state;
pub mod storage;
pub mod view;

use anyhow::Context;
use serde::de::DeserializeOwned;
use std::sync::Arc;

// Re-export commonly used types
pub use campaign::{
    ActiveCampaign, CampaignController, CampaignError, CampaignPhase, PlayerAction, StepOutcome,
};
pub use config::{ConfigError, GameConfig};
pub use data::{
    Catalog, CatalogItem, DataError, DirDataLoader, Goal, HappeningDef, HappeningKind,
    StaticDataLoader,
};
pub use events::{EventGenerator, MonthEvent, MonthEventLog};
pub use month::{
    MonthContext, MonthProgress, MonthSimulator, MonthStep, MonthSummary, StepError, StepKind,
    TemptationChoice,
};
pub use plan::{
    CampaignPlan, PlanStatus, PlanSummary, RecurringPurchase, RequiredMonths, classify,
    monthly_expense, monthly_savings, plan_difference, required_months,
};
pub use random::{
    RandomSource, RngCursor, SeededRandom, SequenceRandom, Weighted, uniform_choice,
    weighted_choice, weighted_pick,
};
pub use result::{CampaignEnding, ResultSummary};
pub use session::CampaignSession;
pub use snapshot::CampaignSnapshot;
pub use state::{CampaignState, Player, Stats};
pub use storage::{CampaignStorage, FileStorage, MemoryStorage, StorageError};
pub use view::{CampaignView, DifferenceTone, display_month, month_label, progress_percent};

/// Trait for abstracting data loading operations
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load goals, temptation items, and happenings
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or fails validation.
    fn load_catalog(&self) -> Result<Catalog, Self::Error>;

    /// Load configuration data by name
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: DeserializeOwned;
}

/// Loads static data once and hands out controllers and sessions.
pub struct GameEngine<L, S>
where
    L: DataLoader,
    S: CampaignStorage,
{
    data_loader: L,
    storage: S,
    config: GameConfig,
    catalog: Arc<Catalog>,
}

impl<L, S> GameEngine<L, S>
where
    L: DataLoader,
    S: CampaignStorage,
{
    /// Load config and catalog through `data_loader`. Any failure here is fatal.
    ///
    /// # Errors
    ///
    /// Returns an error if the config or catalog cannot be loaded or fails validation.
    pub fn boot(data_loader: L, storage: S) -> anyhow::Result<Self> {
        let config: GameConfig = data_loader
            .load_config(constants::CONFIG_FILE)
            .context("loading game config")?;
        config.validate().context("validating game config")?;
        let catalog = data_loader.load_catalog().context("loading catalog")?;
        catalog.validate().context("validating catalog")?;

        for goal in catalog.goals_out_of_range(&config) {
            log::warn!(
                "goal {} costs {} which is outside {}..={}",
                goal.id,
                goal.price,
                config.min_goal_price,
                config.max_goal_price
            );
        }
        log::info!(
            "catalog loaded: {} goals, {} items, {} happenings",
            catalog.goals.len(),
            catalog.items.len(),
            catalog.happenings.len()
        );

        Ok(Self {
            data_loader,
            storage,
            config,
            catalog: Arc::new(catalog),
        })
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
    pub const fn data_loader(&self) -> &L {
        &self.data_loader
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Fresh plan for a goal id, or `None` if the catalog has no such goal.
    #[must_use]
    pub fn plan_for(&self, goal_id: &str) -> Option<CampaignPlan> {
        self.catalog.goal(goal_id).cloned().map(CampaignPlan::new)
    }

    /// Controller on a seeded event stream, without persistence.
    #[must_use]
    pub fn create_controller(&self, seed: u64) -> CampaignController {
        CampaignController::seeded(self.config.clone(), Arc::clone(&self.catalog), seed)
    }
}

impl<L, S> GameEngine<L, S>
where
    L: DataLoader,
    S: CampaignStorage + Clone,
{
    /// Idle session writing to this engine's storage.
    #[must_use]
    pub fn create_session(&self, seed: u64) -> CampaignSession<S> {
        CampaignSession::new(self.create_controller(seed), self.storage.clone())
    }

    /// Session resuming the stored campaign, if any. `seed` drives a fresh stream
    /// when the save carries none.
    #[must_use]
    pub fn resume_session(&self, seed: u64) -> CampaignSession<S> {
        CampaignSession::resume(
            self.config.clone(),
            Arc::clone(&self.catalog),
            Box::new(SeededRandom::from_seed(seed)),
            self.storage.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    struct FixtureLoader;

    impl DataLoader for FixtureLoader {
        type Error = Infallible;

        fn load_catalog(&self) -> Result<Catalog, Self::Error> {
            Ok(Catalog {
                items: vec![CatalogItem {
                    id: String::from("juice"),
                    name: String::from("Juice"),
                    price: 120,
                    image: None,
                }],
                goals: vec![
                    Goal {
                        id: String::from("ball"),
                        name: String::from("Ball"),
                        price: 1500,
                        image: None,
                    },
                    Goal {
                        id: String::from("bike"),
                        name: String::from("Bike"),
                        price: 20_000,
                        image: None,
                    },
                ],
                happenings: vec![HappeningDef {
                    kind: HappeningKind::Positive,
                    message: String::from("birthday money"),
                    amount: 1000,
                    probability: 1.0,
                }],
            })
        }

        fn load_config<T>(&self, _config_name: &str) -> Result<T, Self::Error>
        where
            T: DeserializeOwned,
        {
            Ok(serde_json::from_str(r#"{"happening_probability": 0.0}"#).unwrap())
        }
    }

    struct EmptyCatalogLoader;

    impl DataLoader for EmptyCatalogLoader {
        type Error = Infallible;

        fn load_catalog(&self) -> Result<Catalog, Self::Error> {
            Ok(Catalog::default())
        }

        fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
        where
            T: DeserializeOwned,
        {
            FixtureLoader.load_config(config_name)
        }
    }

    #[test]
    fn engine_boots_and_round_trips_sessions() {
        let engine = GameEngine::boot(FixtureLoader, MemoryStorage::new()).unwrap();
        assert_eq!(
            engine.config().monthly_allowance,
            GameConfig::default().monthly_allowance
        );
        assert!(engine.config().happening_probability.abs() < f64::EPSILON);
        assert!(engine.plan_for("missing").is_none());

        let mut session = engine.create_session(42);
        session
            .start_campaign(&engine.plan_for("ball").unwrap())
            .unwrap();
        session.acknowledge().unwrap();
        assert!(!engine.storage().is_empty());

        let resumed = engine.resume_session(0);
        assert_eq!(resumed.view(), session.view());
        assert_eq!(resumed.phase(), CampaignPhase::Playing);
    }

    #[test]
    fn disabled_happenings_never_trigger() {
        let engine = GameEngine::boot(FixtureLoader, MemoryStorage::new()).unwrap();
        let mut ctl = engine.create_controller(3);
        ctl.start_campaign(&engine.plan_for("ball").unwrap()).unwrap();
        for _ in 0..3 {
            ctl.acknowledge().unwrap();
            let view = ctl.view().unwrap();
            assert!(
                view.events
                    .iter()
                    .all(|e| matches!(e, MonthEvent::Temptation { .. }))
            );
            while ctl.view().is_some_and(|v| v.awaiting_decision()) {
                ctl.decide(TemptationChoice::Resist).unwrap();
            }
            if ctl.acknowledge().unwrap().is_finished() {
                break;
            }
        }
    }

    #[test]
    fn boot_rejects_invalid_config() {
        struct BadConfig;
        impl DataLoader for BadConfig {
            type Error = Infallible;

            fn load_catalog(&self) -> Result<Catalog, Self::Error> {
                FixtureLoader.load_catalog()
            }

            fn load_config<T>(&self, _config_name: &str) -> Result<T, Self::Error>
            where
                T: DeserializeOwned,
            {
                Ok(serde_json::from_str(r#"{"monthly_allowance": 0}"#).unwrap())
            }
        }
        let err = GameEngine::boot(BadConfig, MemoryStorage::new())
            .err()
            .unwrap();
        assert!(format!("{err:#}").contains("validating game config"));
    }

    #[test]
    fn boot_rejects_empty_catalog() {
        let err = GameEngine::boot(EmptyCatalogLoader, MemoryStorage::new())
            .err()
            .unwrap();
        assert!(format!("{err:#}").contains("validating catalog"));
        assert!(format!("{err:#}").contains("contains no entries"));
    }

    #[test]
    fn boot_rejects_catalog_with_duplicate_ids() {
        struct DuplicateItems;
        impl DataLoader for DuplicateItems {
            type Error = Infallible;

            fn load_catalog(&self) -> Result<Catalog, Self::Error> {
                let mut catalog = FixtureLoader.load_catalog()?;
                let juice = catalog.items[0].clone();
                catalog.items.push(juice);
                Ok(catalog)
            }

            fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
            where
                T: DeserializeOwned,
            {
                FixtureLoader.load_config(config_name)
            }
        }
        let err = GameEngine::boot(DuplicateItems, MemoryStorage::new())
            .err()
            .unwrap();
        assert!(format!("{err:#}").contains("more than once"));
    }
}
