//! Happening and temptation generation plus the per-month event log.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::data::{CatalogItem, HappeningDef, HappeningKind};
use crate::random::{RandomSource, uniform_choice, weighted_pick};

/// Events resolved in a month; at most one happening plus the temptations.
pub type MonthEventLog = SmallVec<[MonthEvent; 4]>;

/// A resolved event recorded in the current month's log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MonthEvent {
    Happening {
        kind: HappeningKind,
        message: String,
        amount: i64,
    },
    Temptation {
        item: CatalogItem,
        accepted: bool,
    },
}

impl MonthEvent {
    #[must_use]
    pub fn happening(def: &HappeningDef) -> Self {
        Self::Happening {
            kind: def.kind,
            message: def.message.clone(),
            amount: def.amount,
        }
    }

    /// Price of an accepted temptation, zero otherwise.
    #[must_use]
    pub fn temptation_spend(&self) -> i64 {
        match self {
            Self::Temptation {
                item,
                accepted: true,
            } => item.price,
            _ => 0,
        }
    }
}

/// Draws the random events of a month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventGenerator {
    happening_probability: f64,
}

impl EventGenerator {
    #[must_use]
    pub const fn new(happening_probability: f64) -> Self {
        Self {
            happening_probability,
        }
    }

    /// Roll the monthly happening check and, on success, draw one happening by weight.
    pub fn roll_happening<R>(
        &self,
        rng: &mut R,
        happenings: &[HappeningDef],
    ) -> Option<HappeningDef>
    where
        R: RandomSource + ?Sized,
    {
        if happenings.is_empty() || rng.uniform() >= self.happening_probability {
            return None;
        }
        let pick = weighted_pick(rng, happenings)?;
        if pick.fallback {
            log::debug!(
                "happening roll {:.4} exceeded cumulative weight; using last entry",
                pick.roll
            );
        }
        Some(pick.item.clone())
    }

    /// Draw one temptation uniformly; draws are independent so repeats are possible.
    pub fn draw_temptation<R>(&self, rng: &mut R, items: &[CatalogItem]) -> Option<CatalogItem>
    where
        R: RandomSource + ?Sized,
    {
        uniform_choice(rng, items).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SequenceRandom;

    fn happenings() -> Vec<HappeningDef> {
        vec![
            HappeningDef {
                kind: HappeningKind::Positive,
                message: String::from("gift"),
                amount: 1000,
                probability: 0.5,
            },
            HappeningDef {
                kind: HappeningKind::Negative,
                message: String::from("lost"),
                amount: -200,
                probability: 0.5,
            },
        ]
    }

    #[test]
    fn happening_check_gates_on_probability() {
        let generator = EventGenerator::new(0.5);
        let defs = happenings();

        let mut miss = SequenceRandom::new([0.5]);
        assert!(generator.roll_happening(&mut miss, &defs).is_none());
        assert_eq!(miss.consumed(), 1);

        let mut hit = SequenceRandom::new([0.49, 0.9]);
        let drawn = generator.roll_happening(&mut hit, &defs).unwrap();
        assert_eq!(drawn.amount, -200);
        assert_eq!(hit.consumed(), 2);
    }

    #[test]
    fn zero_probability_never_triggers() {
        let generator = EventGenerator::new(0.0);
        let mut rng = SequenceRandom::constant(0.0);
        assert!(generator.roll_happening(&mut rng, &happenings()).is_none());
    }

    #[test]
    fn temptations_may_repeat() {
        let generator = EventGenerator::new(0.5);
        let items = vec![
            CatalogItem {
                id: String::from("a"),
                name: String::from("A"),
                price: 100,
                image: None,
            },
            CatalogItem {
                id: String::from("b"),
                name: String::from("B"),
                price: 200,
                image: None,
            },
        ];
        let mut rng = SequenceRandom::constant(0.7);
        let first = generator.draw_temptation(&mut rng, &items).unwrap();
        let second = generator.draw_temptation(&mut rng, &items).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.id, "b");
    }

    #[test]
    fn spend_counts_only_accepted_temptations() {
        let item = CatalogItem {
            id: String::from("comic"),
            name: String::from("Comic"),
            price: 450,
            image: None,
        };
        let accepted = MonthEvent::Temptation {
            item: item.clone(),
            accepted: true,
        };
        let resisted = MonthEvent::Temptation {
            item,
            accepted: false,
        };
        assert_eq!(accepted.temptation_spend(), 450);
        assert_eq!(resisted.temptation_spend(), 0);
        assert_eq!(MonthEvent::happening(&happenings()[0]).temptation_spend(), 0);
    }
}
