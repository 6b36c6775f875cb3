use std::fmt;
use std::str::FromStr;

use okozukai_game::{CampaignView, CatalogItem, TemptationChoice};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use thiserror::Error;

/// Decision returned by a [`PlayerPolicy`]
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    pub choice: TemptationChoice,
    pub rationale: Option<String>,
}

impl PolicyDecision {
    #[must_use]
    pub fn new(choice: TemptationChoice, rationale: Option<String>) -> Self {
        Self { choice, rationale }
    }
}

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Answer the temptation currently on screen.
    fn decide(&mut self, item: &CatalogItem, view: &CampaignView) -> PolicyDecision;
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown strategy '{0}' (expected saver, impulsive, balanced, coinflip, or all)")]
pub struct UnknownStrategy(pub String);

/// Built-in temptation strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GameplayStrategy {
    Saver,
    Impulsive,
    Balanced,
    Coinflip,
}

impl GameplayStrategy {
    pub const ALL: [Self; 4] = [Self::Saver, Self::Impulsive, Self::Balanced, Self::Coinflip];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Saver => "Saver",
            Self::Impulsive => "Impulsive",
            Self::Balanced => "Balanced",
            Self::Coinflip => "Coinflip",
        }
    }

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Saver => "saver",
            Self::Impulsive => "impulsive",
            Self::Balanced => "balanced",
            Self::Coinflip => "coinflip",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            Self::Saver => Box::new(SaverPolicy),
            Self::Impulsive => Box::new(ImpulsivePolicy),
            Self::Balanced => Box::new(BalancedPolicy),
            Self::Coinflip => Box::new(CoinflipPolicy::new(seed)),
        }
    }

    /// Parse a comma list of strategy keys; `all` expands to every strategy.
    ///
    /// # Errors
    ///
    /// Returns `UnknownStrategy` for any unrecognised token.
    pub fn parse_list(tokens: &[String]) -> Result<Vec<Self>, UnknownStrategy> {
        let mut strategies = Vec::new();
        for token in tokens {
            if token.eq_ignore_ascii_case("all") {
                strategies.extend(Self::ALL);
            } else {
                strategies.push(token.parse()?);
            }
        }
        if strategies.is_empty() {
            strategies.extend(Self::ALL);
        }
        strategies.sort();
        strategies.dedup();
        Ok(strategies)
    }
}

impl FromStr for GameplayStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownStrategy(s.to_string()))
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct SaverPolicy;
struct ImpulsivePolicy;
struct BalancedPolicy;

struct CoinflipPolicy {
    rng: ChaCha20Rng,
}

impl CoinflipPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl PlayerPolicy for SaverPolicy {
    fn name(&self) -> &'static str {
        "Saver"
    }

    fn decide(&mut self, _item: &CatalogItem, _view: &CampaignView) -> PolicyDecision {
        PolicyDecision::new(TemptationChoice::Resist, None)
    }
}

impl PlayerPolicy for ImpulsivePolicy {
    fn name(&self) -> &'static str {
        "Impulsive"
    }

    fn decide(&mut self, item: &CatalogItem, view: &CampaignView) -> PolicyDecision {
        let rationale = (view.money < item.price)
            .then(|| format!("buys {} with only {}", item.price, view.money));
        PolicyDecision::new(TemptationChoice::Buy, rationale)
    }
}

impl PlayerPolicy for BalancedPolicy {
    fn name(&self) -> &'static str {
        "Balanced"
    }

    /// Buys only out of the surplus over the planned trajectory.
    fn decide(&mut self, item: &CatalogItem, view: &CampaignView) -> PolicyDecision {
        let surplus = view.plan_difference.min(view.money);
        if surplus >= item.price {
            PolicyDecision::new(
                TemptationChoice::Buy,
                Some(format!("surplus {surplus} covers {}", item.price)),
            )
        } else {
            PolicyDecision::new(
                TemptationChoice::Resist,
                Some(format!("surplus {surplus} short of {}", item.price)),
            )
        }
    }
}

impl PlayerPolicy for CoinflipPolicy {
    fn name(&self) -> &'static str {
        "Coinflip"
    }

    fn decide(&mut self, _item: &CatalogItem, _view: &CampaignView) -> PolicyDecision {
        let choice = if self.rng.gen_bool(0.5) {
            TemptationChoice::Buy
        } else {
            TemptationChoice::Resist
        };
        PolicyDecision::new(choice, None)
    }
}
