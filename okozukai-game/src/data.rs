//! Static reference data: goals, temptation catalog, and happenings.
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::DataLoader;
use crate::config::GameConfig;
use crate::constants::{CONFIG_FILE, GOALS_FILE, HAPPENINGS_FILE, ITEMS_FILE};
use crate::random::Weighted;

const DEFAULT_ITEMS: &str = include_str!("../assets/data/items.json");
const DEFAULT_GOALS: &str = include_str!("../assets/data/goals.json");
const DEFAULT_HAPPENINGS: &str = include_str!("../assets/data/happenings.json");

/// A savings target the player can pick during planning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub price: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// An item that can be bought as a recurring purchase or shows up as a temptation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub price: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HappeningKind {
    Positive,
    Negative,
}

/// A random windfall or mishap applied once in a month where it triggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HappeningDef {
    #[serde(rename = "type")]
    pub kind: HappeningKind,
    pub message: String,
    /// Signed money delta.
    pub amount: i64,
    pub probability: f64,
}

impl Weighted for HappeningDef {
    fn probability(&self) -> f64 {
        self.probability
    }
}

/// Fatal problems with the static catalogs.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {file}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {file}")]
    Parse {
        file: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{file} contains no entries")]
    Empty { file: &'static str },
    #[error("{file} entry {id} has non-positive price {price}")]
    NonPositivePrice {
        file: &'static str,
        id: String,
        price: i64,
    },
    #[error("happening #{index} has negative probability {probability}")]
    NegativeProbability { index: usize, probability: f64 },
    #[error("{file} lists id {id} more than once")]
    DuplicateId { file: &'static str, id: String },
}

/// The three static catalogs, loaded together before any campaign starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Catalog {
    pub items: Vec<CatalogItem>,
    pub goals: Vec<Goal>,
    pub happenings: Vec<HappeningDef>,
}

impl Catalog {
    /// Assemble and validate a catalog.
    ///
    /// # Errors
    ///
    /// Returns `DataError` when any list is empty or holds an invalid entry.
    pub fn new(
        items: Vec<CatalogItem>,
        goals: Vec<Goal>,
        happenings: Vec<HappeningDef>,
    ) -> Result<Self, DataError> {
        let catalog = Self {
            items,
            goals,
            happenings,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse each catalog from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns `DataError::Parse` naming the offending file, or a validation error.
    pub fn from_json(items: &str, goals: &str, happenings: &str) -> Result<Self, DataError> {
        Self::new(
            parse_list(ITEMS_FILE, items)?,
            parse_list(GOALS_FILE, goals)?,
            parse_list(HAPPENINGS_FILE, happenings)?,
        )
    }

    /// Catalog compiled into the crate.
    ///
    /// # Errors
    ///
    /// Returns `DataError` only if the bundled assets are malformed.
    pub fn load_from_static() -> Result<Self, DataError> {
        Self::from_json(DEFAULT_ITEMS, DEFAULT_GOALS, DEFAULT_HAPPENINGS)
    }

    /// Check every catalog invariant the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), DataError> {
        if self.items.is_empty() {
            return Err(DataError::Empty { file: ITEMS_FILE });
        }
        if self.goals.is_empty() {
            return Err(DataError::Empty { file: GOALS_FILE });
        }
        if self.happenings.is_empty() {
            return Err(DataError::Empty { file: HAPPENINGS_FILE });
        }
        check_priced(ITEMS_FILE, self.items.iter().map(|i| (i.id.as_str(), i.price)))?;
        check_priced(GOALS_FILE, self.goals.iter().map(|g| (g.id.as_str(), g.price)))?;
        for (index, happening) in self.happenings.iter().enumerate() {
            if happening.probability.is_nan() || happening.probability < 0.0 {
                return Err(DataError::NegativeProbability {
                    index,
                    probability: happening.probability,
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn goal(&self, id: &str) -> Option<&Goal> {
        self.goals.iter().find(|goal| goal.id == id)
    }

    #[must_use]
    pub fn item(&self, id: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Goals whose price falls outside the configured planning range.
    #[must_use]
    pub fn goals_out_of_range(&self, cfg: &GameConfig) -> Vec<&Goal> {
        self.goals
            .iter()
            .filter(|goal| !cfg.goal_price_in_range(goal.price))
            .collect()
    }

    /// Sum of declared happening probabilities.
    #[must_use]
    pub fn happening_weight(&self) -> f64 {
        self.happenings.iter().map(|h| h.probability).sum()
    }
}

fn parse_list<T: DeserializeOwned>(file: &str, json: &str) -> Result<Vec<T>, DataError> {
    serde_json::from_str(json).map_err(|source| DataError::Parse {
        file: file.to_string(),
        source,
    })
}

fn check_priced<'a>(
    file: &'static str,
    entries: impl Iterator<Item = (&'a str, i64)>,
) -> Result<(), DataError> {
    let mut seen = HashSet::new();
    for (id, price) in entries {
        if price <= 0 {
            return Err(DataError::NonPositivePrice {
                file,
                id: id.to_string(),
                price,
            });
        }
        if !seen.insert(id) {
            return Err(DataError::DuplicateId {
                file,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

/// Loader backed by the assets compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticDataLoader;

impl DataLoader for StaticDataLoader {
    type Error = DataError;

    fn load_catalog(&self) -> Result<Catalog, Self::Error> {
        Catalog::load_from_static()
    }

    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str("{}").map_err(|source| DataError::Parse {
            file: config_name.to_string(),
            source,
        })
    }
}

/// Loader reading `items.json`, `goals.json`, and `happenings.json` from a directory.
#[derive(Debug, Clone)]
pub struct DirDataLoader {
    root: PathBuf,
}

impl DirDataLoader {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, file: &str) -> Result<String, DataError> {
        std::fs::read_to_string(self.root.join(file)).map_err(|source| DataError::Io {
            file: file.to_string(),
            source,
        })
    }
}

impl DataLoader for DirDataLoader {
    type Error = DataError;

    fn load_catalog(&self) -> Result<Catalog, Self::Error> {
        let items = self.read(ITEMS_FILE)?;
        let goals = self.read(GOALS_FILE)?;
        let happenings = self.read(HAPPENINGS_FILE)?;
        Catalog::from_json(&items, &goals, &happenings)
    }

    /// A missing config file falls back to defaults; a malformed one is an error.
    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: DeserializeOwned,
    {
        let file = if config_name.ends_with(".json") {
            config_name.to_string()
        } else if config_name.is_empty() {
            CONFIG_FILE.to_string()
        } else {
            format!("{config_name}.json")
        };
        let path = self.root.join(&file);
        let text = if path.exists() {
            self.read(&file)?
        } else {
            String::from("{}")
        };
        serde_json::from_str(&text).map_err(|source| DataError::Parse { file, source })
    }
}
