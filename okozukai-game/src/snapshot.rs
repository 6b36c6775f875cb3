use serde::{Deserialize, Serialize};

use crate::campaign::ActiveCampaign;
use crate::random::RngCursor;

/// Serializable copy of a running campaign, written after every transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSnapshot {
    pub version: u32,
    pub campaign: ActiveCampaign,
    /// Stream position when the controller runs on a seeded source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rng: Option<RngCursor>,
}

impl CampaignSnapshot {
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// # Errors
    ///
    /// Returns an error for malformed input.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
