// src/config.rs
//
// Typed thinning configuration.
//
// Loading (file / env / remote) is the hosting application's job; hosts
// embed this section in their own config tree and hand it to the client.

use serde::{Deserialize, Serialize};

use crate::events::RankingEvent;
use crate::sampling::{GateDecision, GateError};

/// One client-side thinning layer for interaction events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThinningConfig {
    /// Probability an event survives this layer. 1.0 disables thinning.
    pub pass_probability: f64,
    /// Salt mixed into the survival draw. Deployments stacking several
    /// thinning layers give each layer a distinct salt.
    pub salt: u64,
}

impl Default for ThinningConfig {
    fn default() -> Self {
        Self {
            pass_probability: 1.0,
            salt: 0,
        }
    }
}

impl ThinningConfig {
    /// Whether this layer can drop anything at all.
    pub fn is_active(&self) -> bool {
        self.pass_probability < 1.0
    }

    /// Apply this layer to `event`, returning the keep/drop decision.
    pub fn apply(&self, event: &mut RankingEvent) -> Result<GateDecision, GateError> {
        event.try_drop(self.pass_probability, self.salt)
    }
}
