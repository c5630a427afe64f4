// src/ranking.rs
//
// Ranked action container produced by the action-selection component and
// consumed read-only by the serializer.
//
// Action ids stay zero-based everywhere in this crate; the +1 shift onto
// the wire happens only inside the serializer.

use serde::{Deserialize, Serialize};

/// Zero-based ordinal into the action set offered at decision time.
pub type ActionId = usize;

/// One ranked entry: an action and the probability it was offered with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionProb {
    pub action_id: ActionId,
    pub probability: f64,
}

/// Ordered (action, probability) pairs for one decision, in rank order
/// (index 0 = top-ranked), plus the identifiers the wire record needs.
///
/// Probabilities are not required to sum to 1 and are not normalized here.
/// Duplicate action ids are the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RankingResponse {
    event_id: String,
    model_id: String,
    chosen_action_id: Option<ActionId>,
    ranking: Vec<ActionProb>,
}

impl RankingResponse {
    /// Create an empty response scoped to `event_id`.
    ///
    /// The event id correlates this decision with a later outcome and is
    /// distinct from the model id.
    pub fn new(event_id: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            ..Self::default()
        }
    }

    /// Append an entry; insertion order is rank order.
    pub fn push_back(&mut self, action_id: ActionId, probability: f64) {
        self.ranking.push(ActionProb {
            action_id,
            probability,
        });
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn set_model_id(&mut self, model_id: impl Into<String>) {
        self.model_id = model_id.into();
    }

    /// Identifier of the model that produced this ranking.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Override which action was actually taken, independent of rank.
    pub fn set_chosen_action_id(&mut self, action_id: ActionId) {
        self.chosen_action_id = Some(action_id);
    }

    /// The action actually taken. Defaults to the top-ranked entry's action
    /// when no explicit override was set; `None` only for an empty ranking.
    pub fn chosen_action_id(&self) -> Option<ActionId> {
        self.chosen_action_id
            .or_else(|| self.ranking.first().map(|pair| pair.action_id))
    }

    /// Entries in rank order.
    pub fn iter(&self) -> std::slice::Iter<'_, ActionProb> {
        self.ranking.iter()
    }

    pub fn len(&self) -> usize {
        self.ranking.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranking.is_empty()
    }
}

impl<'a> IntoIterator for &'a RankingResponse {
    type Item = &'a ActionProb;
    type IntoIter = std::slice::Iter<'a, ActionProb>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
