// src/events.rs
//
// The two event records the client emits: one per decision (ranking) and
// one per observed outcome, joined offline by event id.
//
// Events are constructed once, optionally thinned any number of times, and
// serialized as a pure projection of current state: re-serializing after a
// further gate application reflects the new retention probability.

use serde::{Deserialize, Serialize};

use crate::buffer::DataBuffer;
use crate::ranking::RankingResponse;
use crate::sampling::{GateDecision, GateError, RetentionState};
use crate::serialize::{serialize_outcome, serialize_ranking};

/// Caller-supplied pre-encoded payload text, spliced into wire records
/// verbatim.
///
/// A fragment is trusted input: it is never escaped, validated, or parsed
/// here, and keeping it a distinct type means it cannot reach the
/// string-escaping path by accident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment(String);

impl Fragment {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Fragment {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for Fragment {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Observed result of a prior decision: a numeric reward, or a pre-encoded
/// payload the caller already shaped for the joining pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    Numeric(f64),
    Fragment(Fragment),
}

impl From<f64> for Outcome {
    fn from(value: f64) -> Self {
        Outcome::Numeric(value)
    }
}

impl From<Fragment> for Outcome {
    fn from(fragment: Fragment) -> Self {
        Outcome::Fragment(fragment)
    }
}

impl From<&str> for Outcome {
    fn from(raw: &str) -> Self {
        Outcome::Fragment(Fragment::from(raw))
    }
}

impl From<String> for Outcome {
    fn from(raw: String) -> Self {
        Outcome::Fragment(Fragment::from(raw))
    }
}

/// Record of an observed outcome, correlated to a decision via event id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeEvent {
    event_id: String,
    outcome: Outcome,
}

impl OutcomeEvent {
    pub fn new(event_id: impl Into<String>, outcome: impl Into<Outcome>) -> Self {
        Self {
            event_id: event_id.into(),
            outcome: outcome.into(),
        }
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// Append the canonical wire record to `buf`.
    pub fn serialize_into(&self, buf: &mut DataBuffer) {
        serialize_outcome(buf, &self.event_id, &self.outcome);
    }

    /// Render the record through a fresh buffer.
    pub fn to_wire(&self) -> String {
        let mut buf = DataBuffer::new();
        self.serialize_into(&mut buf);
        buf.into_string()
    }
}

/// Record of one decision: the ranked action list offered for a request,
/// its context, and the current thinning state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEvent {
    event_id: String,
    context: Fragment,
    response: RankingResponse,
    retention: RetentionState,
}

impl RankingEvent {
    /// New event, initially always kept (retention probability 1.0).
    pub fn new(
        event_id: impl Into<String>,
        context: impl Into<Fragment>,
        response: RankingResponse,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            context: context.into(),
            response,
            retention: RetentionState::kept(),
        }
    }

    /// Direct construction with a known cumulative retention probability.
    ///
    /// This is the byte-equivalence anchor for the gate: any sequence of
    /// gate applications reaching the same cumulative probability must
    /// serialize identically to an event built this way.
    pub fn with_retention_probability(
        event_id: impl Into<String>,
        context: impl Into<Fragment>,
        response: RankingResponse,
        probability: f64,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            context: context.into(),
            response,
            retention: RetentionState::with_probability(probability),
        }
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn context(&self) -> &Fragment {
        &self.context
    }

    pub fn response(&self) -> &RankingResponse {
        &self.response
    }

    pub fn retention(&self) -> &RetentionState {
        &self.retention
    }

    /// Current cumulative retention probability.
    pub fn retention_probability(&self) -> f64 {
        self.retention.probability()
    }

    /// Apply one thinning layer to this event's retention state.
    ///
    /// Returns the keep/drop decision for the transport layer to act on;
    /// the event itself is never consumed or marked dropped.
    pub fn try_drop(
        &mut self,
        pass_probability: f64,
        salt: u64,
    ) -> Result<GateDecision, GateError> {
        self.retention
            .try_drop(&self.event_id, pass_probability, salt)
    }

    /// Append the canonical wire record, reflecting the current retention
    /// state, to `buf`.
    pub fn serialize_into(&self, buf: &mut DataBuffer) {
        serialize_ranking(
            buf,
            &self.event_id,
            &self.context,
            &self.response,
            self.retention.probability(),
        );
    }

    /// Render the record through a fresh buffer.
    pub fn to_wire(&self) -> String {
        let mut buf = DataBuffer::new();
        self.serialize_into(&mut buf);
        buf.into_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_round_trips_verbatim() {
        let f = Fragment::new(r#"{"nested":["not","touched"]}"#);
        assert_eq!(f.as_str(), r#"{"nested":["not","touched"]}"#);
    }

    #[test]
    fn test_outcome_conversions() {
        assert_eq!(Outcome::from(1.0), Outcome::Numeric(1.0));
        assert_eq!(
            Outcome::from("{}"),
            Outcome::Fragment(Fragment::new("{}"))
        );
    }

    #[test]
    fn test_ranking_event_starts_kept() {
        let evt = RankingEvent::new("id", "{}", RankingResponse::new("id"));
        assert_eq!(evt.retention_probability(), 1.0);
        assert!(!evt.retention().is_thinned());
    }

    #[test]
    fn test_reserialization_reflects_mutation() {
        let mut resp = RankingResponse::new("id");
        resp.push_back(0, 1.0);
        let mut evt = RankingEvent::new("id", "{}", resp);

        let before = evt.to_wire();
        evt.try_drop(0.5, 1).unwrap();
        let after = evt.to_wire();

        assert_ne!(before, after);
        assert!(after.contains("\"pdrop\":0.500000"));
    }
}
