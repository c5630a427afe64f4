// src/sampling.rs
//
// Client-side thinning gate ("try_drop").
//
// High-volume deployments discard a fraction of interaction events before
// transmission. The gate never draws from a shared RNG: the survival draw is
// a pure function of (pass probability, salt, event id), so equal calls on
// equal event states reproduce the same decision, thinning is auditable
// offline, and concurrent event construction needs no synchronization.
//
// Two transition rules govern the retention state:
// - repeating the most recent (pass probability, salt) pair is a no-op;
// - a different pair composes multiplicatively (independently layered
//   filters).

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Keep/drop outcome of one gate application.
///
/// The gate only computes the decision; whether a `Drop` event is actually
/// withheld from transmission is the transport layer's policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateDecision {
    Keep,
    Drop,
}

/// Identity of a single gate application, compared bitwise so the
/// idempotence rule is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateKey {
    pass_bits: u64,
    salt: u64,
}

impl GateKey {
    fn new(pass_probability: f64, salt: u64) -> Self {
        Self {
            pass_bits: pass_probability.to_bits(),
            salt,
        }
    }
}

/// Contract violations reported by the gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GateError {
    /// Pass probability outside [0, 1]. Never clamped; the offending call
    /// is rejected and the event's state is left untouched.
    PassProbabilityOutOfRange { value: f64 },
}

impl fmt::Display for GateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateError::PassProbabilityOutOfRange { value } => {
                write!(f, "pass probability {value} is outside [0, 1]")
            }
        }
    }
}

impl std::error::Error for GateError {}

/// Cumulative probability that an event survives client-side thinning.
///
/// Every record starts kept with probability 1.0. Gate applications only
/// ever lower it; there is no terminal "dropped" state. The serializer
/// reads the current probability to decide what to emit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetentionState {
    probability: f64,
    last_gate: Option<GateKey>,
}

impl Default for RetentionState {
    fn default() -> Self {
        Self::kept()
    }
}

impl RetentionState {
    /// Initial state: always kept.
    pub fn kept() -> Self {
        Self {
            probability: 1.0,
            last_gate: None,
        }
    }

    /// Direct construction with a known cumulative retention probability,
    /// as if the corresponding gate sequence had already been applied.
    pub fn with_probability(probability: f64) -> Self {
        Self {
            probability,
            last_gate: None,
        }
    }

    /// Current cumulative retention probability.
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Whether thinning has altered this record.
    pub fn is_thinned(&self) -> bool {
        self.probability < 1.0
    }

    /// Apply one thinning layer keyed by `(pass_probability, salt)` to the
    /// event identified by `event_id`.
    ///
    /// Repeating the most recent `(pass_probability, salt)` pair returns the
    /// same decision and leaves the state unchanged. A different pair
    /// multiplies the retention probability by `pass_probability`.
    pub fn try_drop(
        &mut self,
        event_id: &str,
        pass_probability: f64,
        salt: u64,
    ) -> Result<GateDecision, GateError> {
        if !(0.0..=1.0).contains(&pass_probability) {
            return Err(GateError::PassProbabilityOutOfRange {
                value: pass_probability,
            });
        }

        let decision = survival_decision(event_id, pass_probability, salt);
        let key = GateKey::new(pass_probability, salt);
        if self.last_gate == Some(key) {
            return Ok(decision);
        }

        self.probability *= pass_probability;
        self.last_gate = Some(key);
        Ok(decision)
    }
}

/// Keep/drop decision for one filter layer.
pub fn survival_decision(event_id: &str, pass_probability: f64, salt: u64) -> GateDecision {
    if survival_draw(event_id, pass_probability, salt) < pass_probability {
        GateDecision::Keep
    } else {
        GateDecision::Drop
    }
}

/// Uniform draw in [0, 1), a pure function of its inputs.
pub fn survival_draw(event_id: &str, pass_probability: f64, salt: u64) -> f64 {
    let seed = fnv1a64(&format!(
        "{event_id}|{salt}|{:016x}",
        pass_probability.to_bits()
    ));
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.gen_range(0.0..1.0)
}

fn fnv1a64(s: &str) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;
    let mut h = FNV_OFFSET;
    for b in s.as_bytes() {
        h ^= *b as u64;
        h = h.wrapping_mul(FNV_PRIME);
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_is_pure() {
        let a = survival_draw("event_id", 0.5, 1);
        let b = survival_draw("event_id", 0.5, 1);
        assert_eq!(a, b);
        assert!((0.0..1.0).contains(&a));
    }

    #[test]
    fn test_draw_varies_with_inputs() {
        let base = survival_draw("event_id", 0.5, 1);
        assert_ne!(base, survival_draw("event_id", 0.5, 2));
        assert_ne!(base, survival_draw("other_id", 0.5, 1));
        assert_ne!(base, survival_draw("event_id", 0.25, 1));
    }

    #[test]
    fn test_boundary_probabilities() {
        // pass probability 1.0 keeps everything, 0.0 keeps nothing
        assert_eq!(survival_decision("e", 1.0, 7), GateDecision::Keep);
        assert_eq!(survival_decision("e", 0.0, 7), GateDecision::Drop);
    }

    #[test]
    fn test_idempotent_reapplication() {
        let mut state = RetentionState::kept();
        let first = state.try_drop("event_id", 0.5, 1).unwrap();
        let after_once = state;

        let second = state.try_drop("event_id", 0.5, 1).unwrap();
        assert_eq!(first, second);
        assert_eq!(state, after_once);
        assert_eq!(state.probability(), 0.5);
    }

    #[test]
    fn test_multiplicative_composition() {
        let mut state = RetentionState::kept();
        state.try_drop("event_id", 0.5, 1).unwrap();
        state.try_drop("event_id", 0.5, 2).unwrap();
        assert_eq!(state.probability(), 0.25);
    }

    #[test]
    fn test_idempotence_is_relative_to_most_recent_only() {
        let mut state = RetentionState::kept();
        state.try_drop("event_id", 0.5, 1).unwrap();
        state.try_drop("event_id", 0.8, 2).unwrap();
        // (0.5, 1) is no longer the most recent application, so it composes
        // again instead of being absorbed.
        state.try_drop("event_id", 0.5, 1).unwrap();
        assert!((state.probability() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_is_rejected_without_mutation() {
        let mut state = RetentionState::kept();
        state.try_drop("event_id", 0.5, 1).unwrap();
        let before = state;

        for bad in [-0.1, 1.5, f64::NAN] {
            let err = state.try_drop("event_id", bad, 9).unwrap_err();
            assert!(matches!(
                err,
                GateError::PassProbabilityOutOfRange { .. }
            ));
            assert_eq!(state, before);
        }
    }

    #[test]
    fn test_direct_construction_matches_gate_sequence() {
        let mut gated = RetentionState::kept();
        gated.try_drop("event_id", 0.5, 1).unwrap();
        gated.try_drop("event_id", 0.5, 2).unwrap();

        let direct = RetentionState::with_probability(0.25);
        assert_eq!(gated.probability(), direct.probability());
    }
}
