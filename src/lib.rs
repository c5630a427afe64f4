//! Ranklog core library.
//!
//! Canonical event records for a reinforcement-learning decision-service
//! client. Each decision (a ranked set of candidate actions with
//! probabilities) and each later-observed outcome becomes a byte-exact wire
//! record that an offline training/joining pipeline consumes directly, so
//! field order and floating-point digit count are part of the contract.
//!
//! # Architecture
//!
//! - **Buffer** (`buffer`): append-only, reusable text sink the serializer
//!   writes into; handed off to the transport layer once filled.
//!
//! - **Ranking** (`ranking`): ordered (action, probability) container built
//!   by the action-selection component, read-only at serialize time.
//!
//! - **Events** (`events`): `RankingEvent` and `OutcomeEvent`, joined
//!   offline by event id. Serialization is a pure projection of current
//!   state and can be repeated after mutation.
//!
//! - **Sampling** (`sampling`): the client-side thinning gate ("try_drop").
//!   The survival draw is a pure function of (pass probability, salt, event
//!   id) — no shared RNG — so thinning decisions are reproducible, and the
//!   cumulative retention probability recorded on the wire lets offline
//!   training reweight retained events for unbiased evaluation.
//!
//! - **Serializer** (`serialize`): hand-written canonical JSON assembly;
//!   fixed 6-decimal floats, verbatim opaque fragments, one-based action
//!   indices produced only at this boundary.
//!
//! Network transport, batching/retry, config loading, model management, and
//! action selection are external collaborators: they feed inputs to, or
//! consume the serialized buffers from, the core defined here.

pub mod buffer;
pub mod config;
pub mod events;
pub mod ranking;
pub mod sampling;
pub mod serialize;
pub mod telemetry;

pub use buffer::DataBuffer;
pub use config::ThinningConfig;
pub use events::{Fragment, Outcome, OutcomeEvent, RankingEvent};
pub use ranking::{ActionId, ActionProb, RankingResponse};
pub use sampling::{GateDecision, GateError, RetentionState};
pub use serialize::{serialize_outcome, serialize_ranking, RANKING_EVENT_VERSION};
pub use telemetry::{TelemetryConfig, TelemetryMode, TelemetrySink};
