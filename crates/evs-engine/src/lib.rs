//! evs-engine
//!
//! One parameterized study pipeline over many symbols and events.
//!
//! Pipeline: EVENTS (stable sort by date, optional tail) -> per symbol in
//! parallel: ALIGN -> WINDOW/IMPACT -> ROW -> canonical sort -> AGGREGATE ->
//! TEST -> NARRATIVE
//!
//! - Same inputs + config => identical rows, whatever the thread schedule
//! - Per-pair "not enough data" is a recorded skip, never an error
//! - Correlation-delta panel around the latest event of a given name

mod corr;
mod study;

pub use corr::{correlation_delta, inner_join_returns, CorrDeltaError, ReturnPanel};
pub use study::{Skip, StageOutput, StudyEngine};
