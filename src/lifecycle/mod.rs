//! Purchase lifecycle: local policy, per-transaction transitions, and the
//! application-state reducer.

pub mod machine;
pub mod policy;
pub mod state;

pub use machine::{CallResolution, Judgement, QuickAction};
pub use policy::{
    is_fast_food, short_circuits, NagPolicy, ANALYSIS_FAILURE_MESSAGE, MAX_NAG_INTERVAL_SECS,
};
pub use state::{reduce, AppState, Event};
