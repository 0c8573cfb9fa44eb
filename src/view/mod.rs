//! Display state and reconciliation
//!
//! `ViewState` holds what the operator sees; `Workflow` applies the
//! reconciliation rules that keep it in step with the remote service.

mod state;
mod sync;

pub use state::ViewState;
pub use sync::{Confirm, StdinConfirm, Workflow, WorkflowState};
