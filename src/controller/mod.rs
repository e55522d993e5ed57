//! Selection controller.
//!
//! State machine over no selection / resolving / resolved / not found. The
//! registry may be empty on cold start, so a miss keeps the controller in
//! `Resolving` until the story list has been updated
//! `maxStoryListUpdates` times (or `settle` is called); only then does it
//! report `NotFound`. Every navigation bumps a generation counter and
//! attempts for older generations are discarded.

mod selection_controller;
mod state;


pub use selection_controller::{ControllerOptions, SelectionController};
pub use state::SelectionState;
