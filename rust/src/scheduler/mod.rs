//! Live scheduling aids: ready work, longest-path levels and load-balanced
//! assignment.
//!
//! These are advisory and meant to be polled from an executor loop, so none
//! of them fail: each returns an `Advisory` that falls back to an empty plan
//! when the graph cannot be read consistently.

mod assignment;
mod levels;
mod ready;

pub use assignment::{assign_work, AssignmentError};
pub use levels::work_levels;
pub use ready::ready_work;
