//! Catalog reconciliation.
//!
//! Keeps every target-language catalog aligned with the template catalog:
//!
//! - `diff`: what a target is missing, what the updates catalog revised, and
//!   the union of both that goes to the translator
//! - `merge`: folding translations into a target and pruning keys the
//!   template no longer defines
//! - `driver`: the per-language pipeline and its outcome
//!
//! Everything except the translator call is a pure function of its inputs.

mod diff;
mod driver;
mod merge;

pub use diff::{compose_request, diff, select_updates};
pub use driver::{plan_request, Outcome, Reconciler};
pub use merge::{merge, prune};
