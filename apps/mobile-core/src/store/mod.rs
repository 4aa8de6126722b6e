//! In-memory collections and the rules that keep them synchronized.

pub mod live;
pub mod reconcile;

pub use live::{drive, LiveList};
pub use reconcile::{Outcome, Reconcile};
