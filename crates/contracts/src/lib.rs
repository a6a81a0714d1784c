//! # Contracts
//!
//! Frozen interface contracts, defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are
//! prohibited.
//!
//! ## Time Model
//! - Commands carry the arrival time as integer seconds since the Unix epoch,
//!   supplied by a pluggable [`Clock`].

mod blueprint;
mod clock;
mod command;
mod counters;
mod error;
mod handler;

pub use blueprint::*;
pub use clock::{Clock, ManualClock, SystemClock};
pub use command::{Batch, Command};
pub use counters::{CounterSink, NullCounters};
pub use error::*;
pub use handler::*;
