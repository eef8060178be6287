//! Model types shared by the backend client and the engine.
//!
//! Everything here mirrors the JSON the search backend speaks, plus the
//! client-side job state derived from it.

mod account;
mod calendar;
mod deal;
mod job;
mod search;

pub use account::*;
pub use calendar::*;
pub use deal::*;
pub use job::*;
pub use search::*;
