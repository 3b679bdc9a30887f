//! Foundational concurrency building blocks used by the higher layers for
//! safe fan-out and backpressure.

mod barrier;
mod bounded;
mod parallel;
mod set;

pub use barrier::{Barrier, BarrierError};
pub use bounded::{BoundedBuffer, BoundedBufferError};
pub use parallel::{parallel_map, parallel_reduce};
pub use set::ConcurrentSet;
