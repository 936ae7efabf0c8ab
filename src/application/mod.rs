//! Application layer - use cases that coordinate the upstream clients.

mod aggregate;

pub use aggregate::MovieAggregator;
