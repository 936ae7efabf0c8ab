//! Records exchanged with the upstream services and the merged result.

pub mod model;

pub use model::*;
