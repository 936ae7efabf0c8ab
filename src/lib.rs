//! Movie aggregation gateway.
//!
//! Fetches a movie from the movie-info service and its reviews from the
//! reviews service, and merges them into one [`domain::AggregatedMovie`].

pub mod application;
pub mod client;
pub mod config;
pub mod domain;
pub mod http;
