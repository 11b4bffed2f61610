//! Concurrent page fetching and document collection for DeepBrief.
//!
//! The [`ContentCollector`] drives per-URL fetch+structure work against a
//! bounded worker pool until a target document count is met; the engine
//! only ever sees the joined result.

mod client;
mod collector;

pub use collector::ContentCollector;
