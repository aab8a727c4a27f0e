//! Ties the sentiment stages to their data sources.
//!
//! [`PipelineController`] turns already-fetched inputs into an
//! [`AnalysisOutcome`](analysis_core::AnalysisOutcome); [`SentimentPipeline`]
//! fetches those inputs first.

pub mod cache;
pub mod config;
pub mod controller;
pub mod pipeline;
pub mod price;

pub use cache::CachedSource;
pub use config::{ClassifierBackend, PipelineConfig};
pub use controller::{normalize_ticker, PipelineController};
pub use pipeline::SentimentPipeline;
pub use price::price_summary;

#[cfg(test)]
mod tests;
