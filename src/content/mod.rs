//! Content aggregation and rendering

pub mod aggregator;
pub mod markdown;
pub mod model;

pub use aggregator::ContentAggregator;
pub use markdown::MarkdownRenderer;
