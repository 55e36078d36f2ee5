//! # fops-citation
//!
//! Citation Tracker. Accumulates retrieval results across a run and emits
//! one citation per knowledge item, in first-seen order.

pub mod render;
pub mod tracker;

pub use render::{citation_comment_block, numbered_markdown};
pub use tracker::CitationTracker;
