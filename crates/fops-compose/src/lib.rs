//! # fops-compose
//!
//! Composition Engine. Selects a skeleton for (artifact family, platform,
//! language), decides which sections to include, splices retrieved guidance
//! into matching sections, and refuses to emit any file that does not parse
//! under its own format's grammar.

pub mod engine;
pub mod grammar;
pub mod platforms;
pub mod request;
pub mod sections;
pub mod toolchain;

mod yaml;

pub use engine::CompositionEngine;
pub use request::{CompositionRequest, OrgProfile};
pub use sections::{Guidance, Section, SectionKind};
pub use toolchain::Toolchain;
