//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `RunPhase`: lifecycle of one orchestrator run (idle, seeding, running, draining, done)
//! - `SeenRegistry`: run-scoped set of URLs already dispatched or offered as link hints

mod run_phase;
mod seen_registry;

pub use run_phase::RunPhase;
pub use seen_registry::SeenRegistry;
