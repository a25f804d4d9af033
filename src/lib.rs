pub mod cache;
pub mod config;
pub mod engine;
pub mod graph;
pub mod model;
pub mod query;
pub mod resolve;
pub mod shared;
pub mod timetable;

pub use config::Config;
pub use engine::Pathfinder;
pub use query::{Journey, Leg, Mode};

/// Bumped on incompatible changes to the on-disk cache layout.
pub(crate) const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
