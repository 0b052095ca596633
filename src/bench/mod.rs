mod config;
mod runner;

pub use config::{BenchConfig, CodecKind, ScenarioKind};
pub use runner::BenchRunner;
