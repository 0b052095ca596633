/// Postings per chunk when the config doesn't say otherwise.
pub const DEFAULT_CHUNK_FACTOR: usize = 5;

pub const DEFAULT_FIXTURE_SEED: u64 = 0x5EED_1400;

pub const BENCH_CONFIG_FILE: &str = "bench_config.json";

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";
