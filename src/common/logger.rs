use env_logger::Env;

use super::DEFAULT_LOG_FILTER;

/// Logger honoring `RUST_LOG`, falling back to [`DEFAULT_LOG_FILTER`].
pub fn get_logger() -> env_logger::Builder {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or(DEFAULT_LOG_FILTER));
    builder.format_timestamp_millis();
    builder
}

/// Logger for unit tests, safe to call from every test.
#[cfg(test)]
pub fn init_test_logger() {
    let _ = get_logger().is_test(true).try_init();
}
