//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system
///
/// Honours `RUST_LOG` and falls back to `default_level` otherwise. Safe to
/// call more than once; later calls are ignored.
pub fn init(default_level: log::LevelFilter) {
    let env_filters = std::env::var(env_logger::DEFAULT_FILTER_ENV).ok();
    let _ = builder(default_level, env_filters.as_deref()).try_init();
}

/// Logger builder with `default_level` overridden by `env_filters`, when given
///
/// `env_filters` uses the `RUST_LOG` syntax.
pub fn builder(default_level: log::LevelFilter, env_filters: Option<&str>) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(default_level);
    if let Some(filters) = env_filters {
        builder.parse_filters(filters);
    }
    builder
}

/// Default verbosity for the build profile
pub fn default_level() -> log::LevelFilter {
    if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    }
}
