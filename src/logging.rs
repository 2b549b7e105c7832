//! Tracing subscriber setup.
//!
//! Logs go to stderr so they never mix with tables, JSON or plots on stdout.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber for `level`.
///
/// `level` is any `EnvFilter` directive (`info`, `sales_insight=debug`, ...);
/// the upper-case names `WARNING` and `CRITICAL` are accepted as well.
/// Calling this twice is harmless: the second call is ignored.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(normalise_level(level)).unwrap_or_else(|_| EnvFilter::new("warn"));

    let layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
}

fn normalise_level(level: &str) -> String {
    match level.trim().to_uppercase().as_str() {
        "WARNING" => "warn".to_string(),
        "CRITICAL" => "error".to_string(),
        "" => "warn".to_string(),
        _ => level.trim().to_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_are_normalised() {
        assert_eq!(normalise_level("WARNING"), "warn");
        assert_eq!(normalise_level("Info"), "info");
        assert_eq!(normalise_level(" "), "warn");
        assert_eq!(normalise_level("sales_insight=DEBUG"), "sales_insight=debug");
    }

    #[test]
    fn init_twice_does_not_panic() {
        init_logging("debug");
        init_logging("not a valid [directive");
    }
}
