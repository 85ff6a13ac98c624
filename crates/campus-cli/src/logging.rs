// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

const LOG_ENV: &str = "CAMPUS_LOG";

/// Installs the stderr subscriber. `CAMPUS_LOG` wins over `RUST_LOG`, which
/// wins over the `--verbose` default.
pub fn init(verbose: bool) {
    let filter = build_filter(verbose);
    let stderr_is_tty = std::io::IsTerminal::is_terminal(&std::io::stderr());

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(stderr_is_tty)
        .with_target(verbose)
        .without_time()
        .compact();

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}

fn default_level(verbose: bool) -> Level {
    if verbose { Level::INFO } else { Level::WARN }
}

fn build_filter(verbose: bool) -> EnvFilter {
    if let Ok(directives) = std::env::var(LOG_ENV)
        && let Ok(filter) = EnvFilter::try_new(&directives)
    {
        return filter;
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::new(default_level(verbose).as_str())
}

#[cfg(test)]
mod tests {
    use super::default_level;
    use tracing::Level;

    #[test]
    fn verbose_raises_default_level() {
        assert_eq!(default_level(false), Level::WARN);
        assert_eq!(default_level(true), Level::INFO);
    }
}
