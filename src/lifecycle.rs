//! Process lifecycle helpers shared by the CLI entry points.

/// Initialize logging with tracing_subscriber.
///
/// `log` records from this crate and its dependencies are bridged through
/// `tracing-log`, so `RUST_LOG` controls everything.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(directive("sqlx=warn"))
        .add_directive(directive("hyper=warn"))
        .add_directive(directive("puzzle_leaderboard=debug"))
        .add_directive(directive("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .with_target(false)
        .with_ansi(true)
        .try_init();
}

fn directive(raw: &'static str) -> tracing_subscriber::filter::Directive {
    // Static directives; a typo here is a programming error.
    raw.parse()
        .unwrap_or_else(|e| panic!("invalid log directive {raw:?}: {e}"))
}
