use log::LevelFilter;

/// Initialize the logger at `level`. Directives in `RUST_LOG` take
/// precedence over it.
///
/// With `trace_pass` the logger also accepts trace records while
/// `log::max_level` stays at `level`, so a single pass can raise the max
/// level to `Trace` without reinitializing.
pub fn init_logger(level: LevelFilter, trace_pass: bool) {
    let env_set = std::env::var_os(env_logger::DEFAULT_FILTER_ENV).is_some();
    let (filter, max_level) = levels(level, trace_pass, env_set);

    env_logger::Builder::new()
        .filter_level(filter)
        .parse_default_env()
        .init();

    if let Some(max_level) = max_level {
        log::set_max_level(max_level);
    }
}

/// Logger filter and, if it differs, the global max level to start with.
fn levels(level: LevelFilter, trace_pass: bool, env_set: bool) -> (LevelFilter, Option<LevelFilter>) {
    if trace_pass && !env_set {
        (LevelFilter::Trace, Some(level))
    } else {
        (level, None)
    }
}
