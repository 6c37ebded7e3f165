use tracing_subscriber::EnvFilter;

/// Targets logged at `info` unless `RUST_LOG` says otherwise.
pub const DEFAULT_LOG_DIRECTIVES: &[&str] = &["billgate_server=info", "billgate_core=info"];

/// `RUST_LOG` filter with the crate defaults added.
pub fn log_filter() -> anyhow::Result<EnvFilter> {
    let mut filter = EnvFilter::from_default_env();
    for directive in DEFAULT_LOG_DIRECTIVES {
        filter = filter.add_directive(directive.parse()?);
    }
    Ok(filter)
}
