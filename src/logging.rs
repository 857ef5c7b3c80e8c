use tracing_subscriber::EnvFilter;

const CRATES: [&str; 5] = ["civic", "civic_cache", "civic_config", "civic_extract", "civic_fetch"];

/// Installs the global `tracing` subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence. Otherwise our own crates log at `info`,
/// raised to `debug` and then `trace` by each `-v`, and everything else at
/// `warn`.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));
    // Only fails if a subscriber is already installed, which is fine.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

fn default_directives(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let mut directives = vec!["warn".to_string(), format!("tower_http={level}")];
    directives.extend(CRATES.iter().map(|krate| format!("{krate}={level}")));
    directives.join(",")
}
