use std::{fs::OpenOptions, sync::Mutex};

use tracing_subscriber::EnvFilter;

use crate::config::SessionConfig;

fn default_level(config: &SessionConfig) -> &'static str {
    if config.verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Install the global tracing subscriber from the session's `verbose` and `log_file`.
///
/// With a log file, output is appended there (MI traffic can be noisy); otherwise it goes to
/// stderr. `RUST_LOG` overrides the level chosen from `verbose`.
pub fn init(config: &SessionConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(config)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = match config.log_file.as_deref() {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))
}
