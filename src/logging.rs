use anyhow::Context;
use std::fs::File;
use std::path::Path;

/// The terminal is in raw alternate-screen mode while we run, so log lines go
/// to `log_file` when one is given. Without it logging stays off unless
/// `RUST_LOG` asks for it (stderr).
pub fn init(log_file: Option<&Path>) -> anyhow::Result<()> {
    let default_filter = if log_file.is_some() { "info" } else { "off" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    // A logger may already be installed (tests, embedding); keep it.
    let _ = builder.try_init();
    Ok(())
}
