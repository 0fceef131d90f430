//! Log to a file; the terminal belongs to the scene.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use env_logger::{Builder, Env, Target};
use galaxy_config::Config;

/// Initialise `env_logger` writing to the configured log file. `RUST_LOG`
/// overrides the configured level. Returns the log path, or `None` when
/// logging stays off.
pub fn init(config: &Config) -> Option<PathBuf> {
    let path = config.log_file()?;
    if let Some(parent) = path.parent()
        && let Err(err) = fs::create_dir_all(parent)
    {
        eprintln!("galaxy: cannot create {}: {err}", parent.display());
        return None;
    }
    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("galaxy: cannot open log file {}: {err}", path.display());
            return None;
        }
    };

    Builder::from_env(Env::default().default_filter_or(config.logging.level.as_str()))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .ok()?;
    Some(path)
}
