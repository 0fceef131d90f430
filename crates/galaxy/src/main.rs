use std::io::stdout;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
};
use galaxy_config::Config;

mod app;
mod assets;
mod effects;
mod logging;
mod overlay;
mod recorder;
mod recovery;
mod view;

use app::App;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let config = Config::load()?;
    if std::env::args().any(|arg| arg == "--write-config") {
        let path = config.save()?;
        println!("wrote {}", path.display());
        return Ok(());
    }
    if let Some(path) = logging::init(&config) {
        log::info!("logging to {}", path.display());
    }
    let app = App::new(config)?;

    let terminal = ratatui::init();
    recovery::install_panic_hook();
    let result = execute!(stdout(), EnableMouseCapture)
        .map_err(color_eyre::Report::from)
        .and_then(|()| app.run(terminal));
    if let Err(err) = execute!(stdout(), DisableMouseCapture) {
        log::warn!("could not release the mouse: {err}");
    }
    ratatui::restore();
    result
}
