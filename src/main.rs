mod app;
mod config;
mod logging;
mod nav;
mod ui;
mod wallet;

use crate::app::event_loop::EventLoop;
use crate::app::shutdown::Shutdown;
use crate::app::window;
use crate::nav::{Page, WindowHost, WindowNavigator};
use crate::ui::pages::{Load, StartPage};
use crate::ui::Toast;
use crate::wallet::StaticWallet;
use anyhow::{Context, Result};
use crossterm::{
    event::{DisableFocusChange, EnableFocusChange},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::layout::Size;
use ratatui::prelude::*;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Everything built before the terminal is taken over. Failing here exits
/// with status 1 without drawing anything.
struct Startup {
    config: Arc<config::AppConfig>,
    keys: Arc<config::KeyBindings>,
}

fn startup() -> Result<Startup> {
    let cfg = config::load_config()?;
    let keys = cfg
        .keys
        .bindings()
        .context("Invalid key binding in [keys]")?;
    if let Some(path) = logging::init(&cfg.logging)? {
        info!(path = %path.display(), "logging started");
    }
    Ok(Startup {
        config: Arc::new(cfg),
        keys: Arc::new(keys),
    })
}

#[tokio::main]
async fn main() {
    let startup = match startup() {
        Ok(startup) => startup,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    // Install panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        original_hook(info);
    }));

    let terminal = match setup_terminal() {
        Ok(terminal) => terminal,
        Err(e) => {
            let _ = restore_terminal();
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    let result = run_app(terminal, startup).await;

    // Restore terminal
    let _ = restore_terminal();

    if let Err(e) = result {
        error!(error = %e, "event loop failed");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
    info!("window closed");
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)
        .context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("Failed to create terminal")
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableFocusChange)?;
    Ok(())
}

async fn run_app(
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    startup: Startup,
) -> Result<()> {
    let Startup { config, keys } = startup;

    let area = terminal.size().context("Failed to read terminal size")?;
    let (host, mut frames, input_tx) = window::window(Size::new(area.width, area.height));
    let _input = window::spawn_input_pump(input_tx);

    let shutdown = Shutdown::new();
    let navigator = WindowNavigator::new(host.clone(), shutdown.clone());
    let toast = Arc::new(Toast::new(
        host.clone(),
        Duration::from_millis(config.ui.toast_short_ms),
        Duration::from_millis(config.ui.toast_long_ms),
    ));

    let load = Load {
        wallet: StaticWallet::from_config(&config.wallet),
        toast: Arc::clone(&toast),
        keys,
        config,
    };
    let initial_page = Box::new(move || -> Box<dyn Page> { Box::new(StartPage::new(load.clone())) });

    let mut event_loop = EventLoop::new(terminal, navigator, toast, shutdown, initial_page);

    // First frame
    host.invalidate();
    event_loop.run(&mut frames).await
}
