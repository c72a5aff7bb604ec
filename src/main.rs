mod api;
mod app;
mod browser;
mod config;
mod event;
mod git;
mod modals;
mod model;
mod ui;

use std::io;
use std::panic;
use std::sync::Arc;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use tokio::sync::mpsc;

use app::{Action, App};

#[tokio::main]
async fn main() -> Result<()> {
    let config = match config::load_config() {
        Ok(config) => config,
        Err(e) => {
            // On a fresh machine, write the template and point the user at it.
            if let Ok(path) = config::write_template() {
                eprintln!("Error: {e}");
                eprintln!("A config template is at {}", path.display());
                std::process::exit(1);
            }
            return Err(e);
        }
    };

    let service: Arc<dyn api::Service> = Arc::new(api::azdo::AzdoClient::new(&config));

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let mut app = App::new(&config, service, action_tx.clone());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    // Restore the terminal even when rendering panics.
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    tokio::spawn(async move {
        event::run_event_loop(action_tx).await;
    });

    app.load_data();

    loop {
        let size = terminal.size()?;
        let layout = ui::main_layout(Rect::new(0, 0, size.width, size.height));
        app.set_list_visible_rows(ui::work_items::visible_rows(layout.items));

        terminal.draw(|f| ui::render(f, &app))?;

        match action_rx.recv().await {
            Some(action) => {
                app.update(action);
                if app.should_quit {
                    break;
                }
            }
            None => break,
        }
    }

    terminal.show_cursor()?;
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}
