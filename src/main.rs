use anyhow::{anyhow, Result};

mod app;
mod backend;
mod config;
mod handler;
mod reveal;
mod tui;
mod ui;

use app::App;
use config::Config;
use tui::EventHandler;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().unwrap_or_else(|_| Config::new());
    let mut app = App::new(&config);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new(config.reveal_interval_ms());

    // Session initializer: fetch the opening bot message before the
    // input accepts anything. Failure only becomes a transcript entry.
    app.begin_connect();
    let backend = app.backend.clone();
    app.pending = Some(tokio::spawn(async move { backend.initialize().await }));
    let mut connecting = true;

    let result = run(&mut terminal, &mut events, &mut app, &mut connecting).await;

    tui::restore()?;
    result
}

async fn run(
    terminal: &mut tui::Tui,
    events: &mut EventHandler,
    app: &mut App,
    connecting: &mut bool,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        // Settle the in-flight request once its task has finished.
        // The fast tick keeps this loop turning while nothing is typed.
        let finished = app
            .pending
            .as_ref()
            .map(|task| task.is_finished())
            .unwrap_or(false);
        if finished {
            if let Some(task) = app.pending.take() {
                let result = match task.await {
                    Ok(result) => result,
                    Err(e) => Err(anyhow!("request task failed: {}", e)),
                };
                if *connecting {
                    *connecting = false;
                    app.finish_connect(result);
                } else {
                    app.finish_exchange(result);
                }
            }
        }

        if let Some(event) = events.next().await {
            handler::handle_event(app, event);
        } else {
            break;
        }
    }

    Ok(())
}
