pub mod app;
pub mod ui;

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::client::TableClient;
use crate::state::{Outcome, Request};
use app::{Action, App};
use ui::ui;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Spawns requests on the runtime and hands their outcomes back to the
/// thread that owns the [`App`].
struct Dispatcher {
    client: TableClient,
    runtime: Handle,
    tx: UnboundedSender<Outcome>,
}

impl Dispatcher {
    fn send(&self, request: Request) {
        debug!(?request, "dispatching");
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let outcome = client.execute(request).await;
            let _ = tx.send(outcome);
        });
    }
}

pub fn run_tui(client: TableClient, runtime: Handle) -> Result<()> {
    // Setup terminal
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture).context("enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let (tx, rx) = mpsc::unbounded_channel();
    let dispatcher = Dispatcher { client, runtime, tx };
    let mut app = App::new();

    let res = run_app(&mut terminal, &mut app, &dispatcher, rx);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    dispatcher: &Dispatcher,
    mut rx: UnboundedReceiver<Outcome>,
) -> Result<()> {
    if let Some(request) = app.state.begin_reload() {
        dispatcher.send(request);
    }

    loop {
        while let Ok(outcome) = rx.try_recv() {
            app.state.complete(outcome);
            app.clamp_selection();
        }

        terminal.draw(|f| ui(f, app)).context("draw frame")?;

        if !event::poll(POLL_INTERVAL).context("poll event")? {
            continue;
        }
        if let Event::Key(key) = event::read().context("read event")? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match app.handle_key(key) {
                Action::Quit => return Ok(()),
                Action::Send(request) => dispatcher.send(request),
                Action::None => {}
            }
        }
    }
}
