use std::io;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use tui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};

use components::{Action, Component, Home, Stations, StatusBar};

use crate::app::App;
use crate::storage::Storage;

mod components;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveBlock {
    Home,
    Stations,
}

pub struct Ui<S: Storage> {
    app: App<S>,
    closed: bool,

    active: ActiveBlock,
    home: Home,
    stations: Stations,
    status: StatusBar,
}

impl<S: Storage> Ui<S> {
    pub fn new(app: App<S>) -> Self {
        Self {
            app,
            closed: false,
            active: ActiveBlock::Home,
            home: Home::new(),
            stations: Stations::new(),
            status: StatusBar::new(),
        }
    }

    pub async fn start(&mut self) -> anyhow::Result<()> {
        setup_terminal()?;

        let backend = CrosstermBackend::new(io::stdout());

        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor().context("hide cursor")?;

        let tick_rate = Duration::from_millis(250);
        let mut last_tick = Instant::now();

        self.stations.refresh(&self.app);

        loop {
            if let Some(notice) = self.app.poll_location() {
                self.status.set_notice(notice);
            }
            self.status.set_app_state(&self.app);

            terminal.draw(|f| self.draw(f))?;

            let timeout = tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_secs(0));

            if event::poll(timeout)? {
                self.handle_event(event::read()?).await;

                if self.closed {
                    break;
                }
            }

            if last_tick.elapsed() >= tick_rate {
                last_tick = Instant::now();
            }
        }

        shutdown_terminal()
    }

    fn draw<B: Backend>(&mut self, f: &mut Frame<B>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(3)])
            .split(f.size());

        match self.active {
            ActiveBlock::Home => {
                self.home
                    .render(f, layout[0], self.app.session(), self.app.is_locating())
            }
            ActiveBlock::Stations => self.stations.render(f, layout[0]),
        }

        self.status.draw(f, layout[1]);
    }

    async fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            if key.kind != KeyEventKind::Press {
                return;
            }

            let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

            match key.code {
                KeyCode::Char('q' | 'c') if ctrl => {
                    self.closed = true;
                    return;
                }
                KeyCode::Char('q') if self.active == ActiveBlock::Stations => {
                    self.closed = true;
                    return;
                }
                KeyCode::F(1) => {
                    self.open(ActiveBlock::Home);
                    return;
                }
                KeyCode::F(2) => {
                    self.open(ActiveBlock::Stations);
                    return;
                }
                _ => {}
            }
        }

        let action = match self.active {
            ActiveBlock::Home => self.home.handle_event(event, &mut self.app).await,
            ActiveBlock::Stations => self.stations.handle_event(event, &mut self.app).await,
        };

        self.apply(action);
    }

    fn open(&mut self, block: ActiveBlock) {
        if block == ActiveBlock::Stations {
            self.stations.refresh(&self.app);
        }

        self.status.clear_notice();
        self.active = block;
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Notify(notice) => {
                self.status.set_notice(notice);
                self.stations.refresh(&self.app);
            }
            Action::OpenHome => {
                self.home.focus_first();
                self.open(ActiveBlock::Home);
            }
        }
    }
}

fn setup_terminal() -> anyhow::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("execute")?;
    enable_raw_mode().context("enable raw mod")?;

    std::panic::set_hook(Box::new(|info| {
        if let Err(e) = shutdown_terminal() {
            eprintln!("can't graceful shutdown terminal: {:?}", e);
        }
        eprintln!("{:?}", info);
    }));

    Ok(())
}

fn shutdown_terminal() -> anyhow::Result<()> {
    disable_raw_mode().context("disable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).context("execute")
}
