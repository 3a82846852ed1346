use crossterm::event::{Event, KeyCode};
use tui::backend::Backend;
use tui::layout::{Constraint, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::Span;
use tui::widgets::{Cell, Paragraph, Row};
use tui::Frame;

use crate::app::App;
use crate::models::Station;
use crate::price::format_currency_display;
use crate::storage::Storage;
use crate::store::MAX_STATIONS;

use super::{highlight_style, rounded_block, Action, Component, Styles, Table};

const WIDTHS: [Constraint; 4] = [
    Constraint::Percentage(30),
    Constraint::Percentage(15),
    Constraint::Percentage(15),
    Constraint::Percentage(40),
];

/// Saved stations with edit and delete.
pub struct Stations {
    table: Table<'static, Station>,
    /// Station waiting for delete confirmation.
    pending_delete: Option<Station>,
}

impl Stations {
    pub fn new() -> Self {
        let header = Row::new(vec!["Name", "Alcohol", "Gasoline", "Location"])
            .style(Style::default().add_modifier(Modifier::BOLD));

        let table = Table::new(
            vec![],
            |s: &Station| {
                Row::new(vec![
                    Cell::from(Span::raw(format!("⛽ {}", s.name.trim()))),
                    Cell::from(format_currency_display(s.alcohol_price)),
                    Cell::from(format_currency_display(s.gasoline_price)),
                    Cell::from(Span::styled(
                        s.location.as_str(),
                        if s.has_location() {
                            Style::default()
                        } else {
                            Style::default().fg(Color::DarkGray)
                        },
                    )),
                ])
            },
            Styles {
                block: None,
                highlight_style: Some(highlight_style()),
                widths: Some(&WIDTHS),
            },
        )
        .with_header(header);

        Self {
            table,
            pending_delete: None,
        }
    }

    /// Reloads rows from the app.
    pub fn refresh<S: Storage>(&mut self, app: &App<S>) {
        self.table.set_list(app.stations().to_vec());
    }

    pub async fn handle_event<S: Storage>(&mut self, event: Event, app: &mut App<S>) -> Action {
        let Event::Key(key) = event else {
            return Action::None;
        };

        if let Some(station) = self.pending_delete.take() {
            return match key.code {
                KeyCode::Char('y' | 'Y') => {
                    let action = match app.delete_station(&station.id).await {
                        Some(notice) => Action::Notify(notice),
                        None => Action::None,
                    };
                    self.refresh(app);

                    action
                }
                _ => Action::None,
            };
        }

        match key.code {
            KeyCode::Up => self.table.handle_up(),
            KeyCode::Down => self.table.handle_down(),
            KeyCode::Enter | KeyCode::Char('e') => {
                if let Some(station) = self.table.get_selected() {
                    if app.start_editing(&station.id) {
                        return Action::OpenHome;
                    }
                }
            }
            KeyCode::Delete | KeyCode::Char('d') => {
                self.pending_delete = self.table.get_selected().cloned();
            }
            _ => {}
        }

        Action::None
    }

    pub fn render<B: Backend>(&mut self, frame: &mut Frame<B>, area: Rect) {
        let count = self.table.len();

        let title = match &self.pending_delete {
            Some(station) => format!("Delete \"{}\"? y: confirm, any other key: cancel", station.name),
            None => format!("Stations [{count}/{MAX_STATIONS}]  e: edit  d: delete"),
        };

        let block = rounded_block("", true).title(Span::styled(
            title,
            if self.pending_delete.is_some() {
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            },
        ));

        if self.table.is_empty() {
            let empty = Paragraph::new("No saved stations yet. Fill the form on F1 and press Ctrl-s.")
                .block(block);

            frame.render_widget(empty, area);
            return;
        }

        self.table.set_block(block);
        self.table.draw(frame, area);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

    use super::{Action, Stations};
    use crate::app::{App, Field, Notice};
    use crate::location::tests::FakeGeocoder;
    use crate::location::{FixedPosition, Locator};
    use crate::storage::Sqlite;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    async fn app_with(names: &[&str]) -> App<Sqlite> {
        let db = Sqlite::new(":memory:").await.unwrap();
        let mut app = App::new(
            db,
            Locator::new(Arc::new(FixedPosition::default()), Arc::new(FakeGeocoder::Nothing)),
        );

        for name in names {
            for c in name.chars() {
                app.input(Field::Name, c);
            }
            for c in "300".chars() {
                app.input(Field::AlcoholPrice, c);
            }
            for c in "400".chars() {
                app.input(Field::GasolinePrice, c);
            }
            app.save_station().await;
        }

        app
    }

    #[tokio::test]
    async fn delete_needs_confirmation() {
        let mut app = app_with(&["A", "B"]).await;
        let mut stations = Stations::new();
        stations.refresh(&app);

        assert_eq!(stations.handle_event(key(KeyCode::Char('d')), &mut app).await, Action::None);
        assert_eq!(stations.handle_event(key(KeyCode::Esc), &mut app).await, Action::None);
        assert_eq!(app.stations().len(), 2);

        stations.handle_event(key(KeyCode::Char('d')), &mut app).await;
        assert_eq!(
            stations.handle_event(key(KeyCode::Char('y')), &mut app).await,
            Action::Notify(Notice::StationDeleted)
        );
        assert_eq!(app.stations().len(), 1);
        assert_eq!(app.stations()[0].name, "A");
    }

    #[tokio::test]
    async fn edit_opens_home() {
        let mut app = app_with(&["A", "B"]).await;
        let mut stations = Stations::new();
        stations.refresh(&app);

        stations.handle_event(key(KeyCode::Down), &mut app).await;
        assert_eq!(
            stations.handle_event(key(KeyCode::Char('e')), &mut app).await,
            Action::OpenHome
        );
        assert_eq!(app.session().form.name, "A");
        assert!(app.session().is_editing());
    }

    #[tokio::test]
    async fn empty_list_ignores_keys() {
        let mut app = app_with(&[]).await;
        let mut stations = Stations::new();
        stations.refresh(&app);

        for code in [KeyCode::Up, KeyCode::Enter, KeyCode::Char('d'), KeyCode::Char('y')] {
            assert_eq!(stations.handle_event(key(code), &mut app).await, Action::None);
        }
    }
}
