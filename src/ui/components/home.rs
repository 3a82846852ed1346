use crossterm::event::{Event, KeyCode, KeyModifiers};
use tui::backend::Backend;
use tui::layout::{Constraint, Direction, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Span, Spans};
use tui::widgets::{Paragraph, Wrap};
use tui::Frame;

use crate::app::{App, Field, Session};
use crate::models::Fuel;
use crate::price::{format_ratio, CURRENCY_SYMBOL};
use crate::storage::Storage;

use super::{rounded_block, Action};

/// Price form and the calculation result.
pub struct Home {
    focus: usize,
}

impl Home {
    pub fn new() -> Self {
        Self { focus: 0 }
    }

    pub fn focused(&self) -> Field {
        Field::ALL[self.focus]
    }

    pub fn focus_first(&mut self) {
        self.focus = 0;
    }

    fn next(&mut self) {
        self.focus = (self.focus + 1) % Field::ALL.len();
    }

    fn prev(&mut self) {
        self.focus = (self.focus + Field::ALL.len() - 1) % Field::ALL.len();
    }

    pub async fn handle_event<S: Storage>(&mut self, event: Event, app: &mut App<S>) -> Action {
        let Event::Key(key) = event else {
            return Action::None;
        };

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Tab | KeyCode::Down => self.next(),
            KeyCode::BackTab | KeyCode::Up => self.prev(),
            KeyCode::Enter => {
                app.calculate();
            }
            KeyCode::Esc => {
                app.clear_form();
                self.focus_first();
            }
            KeyCode::Backspace => app.erase(self.focused()),
            KeyCode::Char('s') if ctrl => {
                let notice = app.save_station().await;
                self.focus_first();

                return Action::Notify(notice);
            }
            KeyCode::Char('t') if ctrl => app.toggle_threshold().await,
            KeyCode::Char('l') if ctrl => {
                if !app.request_location() {
                    log::debug!("location lookup already running");
                }
            }
            KeyCode::Char(c) if !ctrl => app.input(self.focused(), c),
            _ => {}
        }

        Action::None
    }

    pub fn render<B: Backend>(&self, frame: &mut Frame<B>, area: Rect, session: &Session, locating: bool) {
        let mut constraints = vec![Constraint::Length(3); Field::ALL.len()];
        constraints.push(Constraint::Length(3));
        constraints.push(Constraint::Min(3));

        let title = if session.is_editing() {
            "Edit station"
        } else {
            "Fuel calculator"
        };

        let outer = rounded_block(title, false);
        let inner = outer.inner(area);
        frame.render_widget(outer, area);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        for (i, field) in Field::ALL.iter().enumerate() {
            self.render_field(frame, layout[i], session, *field, locating);
        }

        let threshold = Paragraph::new(Spans::from(vec![
            Span::raw("Alcohol pays off up to "),
            Span::styled(
                session.threshold.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(" of the gasoline price (Ctrl-t switches 70% / 75%)"),
        ]))
        .block(rounded_block("Threshold", false));

        frame.render_widget(threshold, layout[Field::ALL.len()]);

        let result = match &session.result {
            Some(r) => {
                let color = match r.fuel() {
                    Some(Fuel::Alcohol) => Color::Green,
                    Some(Fuel::Gasoline) => Color::Yellow,
                    None => Color::Red,
                };

                Spans::from(Span::styled(r.to_string(), Style::default().fg(color)))
            }
            None => Spans::from(Span::styled(
                "Enter: calculate  Ctrl-s: save  Ctrl-l: locate  Esc: clear",
                Style::default().fg(Color::DarkGray),
            )),
        };

        let title = match session.result.as_ref().and_then(|r| r.ratio()) {
            Some(ratio) => format!("Result (alcohol at {}%)", format_ratio(ratio)),
            None => "Result".to_string(),
        };

        let result = Paragraph::new(result)
            .block(rounded_block(&title, false))
            .wrap(Wrap { trim: true });

        frame.render_widget(result, layout[Field::ALL.len() + 1]);
    }

    fn render_field<B: Backend>(
        &self,
        frame: &mut Frame<B>,
        area: Rect,
        session: &Session,
        field: Field,
        locating: bool,
    ) {
        let focused = field == self.focused();
        let value = session.form.value(field);

        let prefix = if field.is_price() {
            format!("{CURRENCY_SYMBOL} ")
        } else {
            String::new()
        };

        let title = if field == Field::Location && locating {
            "Location (locating…)"
        } else {
            field.label()
        };

        let text = Spans::from(vec![
            Span::styled(prefix.clone(), Style::default().fg(Color::DarkGray)),
            Span::raw(value),
        ]);

        frame.render_widget(
            Paragraph::new(text).block(rounded_block(title, focused)),
            area,
        );

        if focused {
            let offset = (prefix.chars().count() + value.chars().count()) as u16;
            let x = (area.x + 1 + offset).min(area.right().saturating_sub(2));

            frame.set_cursor(x, area.y + 1);
        }
    }
}
