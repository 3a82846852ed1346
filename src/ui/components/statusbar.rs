use tui::backend::Backend;
use tui::layout::{Alignment, Rect};
use tui::style::{Color, Style};
use tui::text::{Span, Spans};
use tui::widgets::{Block, BorderType, Borders, Paragraph};
use tui::Frame;

use crate::app::{App, Notice};
use crate::models::Threshold;
use crate::storage::Storage;

use super::Component;

pub struct StatusBar {
    notice: Option<Notice>,
    threshold: Threshold,
    locating: bool,
    editing: bool,
}

impl StatusBar {
    pub fn new() -> Self {
        Self {
            notice: None,
            threshold: Threshold::default(),
            locating: false,
            editing: false,
        }
    }

    pub fn set_app_state<S: Storage>(&mut self, app: &App<S>) {
        self.threshold = app.session().threshold;
        self.locating = app.is_locating();
        self.editing = app.session().is_editing();
    }

    pub fn set_notice(&mut self, notice: Notice) {
        log::debug!("notice: {}", notice);
        self.notice = Some(notice);
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    fn get_title(&self) -> String {
        format!(
            "{} (threshold {}) | F1 home  F2 stations  Ctrl-q quit",
            if self.editing { "Editing" } else { "Ready" },
            self.threshold
        )
    }

    fn get_text(&self) -> Vec<Spans> {
        if self.locating {
            return vec![Spans::from(Span::styled(
                "Locating…",
                Style::default().fg(Color::Cyan),
            ))];
        }

        self.notice.as_ref().map_or_else(Vec::new, |notice| {
            let color = match notice {
                Notice::StationSaved | Notice::StationUpdated | Notice::StationDeleted => {
                    Color::Green
                }
                _ => Color::Yellow,
            };

            vec![Spans::from(Span::styled(
                notice.to_string(),
                Style::default().fg(color),
            ))]
        })
    }
}

impl Component for StatusBar {
    fn draw<B: Backend>(&self, frame: &mut Frame<B>, area: Rect) {
        let paragraph = Paragraph::new(self.get_text())
            .block(
                Block::default()
                    .title(self.get_title())
                    .borders(Borders::LEFT | Borders::TOP | Borders::RIGHT)
                    .border_type(BorderType::Rounded),
            )
            .alignment(Alignment::Left);

        frame.render_widget(paragraph, area);
    }
}
