use std::sync::Arc;

use tui::backend::Backend;
use tui::layout::Rect;
use tui::widgets::{Row, TableState};
use tui::Frame;

use super::{Component, Styles};

pub struct Table<'a, T> {
    list: Vec<T>,
    state: TableState,

    header: Option<Row<'a>>,
    row_builder: Arc<dyn Fn(&T) -> Row>,
    styles: Styles<'a>,
}

impl<'a, T> Table<'a, T> {
    pub fn new<RB>(list: Vec<T>, row_builder: RB, styles: Styles<'a>) -> Self
    where
        RB: Fn(&T) -> Row + 'static,
    {
        let mut table = Self {
            list: vec![],
            state: TableState::default(),
            header: None,
            row_builder: Arc::new(row_builder),
            styles,
        };

        table.set_list(list);

        table
    }

    pub fn with_header(mut self, header: Row<'a>) -> Self {
        self.header = Some(header);

        self
    }

    pub fn set_block(&mut self, block: tui::widgets::Block<'a>) {
        self.styles.block = Some(block);
    }

    /// Replaces rows keeping the selection in range.
    pub fn set_list(&mut self, list: Vec<T>) {
        self.list = list;

        let selected = match self.state.selected() {
            _ if self.list.is_empty() => None,
            Some(idx) => Some(idx.min(self.list.len() - 1)),
            None => Some(0),
        };

        self.state.select(selected);
    }

    pub fn handle_up(&mut self) {
        if self.list.is_empty() {
            return;
        }

        let idx = self.state.selected().unwrap_or(0);

        if idx == 0 {
            self.state.select(Some(self.list.len() - 1));
        } else {
            self.state.select(Some(idx - 1));
        }
    }

    pub fn handle_down(&mut self) {
        if self.list.is_empty() {
            return;
        }

        let idx = self.state.selected().unwrap_or(0);

        if idx >= self.list.len() - 1 {
            self.state.select(Some(0));
        } else {
            self.state.select(Some(idx + 1));
        }
    }

    pub fn get_selected(&self) -> Option<&T> {
        self.list.get(self.state.selected()?)
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    fn build_rows(&self) -> Vec<Row> {
        self.list.iter().map(|s| (self.row_builder)(s)).collect()
    }
}

impl<'a, T> Component for Table<'a, T> {
    fn draw<B: Backend>(&self, frame: &mut Frame<B>, area: Rect) {
        let rows: Vec<Row> = self.build_rows();
        let mut table = tui::widgets::Table::new(rows);

        if let Some(ref header) = self.header {
            table = table.header(header.clone());
        }

        if let Some(ref block) = self.styles.block {
            table = table.block(block.clone());
        }

        if let Some(highlight_style) = self.styles.highlight_style {
            table = table.highlight_style(highlight_style);
        }

        if let Some(widths) = self.styles.widths {
            table = table.widths(widths);
        }

        frame.render_stateful_widget(table, area, &mut self.state.clone());
    }
}
