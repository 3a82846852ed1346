use tui::backend::Backend;
use tui::layout::{Constraint, Rect};
use tui::style::{Color, Modifier, Style};
use tui::widgets::{Block, BorderType, Borders};
use tui::Frame;

pub use home::Home;
pub use stations::Stations;
pub use statusbar::StatusBar;
pub use table::Table;

use crate::app::Notice;

mod home;
mod stations;
mod statusbar;
mod table;

pub trait Component {
    fn draw<B: Backend>(&self, frame: &mut Frame<B>, area: Rect);
}

/// What the screen asks the UI to do after handling a key.
#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    None,
    Notify(Notice),
    OpenHome,
}

#[derive(Default, Clone, Debug)]
pub struct Styles<'a> {
    pub block: Option<Block<'a>>,
    pub highlight_style: Option<Style>,
    pub widths: Option<&'a [Constraint]>,
}

pub(crate) fn rounded_block(title: &str, focused: bool) -> Block<'_> {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title);

    if focused {
        block.border_style(highlight_style())
    } else {
        block
    }
}

pub(crate) fn highlight_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}
