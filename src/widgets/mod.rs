pub mod chrome;
pub mod form;
pub mod form_widget;
pub mod status_bar;

use crossterm::event::KeyEvent;
use ratatui::prelude::*;

/// What a key press asks of the surrounding loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Edited,
    Submitted { ok: bool },
    Quit,
}

pub trait Widget {
    fn render(&mut self, f: &mut Frame, area: Rect, focused: bool, tick: u64);
    fn on_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let _ = key;
        Vec::new()
    }
}
