use crate::theme::Theme;
use ratatui::widgets::{Block, Borders};

pub fn panel_block(title: &str, focused: bool) -> Block<'_> {
    panel_block_themed(title, focused, &Theme::default())
}

pub fn panel_block_themed<'a>(title: &'a str, focused: bool, theme: &Theme) -> Block<'a> {
    let b = Block::default().borders(Borders::ALL).title(title);
    if focused {
        b.border_style(theme.border_focused())
    } else {
        b.border_style(theme.border_unfocused())
    }
}
