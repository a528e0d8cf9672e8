use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::*;

use crate::engine::controller::{FormController, FormStatus};

pub const HELP_BROWSE: &str = "↑/↓ move • Enter edit • Space toggle • Ctrl+S submit • q quit";
pub const HELP_EDITING: &str = "Enter commit • Esc cancel • Ctrl+S submit";

pub fn status_spans(ctl: &FormController) -> Vec<Span<'static>> {
    let mut spans: Vec<Span> = Vec::new();
    if let Some(msg) = ctl.status_message() {
        let color = crate::theme::status_color(ctl.status());
        let tag = match ctl.status() {
            FormStatus::Success => "[OK]",
            FormStatus::Failure => "[ERROR]",
            FormStatus::Unset => "",
        };
        spans.push(Span::styled(
            format!(" {tag} "),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(msg, Style::default().fg(color)));
        spans.push(Span::raw("  |  "));
    }
    spans
}

pub fn draw_footer(f: &mut Frame, area: Rect, ctl: &FormController, editing: bool) {
    let mut spans = status_spans(ctl);
    let help = if editing { HELP_EDITING } else { HELP_BROWSE };
    spans.push(Span::styled(help, Style::default().fg(Color::DarkGray)));
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
