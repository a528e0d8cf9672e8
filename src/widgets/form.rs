use crate::engine::controller::{FormController, FormStatus};
use crate::engine::value::FieldValue;
use crate::engine::walker::{flatten, FlatField};
use crate::model::{FieldKind, FieldSpec};
use crate::widgets::chrome::panel_block;
use ratatui::prelude::*;
use ratatui::widgets::*;

pub const OPTIONS_VISIBLE: usize = 8;
pub const SUBMIT_LABEL: &str = "[ Submit ]";

/// Cursor and in-progress edit for the form pane. Field values themselves live in
/// the controller.
#[derive(Clone, Debug, Default)]
pub struct FormView {
    /// Index into the focus targets: editable rows, then the submit button.
    pub selected: usize,
    pub editing: bool,
    pub buffer: String,
    pub option_cursor: usize,
    /// Last rejected edit, shown under the fields.
    pub message: Option<String>,
}

/// Indices of rows in `flat` that take focus.
pub fn focus_rows(flat: &[FlatField<'_>]) -> Vec<usize> {
    flat.iter()
        .enumerate()
        .filter(|(_, row)| row.is_editable())
        .map(|(i, _)| i)
        .collect()
}

fn option_label<'a>(spec: &'a FieldSpec, value: &'a str) -> Option<&'a str> {
    spec.kind
        .options()?
        .iter()
        .find(|o| o.value == value)
        .map(|o| o.label.as_str())
}

/// Display text for a stored value; `None` when nothing has been entered.
pub fn value_text(spec: &FieldSpec, value: Option<&FieldValue>) -> Option<String> {
    match (&spec.kind, value) {
        (FieldKind::Checkbox, v) => {
            let on = v.and_then(|v| v.as_bool()).unwrap_or(false);
            Some(if on { "[x]" } else { "[ ]" }.to_string())
        }
        (_, None) => None,
        (FieldKind::Select { .. } | FieldKind::Radio { .. }, Some(v)) => {
            let raw = v.display_string();
            if raw.is_empty() {
                return None;
            }
            Some(option_label(spec, &raw).map(str::to_string).unwrap_or(raw))
        }
        (_, Some(v)) => Some(v.display_string()),
    }
}

fn option_window(len: usize, cursor: usize) -> (usize, usize) {
    let start = cursor.saturating_sub(OPTIONS_VISIBLE - 1).min(len);
    let end = (start + OPTIONS_VISIBLE).min(len);
    (start, end)
}

pub fn draw_form(
    f: &mut Frame,
    area: Rect,
    ctl: &FormController,
    view: &FormView,
    highlight: bool,
    cursor_on: bool,
) {
    let flat = flatten(ctl.schema());
    let focusable = focus_rows(&flat);
    let focused_row = focusable.get(view.selected).copied();
    let mut lines: Vec<Line> = Vec::new();

    for (i, row) in flat.iter().enumerate() {
        let spec = row.spec();
        let indent = "  ".repeat(row.depth());
        let req = if spec.required { " *" } else { "" };
        match row {
            FlatField::Group { .. } => {
                lines.push(Line::from(Span::styled(
                    format!("  {indent}-- {}{req} --", spec.label),
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD),
                )));
            }
            FlatField::Note { .. } => {
                lines.push(Line::from(Span::styled(
                    format!("  {indent}{}", spec.label),
                    crate::theme::text_muted(),
                )));
            }
            FlatField::Leaf { path, .. } => {
                let is_sel = focused_row == Some(i);
                let sel = if is_sel { '›' } else { ' ' };
                let editing_here = is_sel && view.editing;
                let stored = ctl.state().get_path(path);
                let value_style = if editing_here {
                    crate::theme::text_editing_bold()
                } else if is_sel {
                    crate::theme::text_active_bold()
                } else {
                    Style::default()
                };
                let mut spans = vec![Span::raw(format!("{sel} {indent}{}{req}: ", spec.label))];
                if editing_here && spec.kind.options().is_none() {
                    let mut val = view.buffer.clone();
                    if cursor_on {
                        val.push('▏');
                    }
                    spans.push(Span::styled(val, value_style));
                } else {
                    match value_text(spec, stored) {
                        Some(v) => spans.push(Span::styled(v, value_style)),
                        None => spans.push(Span::styled(
                            spec.placeholder.clone().unwrap_or_default(),
                            crate::theme::text_muted(),
                        )),
                    }
                }
                if spec.disabled {
                    spans.push(Span::styled(" (disabled)", crate::theme::text_muted()));
                }
                lines.push(Line::from(spans));

                if let (true, Some(options)) = (editing_here, spec.kind.options()) {
                    let current = stored.map(|v| v.display_string());
                    let radio = matches!(spec.kind, FieldKind::Radio { .. });
                    let (start, end) = option_window(options.len(), view.option_cursor);
                    for (oi, opt) in options.iter().enumerate().take(end).skip(start) {
                        let chosen = current.as_deref() == Some(opt.value.as_str());
                        let mark = match (radio, chosen) {
                            (true, true) => "(•)",
                            (true, false) => "( )",
                            (false, true) => "[•]",
                            (false, false) => "[ ]",
                        };
                        let cur = if oi == view.option_cursor { '›' } else { ' ' };
                        let st = if oi == view.option_cursor {
                            crate::theme::list_cursor_style()
                        } else {
                            crate::theme::text_muted()
                        };
                        lines.push(Line::from(Span::styled(
                            format!("  {indent}{cur} {mark} {}", opt.label),
                            st,
                        )));
                    }
                }
            }
        }
    }

    if !flat.is_empty() {
        lines.push(Line::from(""));
    }
    let submit_style = if view.selected == focusable.len() {
        crate::theme::list_cursor_style()
    } else {
        crate::theme::text_active_bold()
    };
    lines.push(Line::from(Span::styled(
        format!("  {SUBMIT_LABEL}"),
        submit_style,
    )));
    if ctl.status() == FormStatus::Failure {
        if let Some(reason) = ctl.last_verdict().and_then(|v| v.reason()) {
            lines.push(Line::from(Span::styled(
                format!("  ! {reason}"),
                crate::theme::text_error(),
            )));
        }
    }
    if let Some(msg) = &view.message {
        lines.push(Line::from(Span::styled(
            format!("  ! {msg}"),
            crate::theme::text_error(),
        )));
    }

    let title = if view.editing {
        format!("{} · editing", ctl.settings().title)
    } else {
        ctl.settings().title.clone()
    };
    let block = panel_block(&title, highlight);
    let p = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(p, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::sanitize::RawEdit;
    use crate::engine::value::FieldPath;
    use crate::model::{FieldSpec, FormSchema, FormSettings, SelectOption};
    use ratatui::backend::TestBackend;

    fn controller() -> FormController {
        let schema = FormSchema::new(vec![
            FieldSpec::text("name").label("Name").required(),
            FieldSpec::text("id").label("Id").disabled(),
            FieldSpec::radio(
                "plan",
                vec![
                    SelectOption::new("free", "Free"),
                    SelectOption::new("pro", "Pro"),
                ],
            )
            .label("Plan"),
            FieldSpec::nested(
                "address",
                vec![
                    FieldSpec::text("area").label("Area").placeholder("Enter area"),
                    FieldSpec::checkbox("primary").label("Primary"),
                ],
            )
            .label("Address"),
        ])
        .unwrap();
        FormController::new(schema, FormSettings::default())
    }

    fn render(ctl: &FormController, view: &FormView) -> Vec<String> {
        let backend = TestBackend::new(48, 16);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| draw_form(f, f.area(), ctl, view, true, false))
            .unwrap();
        let buf = terminal.backend().buffer().clone();
        let mut out = Vec::new();
        for y in 1..(buf.area.height - 1) {
            let mut line = String::new();
            for x in 1..(buf.area.width - 1) {
                line.push_str(buf[(x, y)].symbol());
            }
            out.push(line.trim_end().to_string());
        }
        out
    }

    #[test]
    fn renders_markers_groups_and_submit_button() {
        let ctl = controller();
        let lines = render(&ctl, &FormView::default());
        assert_eq!(lines[0], "› Name *:");
        assert_eq!(lines[1], "  Id:  (disabled)");
        assert_eq!(lines[2], "  Plan:");
        assert_eq!(lines[3], "  -- Address --");
        assert_eq!(lines[4], "    Area: Enter area");
        assert_eq!(lines[5], "    Primary: [ ]");
        assert_eq!(lines[7], "  [ Submit ]");
    }

    #[test]
    fn stored_values_and_option_labels_are_shown() {
        let mut ctl = controller();
        ctl.on_field_edit(&FieldPath::parse("plan"), &RawEdit::text("pro"))
            .unwrap();
        ctl.on_field_edit(&FieldPath::parse("address.primary"), &RawEdit::checked(true))
            .unwrap();
        let lines = render(&ctl, &FormView::default());
        assert_eq!(lines[2], "  Plan: Pro");
        assert_eq!(lines[5], "    Primary: [x]");
    }

    #[test]
    fn editing_radio_lists_options_with_cursor() {
        let mut ctl = controller();
        ctl.on_field_edit(&FieldPath::parse("plan"), &RawEdit::text("free"))
            .unwrap();
        let view = FormView {
            selected: 1,
            editing: true,
            option_cursor: 1,
            ..FormView::default()
        };
        let lines = render(&ctl, &view);
        assert_eq!(lines[2], "› Plan: Free");
        assert_eq!(lines[3], "    (•) Free");
        assert_eq!(lines[4], "  › ( ) Pro");
    }

    #[test]
    fn failed_submit_shows_reason() {
        let mut ctl = controller();
        ctl.on_submit();
        let lines = render(&ctl, &FormView::default());
        assert!(lines.iter().any(|l| l == "  ! 'name' is required"));
    }

    #[test]
    fn option_window_follows_cursor() {
        assert_eq!(option_window(3, 0), (0, 3));
        assert_eq!(option_window(20, 3), (0, 8));
        assert_eq!(option_window(20, 12), (5, 13));
    }
}
