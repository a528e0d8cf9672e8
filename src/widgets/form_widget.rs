use crate::engine::controller::FormController;
use crate::engine::sanitize::RawEdit;
use crate::engine::value::{FieldPath, FieldValue, FormState};
use crate::engine::walker::flatten;
use crate::model::FieldKind;
use crate::widgets::form::{draw_form, focus_rows, FormView};
use crate::widgets::Effect;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;

enum Focus {
    Field { path: FieldPath, kind: FieldKind },
    Submit,
}

/// Binds key presses to controller events for one form.
pub struct FormWidget {
    pub controller: FormController,
    pub view: FormView,
    pub last_submitted: Option<FormState>,
}

impl FormWidget {
    pub fn new(controller: FormController) -> Self {
        Self {
            controller,
            view: FormView::default(),
            last_submitted: None,
        }
    }

    fn target_count(&self) -> usize {
        focus_rows(&flatten(self.controller.schema())).len() + 1
    }

    fn focus(&self) -> Option<Focus> {
        let flat = flatten(self.controller.schema());
        let rows = focus_rows(&flat);
        if self.view.selected == rows.len() {
            return Some(Focus::Submit);
        }
        let row = flat.get(*rows.get(self.view.selected)?)?;
        Some(Focus::Field {
            path: row.path()?.clone(),
            kind: row.spec().kind.clone(),
        })
    }

    fn move_selection(&mut self, delta: isize) {
        let n = self.target_count() as isize;
        let next = (self.view.selected as isize + delta).rem_euclid(n);
        self.view.selected = next as usize;
    }

    fn apply(&mut self, path: &FieldPath, raw: RawEdit) -> Vec<Effect> {
        match self.controller.on_field_edit(path, &raw) {
            Ok(_) => {
                self.view.message = None;
                vec![Effect::Edited]
            }
            Err(e) => {
                self.view.message = Some(e.to_string());
                Vec::new()
            }
        }
    }

    pub fn submit(&mut self) -> Vec<Effect> {
        let out = self.controller.on_submit();
        let ok = out.verdict.is_ok();
        if let Some(state) = out.submitted {
            self.last_submitted = Some(state);
        }
        vec![Effect::Submitted { ok }]
    }

    fn begin_edit(&mut self, path: FieldPath, kind: FieldKind) -> Vec<Effect> {
        let current = self.controller.state().get_path(&path).cloned();
        match &kind {
            FieldKind::Checkbox => {
                let on = current.and_then(|v| v.as_bool()).unwrap_or(false);
                return self.apply(&path, RawEdit::checked(!on));
            }
            FieldKind::Select { options } | FieldKind::Radio { options } => {
                let cur = current.map(|v| v.display_string());
                self.view.option_cursor = options
                    .iter()
                    .position(|o| Some(&o.value) == cur.as_ref())
                    .unwrap_or(0);
            }
            _ => {
                self.view.buffer = match current {
                    Some(FieldValue::NotANumber) | None => String::new(),
                    Some(v) => v.display_string(),
                };
            }
        }
        self.view.editing = true;
        Vec::new()
    }

    /// Commit whatever is being edited. Returns no effects when nothing was open.
    fn commit_edit(&mut self) -> Vec<Effect> {
        if !self.view.editing {
            return Vec::new();
        }
        self.view.editing = false;
        let Some(Focus::Field { path, kind }) = self.focus() else {
            return Vec::new();
        };
        let raw = match kind.options() {
            Some(options) => match options.get(self.view.option_cursor) {
                Some(opt) => RawEdit::text(opt.value.clone()),
                None => return Vec::new(),
            },
            None => RawEdit::text(std::mem::take(&mut self.view.buffer)),
        };
        self.apply(&path, raw)
    }

    fn on_edit_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let option_count = match self.focus() {
            Some(Focus::Field { kind, .. }) => kind.options().map(|o| o.len()),
            _ => {
                self.view.editing = false;
                return Vec::new();
            }
        };
        let chord = key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
        match (option_count, key.code) {
            (_, KeyCode::Esc) => {
                self.view.editing = false;
                self.view.buffer.clear();
            }
            (_, KeyCode::Enter) => return self.commit_edit(),
            (Some(_), KeyCode::Up) => {
                self.view.option_cursor = self.view.option_cursor.saturating_sub(1);
            }
            (Some(n), KeyCode::Down) => {
                self.view.option_cursor = (self.view.option_cursor + 1).min(n.saturating_sub(1));
            }
            (None, KeyCode::Char(c)) if !chord => self.view.buffer.push(c),
            (None, KeyCode::Backspace) => {
                self.view.buffer.pop();
            }
            _ => {}
        }
        Vec::new()
    }
}

impl crate::widgets::Widget for FormWidget {
    fn render(&mut self, f: &mut Frame, area: Rect, focused: bool, tick: u64) {
        let n = self.target_count();
        if self.view.selected >= n {
            self.view.selected = n - 1;
        }
        draw_form(f, area, &self.controller, &self.view, focused, tick % 2 == 0);
    }

    fn on_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
            let mut effects = self.commit_edit();
            effects.extend(self.submit());
            return effects;
        }
        if self.view.editing {
            return self.on_edit_key(key);
        }
        match key.code {
            KeyCode::Up | KeyCode::BackTab | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Tab | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Esc | KeyCode::Char('q') => return vec![Effect::Quit],
            KeyCode::Enter | KeyCode::Char(' ') => match self.focus() {
                Some(Focus::Submit) => return self.submit(),
                Some(Focus::Field { path, kind }) => return self.begin_edit(path, kind),
                None => {}
            },
            _ => {}
        }
        Vec::new()
    }
}
