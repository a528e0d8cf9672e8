use crate::engine::controller::FormController;
use crate::services::loader::discover_form_document;
use crate::widgets::form_widget::FormWidget;
use crate::widgets::status_bar::draw_footer;
use crate::widgets::{Effect, Widget};
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use std::path::PathBuf;
use std::time::{Duration, Instant};

pub const HEADLESS_ENV: &str = "DYNFORM_HEADLESS";
pub const TICKS_ENV: &str = "DYNFORM_TICKS";

const TICK_RATE: Duration = Duration::from_millis(200);

pub struct AppState {
    pub form: FormWidget,
    pub tick: u64,
}

impl AppState {
    pub fn new(controller: FormController) -> Self {
        Self {
            form: FormWidget::new(controller),
            tick: 0,
        }
    }

    /// Route a key to the form. Returns true when the loop should exit.
    pub fn on_key(&mut self, key: event::KeyEvent) -> bool {
        let mut quit = false;
        for eff in self.form.on_key(key) {
            match eff {
                Effect::Quit => quit = true,
                Effect::Submitted { ok } => {
                    tracing::debug!(ok, "submit from keyboard");
                }
                Effect::Edited => {}
            }
        }
        quit
    }

    /// Advance the clock one tick and fire any due status clear.
    pub fn on_tick(&mut self, now: Instant) {
        self.tick = self.tick.wrapping_add(1);
        self.form.controller.poll_status_at(now);
    }

    /// Last accepted submission, as pretty JSON.
    pub fn submitted_json(&self) -> Option<String> {
        let state = self.form.last_submitted.as_ref()?;
        serde_json::to_string_pretty(state).ok()
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
        .unwrap_or(false)
}

pub fn run() -> Result<()> {
    let arg = std::env::args_os().nth(1).map(PathBuf::from);
    let (path, doc) = discover_form_document(arg.as_deref())?;
    let controller = FormController::from_document(doc)
        .with_context(|| format!("invalid form schema in {path:?}"))?;
    let mut state = AppState::new(controller);

    if env_flag(HEADLESS_ENV) {
        let ticks: u64 = std::env::var(TICKS_ENV)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(10);
        let summary = run_headless(&mut state, ticks)?;
        println!("{summary}");
        return Ok(());
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let res = event_loop(&mut terminal, &mut state);
    disable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res?;

    if let Some(json) = state.submitted_json() {
        println!("{json}");
    }
    Ok(())
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, state: &mut AppState) -> Result<()> {
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|f| ui(f, state))?;
        let timeout = TICK_RATE
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && state.on_key(key) {
                    return Ok(());
                }
            }
        }
        if last_tick.elapsed() >= TICK_RATE {
            state.on_tick(Instant::now());
            last_tick = Instant::now();
        }
    }
}

/// Draw `ticks` frames off-screen, submit once, and summarize the outcome as JSON.
pub fn run_headless(state: &mut AppState, ticks: u64) -> Result<serde_json::Value> {
    let backend = ratatui::backend::TestBackend::new(80, 24);
    let mut terminal = Terminal::new(backend)?;
    for _ in 0..ticks {
        terminal.draw(|f| ui(f, state))?;
        state.on_tick(Instant::now());
    }
    let snapshot = state.form.controller.state().to_json();
    let out = state.form.controller.on_submit();
    terminal.draw(|f| ui(f, state))?;
    Ok(serde_json::json!({
        "ok": out.verdict.is_ok(),
        "reason": out.verdict.reason(),
        "status": state.form.controller.status_message(),
        "state": snapshot,
    }))
}

fn ui(f: &mut Frame, state: &mut AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());
    let tick = state.tick;
    state.form.render(f, chunks[0], true, tick);
    draw_footer(f, chunks[1], &state.form.controller, state.form.view.editing);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::controller::FormStatus;
    use crate::model::FormDocument;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn state() -> AppState {
        let doc: FormDocument = serde_yaml::from_str(
            r#"
title: Signup
status_timeout_ms: 0
fields:
  - type: text
    name: name
    required: true
"#,
        )
        .unwrap();
        AppState::new(FormController::from_document(doc).unwrap())
    }

    #[test]
    fn headless_reports_failed_submit_of_empty_form() {
        let mut st = state();
        let summary = run_headless(&mut st, 3).unwrap();
        assert_eq!(summary["ok"], false);
        assert_eq!(summary["reason"], "'name' is required");
        assert_eq!(summary["status"], "Form Validation Failed");
        assert_eq!(summary["state"], serde_json::json!({}));
        assert_eq!(st.tick, 3);
    }

    #[test]
    fn tick_clears_status_after_timeout() {
        let mut st = state();
        st.form.controller.on_submit();
        assert_eq!(st.form.controller.status(), FormStatus::Failure);
        st.on_tick(Instant::now());
        assert_eq!(st.form.controller.status(), FormStatus::Unset);
    }

    #[test]
    fn quit_key_ends_loop_and_submitted_json_is_kept() {
        let mut st = state();
        st.on_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        for c in "Ada".chars() {
            st.on_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
        assert!(!st.on_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)));
        let json: serde_json::Value =
            serde_json::from_str(&st.submitted_json().unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({"name": "Ada"}));
        assert!(st.on_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)));
    }
}
