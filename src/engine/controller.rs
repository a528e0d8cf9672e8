use crate::engine::merge::{merge_into, patch_for};
use crate::engine::sanitize::{sanitize, RawEdit};
use crate::engine::validate::{validate_with, Verdict};
use crate::engine::value::{FieldPath, FormState};
use crate::engine::walker::resolve_leaf;
use crate::error::{EditError, SchemaError};
use crate::model::{FormDocument, FormSchema, FormSettings};
use std::time::Instant;

pub const STATUS_SUCCESS: &str = "Form Submitted Successfully!";
pub const STATUS_FAILURE: &str = "Form Validation Failed";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FormStatus {
    #[default]
    Unset,
    Success,
    Failure,
}

impl FormStatus {
    pub fn message(&self) -> Option<&'static str> {
        match self {
            FormStatus::Unset => None,
            FormStatus::Success => Some(STATUS_SUCCESS),
            FormStatus::Failure => Some(STATUS_FAILURE),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Editing,
    SubmittedSuccess,
    SubmittedFailure,
}

// At most one pending clear per controller; scheduling overwrites, editing cancels.
#[derive(Clone, Copy, Debug, Default)]
struct StatusTimer {
    deadline: Option<Instant>,
}

impl StatusTimer {
    fn schedule(&mut self, at: Instant) {
        self.deadline = Some(at);
    }

    fn cancel(&mut self) {
        self.deadline = None;
    }

    fn due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }
}

pub type ChangeListener = Box<dyn FnMut(&FormState) + Send>;
pub type FormValidator = Box<dyn Fn(&FormState) -> bool + Send>;

#[derive(Clone, Debug)]
pub struct SubmitOutcome {
    pub verdict: Verdict,
    /// The accepted state, captured before the reset. `None` when rejected.
    pub submitted: Option<FormState>,
}

/// Owns the state of one form instance and drives it from edit and submit events.
pub struct FormController {
    schema: FormSchema,
    settings: FormSettings,
    state: FormState,
    status: FormStatus,
    phase: Phase,
    timer: StatusTimer,
    last_verdict: Option<Verdict>,
    on_change: Option<ChangeListener>,
    validator: Option<FormValidator>,
}

impl FormController {
    pub fn new(schema: FormSchema, settings: FormSettings) -> Self {
        Self {
            schema,
            settings,
            state: FormState::new(),
            status: FormStatus::Unset,
            phase: Phase::Idle,
            timer: StatusTimer::default(),
            last_verdict: None,
            on_change: None,
            validator: None,
        }
    }

    pub fn from_document(doc: FormDocument) -> Result<Self, SchemaError> {
        let (schema, settings) = doc.into_form()?;
        Ok(Self::new(schema, settings))
    }

    pub fn with_change_listener<F>(mut self, listener: F) -> Self
    where
        F: FnMut(&FormState) + Send + 'static,
    {
        self.on_change = Some(Box::new(listener));
        self
    }

    /// Whole-form predicate, ANDed with the schema verdict on submit.
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&FormState) -> bool + Send + 'static,
    {
        self.validator = Some(Box::new(validator));
        self
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn settings(&self) -> &FormSettings {
        &self.settings
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn status(&self) -> FormStatus {
        self.status
    }

    pub fn status_message(&self) -> Option<&'static str> {
        self.status.message()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn last_verdict(&self) -> Option<&Verdict> {
        self.last_verdict.as_ref()
    }

    pub fn status_deadline(&self) -> Option<Instant> {
        self.timer.deadline
    }

    /// Sanitize, merge and notify. Clears any shown status.
    ///
    /// A misaddressed edit leaves state and status untouched.
    pub fn on_field_edit(&mut self, path: &FieldPath, raw: &RawEdit) -> Result<&FormState, EditError> {
        let spec = match resolve_leaf(&self.schema, path) {
            Ok(spec) => spec,
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "edit rejected");
                return Err(e);
            }
        };
        let value = sanitize(&spec.kind, raw).ok_or_else(|| EditError::NotALeaf(path.to_string()))?;
        let patch = patch_for(path, value).ok_or_else(|| EditError::UnknownField(path.to_string()))?;
        merge_into(self.state.as_map_mut(), patch);
        tracing::debug!(path = %path, kind = spec.kind.tag(), "field edited");

        self.status = FormStatus::Unset;
        self.phase = Phase::Editing;
        self.timer.cancel();
        if let Some(listener) = self.on_change.as_mut() {
            listener(&self.state);
        }
        Ok(&self.state)
    }

    pub fn on_submit(&mut self) -> SubmitOutcome {
        self.submit_at(Instant::now())
    }

    /// Submit with an explicit clock reading; the auto-clear is scheduled from `now`.
    pub fn submit_at(&mut self, now: Instant) -> SubmitOutcome {
        let verdict = match &self.validator {
            Some(f) => validate_with(
                &self.schema,
                &self.state,
                Some(f.as_ref() as &dyn Fn(&FormState) -> bool),
            ),
            None => validate_with(&self.schema, &self.state, None),
        };
        let submitted = if verdict.is_ok() {
            self.status = FormStatus::Success;
            self.phase = Phase::SubmittedSuccess;
            let snapshot = self.state.clone();
            if self.settings.reset_on_success {
                self.state.clear();
            }
            tracing::info!(fields = snapshot.len(), "form submitted");
            Some(snapshot)
        } else {
            self.status = FormStatus::Failure;
            self.phase = Phase::SubmittedFailure;
            tracing::info!(reason = ?verdict.reason(), "form validation failed");
            None
        };
        self.timer.schedule(now + self.settings.status_timeout);
        self.last_verdict = Some(verdict.clone());
        SubmitOutcome { verdict, submitted }
    }

    pub fn poll_status(&mut self) -> bool {
        self.poll_status_at(Instant::now())
    }

    /// Fire the pending auto-clear if it is due. Returns true when the status was cleared.
    pub fn poll_status_at(&mut self, now: Instant) -> bool {
        if !self.timer.due(now) {
            return false;
        }
        self.timer.cancel();
        self.status = FormStatus::Unset;
        self.phase = Phase::Idle;
        tracing::debug!("status cleared");
        true
    }
}
