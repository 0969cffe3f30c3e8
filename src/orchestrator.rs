// Request orchestration: one request in flight at a time.
//
// A submission is split around its suspension point. [`RequestOrchestrator::begin`]
// enters Loading and hands back a [`Submission`]; the host sends it however
// it likes (inline or on a worker thread) and passes the outcome to
// [`RequestOrchestrator::finish`], which consumes the ticket. Because
// [`InFlight`] cannot be cloned, Loading is left exactly once per request.

use crate::api::{ApiOutcome, CleaningResult};
use crate::config::StaleResultPolicy;
use crate::error::{Result, UnicodeFixError};
use crate::input::PendingInput;
use crate::view::{Element, View};
use tracing::{debug, info, warn};

pub const BUSY_LABEL: &str = "Processing...";
pub const NETWORK_ERROR: &str = "Network error. Please try again.";
pub const TEXT_FALLBACK: &str = "Failed to clean text";
pub const FILE_FALLBACK: &str = "Failed to process file";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Error,
}

/// Proof that a request is in flight. Hand it back to `finish`.
#[derive(Debug)]
#[must_use = "an in-flight ticket must be passed to finish, or the submit control stays disabled"]
pub struct InFlight {
    id: u64,
    filename: Option<String>,
    is_file: bool,
    mode_generation: u64,
    restore_label: String,
}

/// A started request: the ticket plus the input to send.
#[derive(Debug)]
pub struct Submission {
    pub ticket: InFlight,
    pub input: PendingInput,
}

/// A successful result to be shown by the presenter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub result: CleaningResult,
    pub filename: Option<String>,
}

#[derive(Debug, Default)]
pub struct RequestOrchestrator {
    state: RequestState,
    in_flight: Option<u64>,
    next_id: u64,
}

impl RequestOrchestrator {
    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Enter Loading for `input`. Fails with `Busy` while another request is
    /// in flight; the view is left untouched in that case.
    pub fn begin(
        &mut self,
        view: &mut dyn View,
        input: PendingInput,
        mode_generation: u64,
    ) -> Result<Submission> {
        if let Some(id) = self.in_flight {
            warn!(in_flight = id, "submission rejected: request already in flight");
            return Err(UnicodeFixError::Busy);
        }

        self.hide_error(view);

        let id = self.next_id;
        self.next_id += 1;
        self.in_flight = Some(id);
        self.state = RequestState::Loading;

        let restore_label = view.text(Element::SubmitLabel);
        view.set_enabled(Element::SubmitButton, false);
        view.set_text(Element::SubmitLabel, BUSY_LABEL);
        view.set_visible(Element::SubmitSpinner, true);

        let ticket = InFlight {
            id,
            filename: input.filename().map(str::to_string),
            is_file: matches!(input, PendingInput::File(_)),
            mode_generation,
            restore_label,
        };
        info!(id, file = ?ticket.filename, "cleaning request started");
        Ok(Submission { ticket, input })
    }

    /// Leave Loading and interpret the outcome. Errors are shown here; a
    /// result to display is returned for the presenter.
    pub fn finish(
        &mut self,
        view: &mut dyn View,
        ticket: InFlight,
        outcome: ApiOutcome,
        mode_generation: u64,
        policy: StaleResultPolicy,
    ) -> Option<Delivery> {
        if self.in_flight != Some(ticket.id) {
            warn!(id = ticket.id, "ignoring completion for a request that is not in flight");
            return None;
        }

        self.in_flight = None;
        self.state = RequestState::Idle;
        view.set_enabled(Element::SubmitButton, true);
        view.set_text(Element::SubmitLabel, &ticket.restore_label);
        view.set_visible(Element::SubmitSpinner, false);

        match outcome {
            ApiOutcome::Cleaned(result) => {
                let stale = ticket.mode_generation != mode_generation;
                if stale && policy == StaleResultPolicy::Suppress {
                    info!(id = ticket.id, "mode changed while in flight, result suppressed");
                    return None;
                }
                info!(id = ticket.id, changes = result.changes_made, stale, "cleaning succeeded");
                Some(Delivery {
                    result,
                    filename: ticket.filename,
                })
            }
            ApiOutcome::Rejected { message } => {
                info!(id = ticket.id, ?message, "cleaning rejected by service");
                let fallback = if ticket.is_file {
                    FILE_FALLBACK
                } else {
                    TEXT_FALLBACK
                };
                self.show_error(view, message.as_deref().unwrap_or(fallback));
                None
            }
            ApiOutcome::Unreachable(cause) => {
                warn!(id = ticket.id, %cause, "cleaning request failed");
                self.show_error(view, NETWORK_ERROR);
                None
            }
        }
    }

    pub fn show_error(&mut self, view: &mut dyn View, message: &str) {
        debug!(text = message, "showing error");
        view.set_text(Element::ErrorMessage, message);
        view.set_visible(Element::ErrorAlert, true);
        view.scroll_into_view(Element::ErrorAlert);
        if self.state != RequestState::Loading {
            self.state = RequestState::Error;
        }
    }

    pub fn hide_error(&mut self, view: &mut dyn View) {
        view.set_visible(Element::ErrorAlert, false);
        if self.state == RequestState::Error {
            self.state = RequestState::Idle;
        }
    }
}
