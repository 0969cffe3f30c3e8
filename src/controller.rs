// The controller: owns the view and collaborators and routes UI events to
// the mode, input, request and result components.
//
// Events are delivered through [`Controller::dispatch`], which never blocks
// on the network. If an event starts a request, the returned [`Dispatch`]
// carries the [`Submission`]; the host sends it and calls
// [`Controller::finish_submission`] with the outcome. [`Controller::handle`]
// does both inline for hosts that are happy to block.

use crate::api::{ApiOutcome, CleaningService};
use crate::clipboard::Clipboard;
use crate::config::StaleResultPolicy;
use crate::download::DownloadSink;
use crate::error::UnicodeFixError;
use crate::input::{self, FileInput, PendingInput};
use crate::mode::{Mode, ModeController};
use crate::orchestrator::{InFlight, RequestOrchestrator, RequestState, Submission};
use crate::prefs::{PreferenceStore, DARK_MODE_KEY};
use crate::presenter::{LastResult, ResultPresenter};
use crate::view::{Element, Treatment, View};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub ctrl: bool,
    pub meta: bool,
}

impl KeyEvent {
    pub fn plain(key: Key) -> Self {
        KeyEvent {
            key,
            ctrl: false,
            meta: false,
        }
    }

    pub fn ctrl(key: Key) -> Self {
        KeyEvent {
            key,
            ctrl: true,
            meta: false,
        }
    }
}

/// Everything the user can do on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    ModeSelected(Mode),
    DropZoneClicked,
    DragOver,
    DragLeave,
    Drop(Vec<FileInput>),
    FilesChosen(Vec<FileInput>),
    SubmitClicked,
    CopyClicked,
    DownloadClicked,
    DarkModeToggled,
    Key(KeyEvent),
}

/// Whether the host should suppress its default handling of the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    PreventDefault,
}

#[derive(Debug)]
#[must_use]
pub struct Dispatch {
    pub propagation: Propagation,
    pub submission: Option<Submission>,
}

impl Dispatch {
    fn done(propagation: Propagation) -> Self {
        Dispatch {
            propagation,
            submission: None,
        }
    }
}

pub struct Controller<V: View> {
    view: V,
    modes: ModeController,
    orchestrator: RequestOrchestrator,
    presenter: ResultPresenter,
    service: Arc<dyn CleaningService>,
    clipboard: Box<dyn Clipboard>,
    downloads: Box<dyn DownloadSink>,
    prefs: Box<dyn PreferenceStore>,
    stale_policy: StaleResultPolicy,
    dark: bool,
}

impl<V: View> Controller<V> {
    /// Bind the controller to a view. Reads the dark mode preference once
    /// and renders the initial mode.
    pub fn new(
        mut view: V,
        service: Arc<dyn CleaningService>,
        clipboard: Box<dyn Clipboard>,
        downloads: Box<dyn DownloadSink>,
        prefs: Box<dyn PreferenceStore>,
    ) -> Self {
        let dark = prefs.get(DARK_MODE_KEY);
        view.set_treatment(Element::Document, Treatment::Dark, dark);

        let modes = ModeController::default();
        modes.render(&mut view);

        Controller {
            view,
            modes,
            orchestrator: RequestOrchestrator::default(),
            presenter: ResultPresenter::default(),
            service,
            clipboard,
            downloads,
            prefs,
            stale_policy: StaleResultPolicy::default(),
            dark,
        }
    }

    pub fn with_stale_policy(mut self, policy: StaleResultPolicy) -> Self {
        self.stale_policy = policy;
        self
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn mode(&self) -> Mode {
        self.modes.mode()
    }

    pub fn request_state(&self) -> RequestState {
        self.orchestrator.state()
    }

    pub fn result_shown(&self) -> bool {
        self.view.is_visible(Element::Results)
    }

    pub fn last_result(&self) -> Option<&LastResult> {
        self.presenter.last_result()
    }

    pub fn is_dark(&self) -> bool {
        self.dark
    }

    /// Shared handle to the service, for hosts that send off-thread.
    pub fn service(&self) -> Arc<dyn CleaningService> {
        Arc::clone(&self.service)
    }

    /// Route one event. Never blocks on the network.
    pub fn dispatch(&mut self, event: UiEvent) -> Dispatch {
        debug!(?event, "ui event");
        match event {
            UiEvent::ModeSelected(mode) => {
                self.switch_mode(mode);
                Dispatch::done(Propagation::Continue)
            }
            UiEvent::DropZoneClicked => {
                self.view.open_file_chooser();
                Dispatch::done(Propagation::Continue)
            }
            UiEvent::DragOver => {
                input::drag_over(&mut self.view);
                Dispatch::done(Propagation::PreventDefault)
            }
            UiEvent::DragLeave => {
                input::drag_end(&mut self.view);
                Dispatch::done(Propagation::Continue)
            }
            UiEvent::Drop(files) => {
                input::drag_end(&mut self.view);
                Dispatch {
                    propagation: Propagation::PreventDefault,
                    submission: self.submit_files(files),
                }
            }
            UiEvent::FilesChosen(files) => Dispatch {
                propagation: Propagation::Continue,
                submission: self.submit_files(files),
            },
            UiEvent::SubmitClicked => {
                if !self.view.is_enabled(Element::SubmitButton) {
                    return Dispatch::done(Propagation::Continue);
                }
                Dispatch {
                    propagation: Propagation::Continue,
                    submission: self.submit(),
                }
            }
            UiEvent::CopyClicked => {
                self.copy();
                Dispatch::done(Propagation::Continue)
            }
            UiEvent::DownloadClicked => {
                self.download();
                Dispatch::done(Propagation::Continue)
            }
            UiEvent::DarkModeToggled => {
                self.toggle_dark_mode();
                Dispatch::done(Propagation::Continue)
            }
            UiEvent::Key(key) => self.handle_key(key),
        }
    }

    /// Dispatch and, if a request was started, send it inline.
    pub fn handle(&mut self, event: UiEvent) -> Propagation {
        let dispatch = self.dispatch(event);
        if let Some(submission) = dispatch.submission {
            self.run(submission);
        }
        dispatch.propagation
    }

    fn handle_key(&mut self, key: KeyEvent) -> Dispatch {
        match key.key {
            Key::Enter if key.ctrl || key.meta => Dispatch {
                propagation: Propagation::PreventDefault,
                submission: self.submit(),
            },
            Key::Escape => {
                self.dismiss();
                Dispatch::done(Propagation::Continue)
            }
            _ => Dispatch::done(Propagation::Continue),
        }
    }

    /// Switch input mode. Hides results and any error; never sends anything.
    pub fn switch_mode(&mut self, mode: Mode) {
        self.modes.switch(&mut self.view, mode);
        self.orchestrator.hide_error(&mut self.view);
    }

    /// Submit whatever the active mode's panel holds.
    pub fn submit(&mut self) -> Option<Submission> {
        if self.orchestrator.is_loading() {
            debug!("submit ignored while a request is in flight");
            return None;
        }
        let acquired = match self.modes.mode() {
            Mode::Text => input::acquire_text(&self.view),
            Mode::File => input::acquire_selected_file(&self.view),
        };
        match acquired {
            Ok(pending) => self.submit_input(pending),
            Err(e) => {
                debug!(error = %e, "validation failed");
                self.orchestrator.show_error(&mut self.view, &e.to_string());
                None
            }
        }
    }

    fn submit_files(&mut self, files: Vec<FileInput>) -> Option<Submission> {
        match input::first_file(files) {
            Some(pending) => self.submit_input(pending),
            None => {
                debug!("file event without files");
                None
            }
        }
    }

    /// Start a request for already-validated input.
    pub fn submit_input(&mut self, pending: PendingInput) -> Option<Submission> {
        match self
            .orchestrator
            .begin(&mut self.view, pending, self.modes.generation())
        {
            Ok(submission) => Some(submission),
            Err(UnicodeFixError::Busy) => None,
            Err(e) => {
                warn!(error = %e, "could not start request");
                None
            }
        }
    }

    /// Deliver the outcome of a request started by this controller.
    pub fn finish_submission(&mut self, ticket: InFlight, outcome: ApiOutcome) {
        let delivery = self.orchestrator.finish(
            &mut self.view,
            ticket,
            outcome,
            self.modes.generation(),
            self.stale_policy,
        );
        if let Some(delivery) = delivery {
            self.presenter
                .show_result(&mut self.view, &delivery.result, delivery.filename);
        }
    }

    /// Send a submission on the current thread. A panicking service counts
    /// as a transport failure so Loading is still left.
    pub fn run(&mut self, submission: Submission) {
        let Submission { ticket, input } = submission;
        let service = Arc::clone(&self.service);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| input.send(service.as_ref())))
            .unwrap_or_else(|_| ApiOutcome::Unreachable("cleaning service panicked".into()));
        self.finish_submission(ticket, outcome);
    }

    pub fn copy(&mut self) {
        self.presenter
            .copy(&mut self.view, self.clipboard.as_mut(), Instant::now());
    }

    /// Save the last result. `None` when there is nothing to save or the
    /// save failed (the failure is shown in the error banner).
    pub fn download(&mut self) -> Option<PathBuf> {
        match self
            .presenter
            .download(&mut self.view, self.downloads.as_mut(), Instant::now())
        {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "download failed");
                self.orchestrator
                    .show_error(&mut self.view, &format!("Download failed: {}", e));
                None
            }
        }
    }

    pub fn toggle_dark_mode(&mut self) {
        self.dark = !self.dark;
        self.view
            .set_treatment(Element::Document, Treatment::Dark, self.dark);
        if let Err(e) = self.prefs.set(DARK_MODE_KEY, self.dark) {
            warn!(error = %e, "could not persist dark mode preference");
        }
    }

    /// Hide results and error. Mode and any in-flight request are untouched.
    pub fn dismiss(&mut self) {
        self.presenter.hide(&mut self.view);
        self.orchestrator.hide_error(&mut self.view);
    }

    /// Advance timers (feedback labels) to `now`.
    pub fn tick(&mut self, now: Instant) {
        self.presenter.tick(&mut self.view, now);
    }
}
