use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use unicodefix_client::api::{ApiOutcome, CleaningResult, CleaningService};
use unicodefix_client::clipboard::{Clipboard, ClipboardError};
use unicodefix_client::config::StaleResultPolicy;
use unicodefix_client::controller::{Key, KeyEvent};
use unicodefix_client::download::DownloadSink;
use unicodefix_client::input::FileInput;
use unicodefix_client::orchestrator::{RequestState, BUSY_LABEL, NETWORK_ERROR};
use unicodefix_client::prefs::{JsonPreferenceStore, MemoryPreferenceStore, PreferenceStore, DARK_MODE_KEY};
use unicodefix_client::presenter::FEEDBACK_DELAY;
use unicodefix_client::view::{Element, MemoryView, Treatment, View};
use unicodefix_client::{Controller, Mode, Propagation, UiEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Text(String),
    File(String, Vec<u8>),
}

struct FakeService {
    calls: Mutex<Vec<Call>>,
    outcome: Mutex<ApiOutcome>,
    panic: bool,
}

impl FakeService {
    fn answering(outcome: ApiOutcome) -> Arc<Self> {
        Arc::new(FakeService {
            calls: Mutex::new(Vec::new()),
            outcome: Mutex::new(outcome),
            panic: false,
        })
    }

    fn panicking() -> Arc<Self> {
        Arc::new(FakeService {
            calls: Mutex::new(Vec::new()),
            outcome: Mutex::new(ApiOutcome::Unreachable("unused".into())),
            panic: true,
        })
    }

    fn set_outcome(&self, outcome: ApiOutcome) {
        *self.outcome.lock().unwrap() = outcome;
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, call: Call) -> ApiOutcome {
        self.calls.lock().unwrap().push(call);
        if self.panic {
            panic!("service blew up");
        }
        self.outcome.lock().unwrap().clone()
    }
}

impl CleaningService for FakeService {
    fn clean_text(&self, text: &str) -> ApiOutcome {
        self.answer(Call::Text(text.to_string()))
    }

    fn clean_file(&self, file: &FileInput) -> ApiOutcome {
        self.answer(Call::File(file.name.clone(), file.bytes.clone()))
    }
}

#[derive(Default)]
struct FakeClipboard {
    refuse: bool,
    log: Rc<RefCell<Vec<String>>>,
}

impl Clipboard for FakeClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.refuse {
            return Err(ClipboardError::Clip("permission denied".into()));
        }
        self.log.borrow_mut().push(format!("clipboard:{}", text));
        Ok(())
    }

    fn copy_selection(&mut self, selected: &str) -> Result<(), ClipboardError> {
        self.log.borrow_mut().push(format!("selection:{}", selected));
        Ok(())
    }
}

#[derive(Default)]
struct FakeSink {
    fail: bool,
    saved: Rc<RefCell<Vec<(String, String)>>>,
}

impl DownloadSink for FakeSink {
    fn save(&mut self, filename: &str, contents: &str) -> io::Result<PathBuf> {
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
        }
        self.saved
            .borrow_mut()
            .push((filename.to_string(), contents.to_string()));
        Ok(PathBuf::from(filename))
    }
}

struct Harness {
    controller: Controller<MemoryView>,
    service: Arc<FakeService>,
    clipboard_log: Rc<RefCell<Vec<String>>>,
    saved: Rc<RefCell<Vec<(String, String)>>>,
}

fn harness_with(service: Arc<FakeService>, refuse_clipboard: bool, failing_sink: bool) -> Harness {
    let clipboard = FakeClipboard {
        refuse: refuse_clipboard,
        ..Default::default()
    };
    let clipboard_log = Rc::clone(&clipboard.log);
    let sink = FakeSink {
        fail: failing_sink,
        ..Default::default()
    };
    let saved = Rc::clone(&sink.saved);
    let controller = Controller::new(
        MemoryView::new(),
        service.clone() as Arc<dyn CleaningService>,
        Box::new(clipboard),
        Box::new(sink),
        Box::new(MemoryPreferenceStore::default()),
    );
    Harness {
        controller,
        service,
        clipboard_log,
        saved,
    }
}

fn harness(outcome: ApiOutcome) -> Harness {
    harness_with(FakeService::answering(outcome), false, false)
}

fn cleaned(text: &str, changes: u64, original: u64, cleaned: u64) -> ApiOutcome {
    ApiOutcome::Cleaned(CleaningResult {
        cleaned_text: text.into(),
        changes_made: changes,
        original_size: original,
        cleaned_size: cleaned,
    })
}

fn rejected(message: &str) -> ApiOutcome {
    ApiOutcome::Rejected {
        message: Some(message.into()),
    }
}

fn assert_submit_idle(view: &MemoryView) {
    assert!(view.is_enabled(Element::SubmitButton));
    assert_eq!(view.text(Element::SubmitLabel), "Clean Text");
    assert!(!view.is_visible(Element::SubmitSpinner));
}

#[test]
fn typed_text_is_cleaned_and_shown() {
    let mut h = harness(cleaned("Hello - World", 1, 13, 13));
    h.controller
        .view_mut()
        .set_text(Element::TextInput, "Hello — World");

    h.controller.handle(UiEvent::SubmitClicked);

    assert_eq!(h.service.calls(), vec![Call::Text("Hello — World".into())]);
    let view = h.controller.view();
    assert!(view.is_visible(Element::Results));
    assert_eq!(view.text(Element::ResultText), "Hello - World");
    assert_eq!(view.text(Element::ChangesCount), "1");
    assert_eq!(view.text(Element::SizeInfo), "13 → 13 chars");
    assert!(!view.is_visible(Element::ErrorAlert));
    assert_submit_idle(view);

    let last = h.controller.last_result().unwrap();
    assert_eq!(last.text, "Hello - World");
    assert_eq!(last.filename, None);
}

#[test]
fn whitespace_text_never_reaches_the_network() {
    let mut h = harness(cleaned("x", 0, 1, 1));
    h.controller.view_mut().set_text(Element::TextInput, "  \n\t ");

    h.controller.handle(UiEvent::SubmitClicked);

    assert!(h.service.calls().is_empty());
    let view = h.controller.view();
    assert!(view.is_visible(Element::ErrorAlert));
    assert_eq!(
        view.text(Element::ErrorMessage),
        "Please enter some text to clean."
    );
    assert_eq!(h.controller.request_state(), RequestState::Error);
    assert_submit_idle(view);
}

#[test]
fn file_mode_without_a_file_is_a_validation_error() {
    let mut h = harness(cleaned("x", 0, 1, 1));
    h.controller.handle(UiEvent::ModeSelected(Mode::File));
    h.controller.handle(UiEvent::SubmitClicked);

    assert!(h.service.calls().is_empty());
    assert_eq!(
        h.controller.view().text(Element::ErrorMessage),
        "Please select a file to clean."
    );
}

#[test]
fn file_mode_submit_sends_first_selected_file() {
    let mut h = harness(cleaned("a", 0, 1, 1));
    h.controller.handle(UiEvent::ModeSelected(Mode::File));
    h.controller.view_mut().set_selected_files(vec![
        FileInput::new("a.txt", "a"),
        FileInput::new("b.txt", "b"),
    ]);

    h.controller.handle(UiEvent::SubmitClicked);

    assert_eq!(h.service.calls(), vec![Call::File("a.txt".into(), b"a".to_vec())]);
    assert_eq!(
        h.controller.last_result().unwrap().filename.as_deref(),
        Some("a.txt")
    );
}

#[test]
fn dropped_file_rejection_shows_server_message() {
    let mut h = harness(rejected("file too large"));
    assert_eq!(h.controller.mode(), Mode::Text);

    assert_eq!(h.controller.handle(UiEvent::DragOver), Propagation::PreventDefault);
    assert!(h
        .controller
        .view()
        .has_treatment(Element::DropZone, Treatment::DropTarget));

    let propagation = h.controller.handle(UiEvent::Drop(vec![
        FileInput::new("notes.txt", "big"),
        FileInput::new("ignored.txt", "x"),
    ]));
    assert_eq!(propagation, Propagation::PreventDefault);

    assert_eq!(
        h.service.calls(),
        vec![Call::File("notes.txt".into(), b"big".to_vec())]
    );
    let view = h.controller.view();
    assert!(!view.has_treatment(Element::DropZone, Treatment::DropTarget));
    assert!(view.is_visible(Element::ErrorAlert));
    assert_eq!(view.text(Element::ErrorMessage), "file too large");
    assert!(!view.is_visible(Element::Results));
    assert_submit_idle(view);
    // Dropping does not switch the mode.
    assert_eq!(h.controller.mode(), Mode::Text);
}

#[test]
fn drag_leave_clears_highlight() {
    let mut h = harness(cleaned("x", 0, 1, 1));
    h.controller.handle(UiEvent::DragOver);
    assert_eq!(h.controller.handle(UiEvent::DragLeave), Propagation::Continue);
    assert!(!h
        .controller
        .view()
        .has_treatment(Element::DropZone, Treatment::DropTarget));
    assert!(h.service.calls().is_empty());
}

#[test]
fn chosen_file_is_sent_once_and_empty_choices_ignored() {
    let mut h = harness(cleaned("ok", 0, 2, 2));
    h.controller.handle(UiEvent::FilesChosen(Vec::new()));
    assert!(h.service.calls().is_empty());

    h.controller
        .handle(UiEvent::FilesChosen(vec![FileInput::new("doc.md", "ok")]));
    assert_eq!(h.service.calls().len(), 1);
}

#[test]
fn drop_zone_click_opens_chooser() {
    let mut h = harness(cleaned("x", 0, 1, 1));
    h.controller.handle(UiEvent::DropZoneClicked);
    assert!(h.controller.view_mut().take_chooser_request());
}

#[test]
fn failure_keeps_previous_result() {
    let mut h = harness(cleaned("first", 0, 5, 5));
    h.controller.view_mut().set_text(Element::TextInput, "first");
    h.controller.handle(UiEvent::SubmitClicked);

    h.service.set_outcome(rejected("nope"));
    h.controller.handle(UiEvent::SubmitClicked);

    let view = h.controller.view();
    assert!(view.is_visible(Element::Results));
    assert_eq!(view.text(Element::ResultText), "first");
    assert_eq!(view.text(Element::ErrorMessage), "nope");
    assert_eq!(h.controller.last_result().unwrap().text, "first");
}

#[test]
fn malformed_response_still_releases_submit() {
    let mut h = harness(ApiOutcome::from_body("<!doctype html>"));
    h.controller.view_mut().set_text(Element::TextInput, "text");
    h.controller.handle(UiEvent::SubmitClicked);

    let view = h.controller.view();
    assert_eq!(view.text(Element::ErrorMessage), NETWORK_ERROR);
    assert_submit_idle(view);
}

#[test]
fn panicking_service_still_releases_submit() {
    let mut h = harness_with(FakeService::panicking(), false, false);
    h.controller.view_mut().set_text(Element::TextInput, "text");
    h.controller.handle(UiEvent::SubmitClicked);

    assert_eq!(h.service.calls().len(), 1);
    let view = h.controller.view();
    assert_eq!(view.text(Element::ErrorMessage), NETWORK_ERROR);
    assert_submit_idle(view);
}

#[test]
fn only_one_request_in_flight() {
    let mut h = harness(cleaned("x", 0, 1, 1));
    h.controller.view_mut().set_text(Element::TextInput, "x");

    let first = h.controller.dispatch(UiEvent::SubmitClicked);
    let sub = first.submission.expect("first submission starts");
    assert_eq!(h.controller.request_state(), RequestState::Loading);
    assert!(!h.controller.view().is_enabled(Element::SubmitButton));
    assert_eq!(h.controller.view().text(Element::SubmitLabel), BUSY_LABEL);

    assert!(h
        .controller
        .dispatch(UiEvent::SubmitClicked)
        .submission
        .is_none());
    assert!(h
        .controller
        .dispatch(UiEvent::Key(KeyEvent::ctrl(Key::Enter)))
        .submission
        .is_none());
    assert!(h
        .controller
        .dispatch(UiEvent::Drop(vec![FileInput::new("a.txt", "a")]))
        .submission
        .is_none());

    let outcome = sub.input.send(h.service.as_ref());
    h.controller.finish_submission(sub.ticket, outcome);

    assert_eq!(h.service.calls().len(), 1);
    assert_submit_idle(h.controller.view());
    assert_eq!(h.controller.request_state(), RequestState::Idle);
}

#[test]
fn mode_switch_hides_results_without_requests() {
    let mut h = harness(cleaned("x", 0, 1, 1));
    h.controller.view_mut().set_text(Element::TextInput, "x");
    h.controller.handle(UiEvent::SubmitClicked);
    assert!(h.controller.result_shown());

    h.controller.handle(UiEvent::ModeSelected(Mode::File));
    assert!(!h.controller.result_shown());
    assert_eq!(h.service.calls().len(), 1);
    assert_eq!(h.controller.view().text(Element::TextInput), "x");

    let view = h.controller.view();
    assert!(view.is_visible(Element::FileModePanel));
    assert!(!view.is_visible(Element::TextModePanel));
    assert!(view.has_treatment(Element::FileModeButton, Treatment::Active));
    assert!(!view.has_treatment(Element::TextModeButton, Treatment::Active));
}

#[test]
fn stale_result_is_shown_by_default() {
    let mut h = harness(cleaned("late", 0, 4, 4));
    h.controller.view_mut().set_text(Element::TextInput, "late");
    let sub = h.controller.dispatch(UiEvent::SubmitClicked).submission.unwrap();

    h.controller.handle(UiEvent::ModeSelected(Mode::File));
    assert_eq!(h.controller.request_state(), RequestState::Loading);

    let outcome = sub.input.send(h.service.as_ref());
    h.controller.finish_submission(sub.ticket, outcome);

    assert_eq!(h.controller.mode(), Mode::File);
    assert!(h.controller.result_shown());
    assert_submit_idle(h.controller.view());
}

#[test]
fn stale_result_can_be_suppressed() {
    let h = harness(cleaned("late", 0, 4, 4));
    let mut controller = h.controller.with_stale_policy(StaleResultPolicy::Suppress);
    controller.view_mut().set_text(Element::TextInput, "late");
    let sub = controller.dispatch(UiEvent::SubmitClicked).submission.unwrap();

    controller.handle(UiEvent::ModeSelected(Mode::File));
    let outcome = sub.input.send(h.service.as_ref());
    controller.finish_submission(sub.ticket, outcome);

    assert!(!controller.result_shown());
    assert!(controller.last_result().is_none());
    assert_submit_idle(controller.view());
}

#[test]
fn ctrl_or_cmd_enter_submits() {
    let mut h = harness(cleaned("x", 0, 1, 1));
    h.controller.view_mut().set_text(Element::TextInput, "x");

    let propagation = h.controller.handle(UiEvent::Key(KeyEvent::ctrl(Key::Enter)));
    assert_eq!(propagation, Propagation::PreventDefault);

    let cmd_enter = KeyEvent {
        key: Key::Enter,
        ctrl: false,
        meta: true,
    };
    h.controller.handle(UiEvent::Key(cmd_enter));

    // Plain Enter types a newline; it does not submit.
    h.controller
        .handle(UiEvent::Key(KeyEvent::plain(Key::Enter)));

    assert_eq!(h.service.calls().len(), 2);
}

#[test]
fn escape_hides_results_and_error_only() {
    let mut h = harness(cleaned("x", 0, 1, 1));
    h.controller.handle(UiEvent::ModeSelected(Mode::File));
    h.controller.view_mut().set_visible(Element::Results, true);
    h.controller.handle(UiEvent::SubmitClicked);
    assert!(h.controller.view().is_visible(Element::ErrorAlert));

    h.controller.handle(UiEvent::Key(KeyEvent::plain(Key::Escape)));

    let view = h.controller.view();
    assert!(!view.is_visible(Element::Results));
    assert!(!view.is_visible(Element::ErrorAlert));
    assert_eq!(h.controller.mode(), Mode::File);
    assert_eq!(h.controller.request_state(), RequestState::Idle);
}

#[test]
fn escape_leaves_in_flight_request_alone() {
    let mut h = harness(cleaned("x", 0, 1, 1));
    h.controller.view_mut().set_text(Element::TextInput, "x");
    let sub = h.controller.dispatch(UiEvent::SubmitClicked).submission.unwrap();

    h.controller.handle(UiEvent::Key(KeyEvent::plain(Key::Escape)));
    assert_eq!(h.controller.request_state(), RequestState::Loading);
    assert!(!h.controller.view().is_enabled(Element::SubmitButton));

    let outcome = sub.input.send(h.service.as_ref());
    h.controller.finish_submission(sub.ticket, outcome);
    assert!(h.controller.result_shown());
}

#[test]
fn copy_uses_system_clipboard() {
    let mut h = harness(cleaned("Hello - World", 1, 13, 13));
    h.controller.view_mut().set_text(Element::TextInput, "Hello — World");
    h.controller.handle(UiEvent::SubmitClicked);

    h.controller.handle(UiEvent::CopyClicked);

    assert_eq!(
        *h.clipboard_log.borrow(),
        vec!["clipboard:Hello - World".to_string()]
    );
    assert_eq!(h.controller.view().text(Element::CopyButton), "Copied!");
}

#[test]
fn copy_falls_back_to_selection_when_clipboard_refuses() {
    let mut h = harness_with(
        FakeService::answering(cleaned("Hello - World", 1, 13, 13)),
        true,
        false,
    );
    h.controller.view_mut().set_text(Element::TextInput, "Hello — World");
    h.controller.handle(UiEvent::SubmitClicked);

    h.controller.handle(UiEvent::CopyClicked);
    let copied_at = Instant::now();

    assert_eq!(
        *h.clipboard_log.borrow(),
        vec!["selection:Hello - World".to_string()]
    );
    let view = h.controller.view();
    assert_eq!(view.selection(), Some(Element::ResultText));
    assert_eq!(view.text(Element::CopyButton), "Copied!");
    assert!(view.has_treatment(Element::CopyButton, Treatment::Success));

    h.controller.tick(copied_at + Duration::from_millis(500));
    assert_eq!(h.controller.view().text(Element::CopyButton), "Copied!");

    h.controller.tick(copied_at + FEEDBACK_DELAY);
    let view = h.controller.view();
    assert_eq!(view.text(Element::CopyButton), "Copy");
    assert!(!view.has_treatment(Element::CopyButton, Treatment::Success));
}

#[test]
fn copy_takes_edited_result_text() {
    let mut h = harness(cleaned("Hello - World", 1, 13, 13));
    h.controller.view_mut().set_text(Element::TextInput, "Hello — World");
    h.controller.handle(UiEvent::SubmitClicked);
    h.controller
        .view_mut()
        .set_text(Element::ResultText, "Hello - World!");

    h.controller.handle(UiEvent::CopyClicked);
    assert_eq!(
        *h.clipboard_log.borrow(),
        vec!["clipboard:Hello - World!".to_string()]
    );
}

#[test]
fn download_without_result_is_a_no_op() {
    let mut h = harness(cleaned("x", 0, 1, 1));
    assert_eq!(h.controller.download(), None);
    assert!(h.saved.borrow().is_empty());
    assert_eq!(h.controller.view().text(Element::DownloadButton), "Download");
}

#[test]
fn download_names_follow_origin() {
    let mut h = harness(cleaned("clean", 2, 7, 5));
    h.controller
        .handle(UiEvent::Drop(vec![FileInput::new("notes.txt", "dirty")]));
    h.controller.handle(UiEvent::DownloadClicked);

    h.controller.view_mut().set_text(Element::TextInput, "dirty");
    h.controller.handle(UiEvent::SubmitClicked);
    h.controller.handle(UiEvent::DownloadClicked);
    let downloaded_at = Instant::now();

    assert_eq!(
        *h.saved.borrow(),
        vec![
            ("notes.clean.txt".to_string(), "clean".to_string()),
            ("cleaned-text.txt".to_string(), "clean".to_string()),
        ]
    );
    assert_eq!(
        h.controller.view().text(Element::DownloadButton),
        "Downloaded!"
    );
    h.controller.tick(downloaded_at + FEEDBACK_DELAY);
    assert_eq!(h.controller.view().text(Element::DownloadButton), "Download");
}

#[test]
fn failed_download_surfaces_error() {
    let mut h = harness_with(FakeService::answering(cleaned("c", 0, 1, 1)), false, true);
    h.controller.view_mut().set_text(Element::TextInput, "c");
    h.controller.handle(UiEvent::SubmitClicked);

    assert_eq!(h.controller.download(), None);
    let view = h.controller.view();
    assert!(view.is_visible(Element::ErrorAlert));
    assert!(view.text(Element::ErrorMessage).starts_with("Download failed"));
    assert_eq!(view.text(Element::DownloadButton), "Download");
}

#[test]
fn dark_mode_is_read_at_startup_and_persisted_on_toggle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    let mut store = JsonPreferenceStore::open(&path).unwrap();
    store.set(DARK_MODE_KEY, true).unwrap();

    let mut controller = Controller::new(
        MemoryView::new(),
        FakeService::answering(cleaned("x", 0, 1, 1)) as Arc<dyn CleaningService>,
        Box::new(FakeClipboard::default()),
        Box::new(FakeSink::default()),
        Box::new(JsonPreferenceStore::open(&path).unwrap()),
    );
    assert!(controller.is_dark());
    assert!(controller
        .view()
        .has_treatment(Element::Document, Treatment::Dark));

    controller.handle(UiEvent::DarkModeToggled);
    assert!(!controller.is_dark());
    assert!(!controller
        .view()
        .has_treatment(Element::Document, Treatment::Dark));
    assert!(!JsonPreferenceStore::open(&path).unwrap().get(DARK_MODE_KEY));

    controller.handle(UiEvent::DarkModeToggled);
    assert!(JsonPreferenceStore::open(&path).unwrap().get(DARK_MODE_KEY));
}
