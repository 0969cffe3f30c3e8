// View binding: the named elements the controller manipulates.
//
// The controller never looks elements up by string. Every element it
// touches is an [`Element`] variant, and every change goes through the
// [`View`] trait, so a browser binding, a GUI or the terminal front end can
// host the same controller. [`MemoryView`] is the in-process implementation
// used by the terminal front end and by tests.

use crate::input::FileInput;
use std::collections::{HashMap, HashSet};

/// Every element the controller reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    /// Root element; carries the dark theme treatment.
    Document,
    TextModeButton,
    FileModeButton,
    TextModePanel,
    FileModePanel,
    TextInput,
    DropZone,
    SubmitButton,
    SubmitLabel,
    SubmitSpinner,
    ErrorAlert,
    ErrorMessage,
    Results,
    ResultText,
    ChangesCount,
    SizeInfo,
    CopyButton,
    DownloadButton,
}

/// The closed set of visual treatments the controller toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Treatment {
    /// Selected mode button.
    Active,
    /// Drop zone while a drag hovers over it.
    DropTarget,
    /// Button showing transient success feedback.
    Success,
    /// Dark colour scheme on [`Element::Document`].
    Dark,
}

pub trait View {
    fn set_visible(&mut self, element: Element, visible: bool);
    fn is_visible(&self, element: Element) -> bool;

    fn set_text(&mut self, element: Element, text: &str);
    fn text(&self, element: Element) -> String;

    fn set_enabled(&mut self, element: Element, enabled: bool);
    fn is_enabled(&self, element: Element) -> bool;

    fn set_treatment(&mut self, element: Element, treatment: Treatment, on: bool);
    fn has_treatment(&self, element: Element, treatment: Treatment) -> bool;

    fn scroll_into_view(&mut self, element: Element);

    /// Select the element's text so a selection-based copy can pick it up.
    fn select_text(&mut self, element: Element);

    /// Files currently held by the file chooser, in selection order.
    fn selected_files(&self) -> Vec<FileInput>;

    /// Ask the host to open its native file chooser.
    fn open_file_chooser(&mut self);
}

/// Plain in-memory view. Elements start visible, enabled, empty and
/// untreated unless [`MemoryView::new`] seeds them otherwise.
#[derive(Debug, Default, Clone)]
pub struct MemoryView {
    hidden: HashSet<Element>,
    disabled: HashSet<Element>,
    texts: HashMap<Element, String>,
    treatments: HashSet<(Element, Treatment)>,
    files: Vec<FileInput>,
    selection: Option<Element>,
    last_scrolled: Option<Element>,
    chooser_requested: bool,
}

impl MemoryView {
    /// A view laid out like the page at load: text panel shown, file panel,
    /// results, error and spinner hidden, default button labels.
    pub fn new() -> Self {
        let mut view = MemoryView::default();
        for element in [
            Element::FileModePanel,
            Element::SubmitSpinner,
            Element::ErrorAlert,
            Element::Results,
        ] {
            view.hidden.insert(element);
        }
        view.set_text(Element::SubmitLabel, "Clean Text");
        view.set_text(Element::CopyButton, "Copy");
        view.set_text(Element::DownloadButton, "Download");
        view.set_text(Element::ChangesCount, "0");
        view.set_text(Element::SizeInfo, "0 → 0 chars");
        view.set_text(Element::TextModeButton, "Paste Text");
        view.set_text(Element::FileModeButton, "Upload File");
        view
    }

    /// Replace the chooser's files, as the user picking files would.
    pub fn set_selected_files(&mut self, files: Vec<FileInput>) {
        self.files = files;
    }

    /// Returns whether the chooser was requested since the last call.
    pub fn take_chooser_request(&mut self) -> bool {
        std::mem::take(&mut self.chooser_requested)
    }

    pub fn selection(&self) -> Option<Element> {
        self.selection
    }

    pub fn last_scrolled(&self) -> Option<Element> {
        self.last_scrolled
    }
}

impl View for MemoryView {
    fn set_visible(&mut self, element: Element, visible: bool) {
        if visible {
            self.hidden.remove(&element);
        } else {
            self.hidden.insert(element);
        }
    }

    fn is_visible(&self, element: Element) -> bool {
        !self.hidden.contains(&element)
    }

    fn set_text(&mut self, element: Element, text: &str) {
        self.texts.insert(element, text.to_string());
    }

    fn text(&self, element: Element) -> String {
        self.texts.get(&element).cloned().unwrap_or_default()
    }

    fn set_enabled(&mut self, element: Element, enabled: bool) {
        if enabled {
            self.disabled.remove(&element);
        } else {
            self.disabled.insert(element);
        }
    }

    fn is_enabled(&self, element: Element) -> bool {
        !self.disabled.contains(&element)
    }

    fn set_treatment(&mut self, element: Element, treatment: Treatment, on: bool) {
        if on {
            self.treatments.insert((element, treatment));
        } else {
            self.treatments.remove(&(element, treatment));
        }
    }

    fn has_treatment(&self, element: Element, treatment: Treatment) -> bool {
        self.treatments.contains(&(element, treatment))
    }

    fn scroll_into_view(&mut self, element: Element) {
        self.last_scrolled = Some(element);
    }

    fn select_text(&mut self, element: Element) {
        self.selection = Some(element);
    }

    fn selected_files(&self) -> Vec<FileInput> {
        self.files.clone()
    }

    fn open_file_chooser(&mut self) {
        self.chooser_requested = true;
    }
}
